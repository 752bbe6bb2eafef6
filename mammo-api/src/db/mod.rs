//! Database access for mammo-api
//!
//! Schema creation lives in `mammo_common::db::init`; this module owns the
//! queries against it.

pub mod studies;

pub use mammo_common::db::init::{init_database, init_memory_database};
