//! # MAMMO Common Library
//!
//! Shared code for the MAMMO services including:
//! - Database initialization and schema
//! - Configuration loading and root folder resolution
//! - Common error type
//! - Timestamp and identifier helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
