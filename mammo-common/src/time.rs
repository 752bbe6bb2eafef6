//! Timestamp utilities
//!
//! Timestamps are stored in the database as RFC 3339 text with microsecond
//! precision so that lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp, truncated to the stored precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp for storage
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn parse_db_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}
