//! Common error types for MAMMO

use thiserror::Error;

/// Common result type for MAMMO operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across MAMMO services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique key already taken
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a sqlx error, turning unique constraint violations into `Duplicate`
    pub fn from_write(err: sqlx::Error, key: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Error::Duplicate(key.to_string());
            }
        }
        Error::Database(err)
    }
}
