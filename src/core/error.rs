/// Litegate Error Module
///
/// This module defines the error taxonomy used inside the facade. The public
/// boundary methods never surface these values to callers; they are written
/// to the error log and collapsed into `false`/`None`. The `try_*` methods
/// hand them out unchanged for callers that want the detail.
use thiserror::Error;

/// Error type for every fallible operation in litegate.
///
/// This enum covers the three failure families of the facade:
/// - Connection failures (opening the store, using a closed handle)
/// - Statement preparation and execution failures reported by SQLite
/// - Validation failures raised by the rule evaluator
#[derive(Error, Debug)]
pub enum LitegateError {
    /// Errors reported by the SQLite driver
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An operation was attempted while no connection is open
    #[error("Not connected: the database handle has been closed or was never opened")]
    NotConnected,

    /// A field failed one of its declared rules
    #[error("Validation failed for field '{field}' on rule '{rule}'")]
    Validation { field: String, rule: String },

    /// A table or column name was rejected by the strict identifier policy
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A binding key does not name any placeholder in the statement
    #[error("Unknown parameter: '{0}' is not a placeholder in the statement")]
    UnknownParameter(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result to use LitegateError as the error type.
pub type Result<T> = std::result::Result<T, LitegateError>;
