/// Core Module for litegate
///
/// Shared infrastructure for the facade: the error taxonomy, the scalar value
/// model, and the database layer (SQL text builders and the connection
/// manager that binds and executes them).

pub mod db;
pub mod error;
pub mod value;

// Re-export commonly used types for convenience
pub use error::{LitegateError, Result};
pub use value::{Bindings, ColumnSpec, RowData, Value};
