/// Database Module
///
/// The database layer is split into two concerns:
/// - **Connection Management** (`connection.rs`): the store handle, pragmas, transactions,
///   and named-parameter execution
/// - **Statement Building** (`statement.rs`): SQL text for each facade operation
///
/// All database operations use the `LitegateError` type for error propagation.
pub mod connection;
pub mod statement;

pub use connection::{ConnectionManager, ConnectionOptions, TransactionState};
pub use statement::IdentifierPolicy;
