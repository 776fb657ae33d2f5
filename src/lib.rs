// Core infrastructure modules
pub mod core;

// Facade and its supporting modules
pub mod config;
pub mod error_log;
pub mod facade;
pub mod logging;
pub mod validation;

pub use crate::config::{load_config, FacadeConfig};
pub use crate::core::db::{IdentifierPolicy, TransactionState};
pub use crate::core::{Bindings, ColumnSpec, LitegateError, Result, RowData, Value};
pub use crate::error_log::ErrorLog;
pub use crate::facade::{Database, Filter, Select};
pub use crate::validation::{Rule, RuleSet};
