//! The data access facade.
//!
//! [`Database`] wraps one SQLite handle and exposes table management, CRUD,
//! transaction control and field validation. Each operation comes in two
//! forms:
//!
//! - `try_*` methods return [`Result`] with the full [`LitegateError`](crate::LitegateError).
//! - The plain methods (`create_table`, `set`, `get`, ...) never return an
//!   error. Failures are written to the configured [`ErrorLog`] and surface
//!   only as `false` (or `None` from `get`).
//!
//! Table and column names are interpolated into the SQL text. Unless the
//! facade is configured with strict identifiers they must come from trusted
//! code. WHERE and ORDER BY fragments are always used verbatim; only values
//! passed through [`Bindings`] are bound as parameters.
//!
//! ```no_run
//! use litegate::{ColumnSpec, Database, Filter, RowData, RuleSet, Select};
//!
//! let db = Database::new("app.db", None);
//! db.create_table("users", &ColumnSpec::new().column("id", "INTEGER PRIMARY KEY").column("email", "TEXT"));
//! let ok = db.set(
//!     "users",
//!     &RowData::new().with("id", 1).with("email", "a@b.com"),
//!     &RuleSet::new().field("email", "required|email"),
//! );
//! assert!(ok);
//! let rows = db.get("users", &Select::new().filter(Filter::new("id = :id").bind("id", 1)));
//! ```

use crate::config::FacadeConfig;
use crate::core::db::statement::{self, SelectClauses};
use crate::core::db::{ConnectionManager, IdentifierPolicy, TransactionState};
use crate::core::value::{placeholder, Bindings, ColumnSpec, RowData, Value};
use crate::core::Result;
use crate::error_log::ErrorLog;
use crate::validation::RuleSet;
use std::path::PathBuf;
use tracing::debug;

/// A caller-supplied WHERE fragment with its named bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clause: String,
    bindings: Bindings,
}

impl Filter {
    pub fn new(clause: &str) -> Self {
        Filter {
            clause: clause.to_string(),
            bindings: Bindings::new(),
        }
    }

    /// Binds a value to a placeholder; `id` and `:id` are equivalent.
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.bindings = self.bindings.bind(name, value);
        self
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

/// Arguments for `get`. Defaults to `SELECT * FROM <table>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    columns: String,
    filter: Filter,
    order_by: Option<String>,
    limit: Option<u64>,
}

impl Default for Select {
    fn default() -> Self {
        Select {
            columns: "*".to_string(),
            filter: Filter::default(),
            order_by: None,
            limit: None,
        }
    }
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column list, used verbatim
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// WHERE clause and bindings. An empty clause adds no WHERE; any bindings
    /// it carries then have no placeholder to bind to and the call fails.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    /// Row limit. Zero means no limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// SQLite access facade owning a single connection.
#[derive(Debug)]
pub struct Database {
    manager: ConnectionManager,
    policy: IdentifierPolicy,
    log: ErrorLog,
}

impl Database {
    /// Opens the store at `path`, logging failures to `log_file` when given.
    ///
    /// Construction never fails. If the store cannot be opened the failure
    /// is logged and the facade starts disconnected.
    ///
    /// Without a log file, failures are emitted as `tracing` error events.
    /// They only reach standard error once a subscriber is installed, either
    /// by [`crate::logging::init_stderr`] or by the host application.
    pub fn new(path: &str, log_file: Option<PathBuf>) -> Self {
        let mut config = FacadeConfig::new(path);
        if let Some(file) = log_file {
            config = config.with_log_file(file);
        }
        Self::from_config(&config)
    }

    pub fn from_config(config: &FacadeConfig) -> Self {
        let mut db = Database {
            manager: ConnectionManager::new(&config.database.path, config.connection_options()),
            policy: config.identifier_policy(),
            log: config.error_log(),
        };
        db.connect();
        db
    }

    /// (Re)opens the store. Returns false and logs on failure.
    pub fn connect(&mut self) -> bool {
        let result = self.manager.connect();
        self.report("Connection", result).is_some()
    }

    /// Releases the handle. Does nothing when already disconnected.
    pub fn disconnect(&mut self) {
        let result = self.manager.disconnect();
        self.report("Disconnect", result);
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn path(&self) -> &str {
        self.manager.path()
    }

    pub fn try_create_table(&self, table: &str, columns: &ColumnSpec) -> Result<()> {
        let sql = statement::create_table(self.policy, table, columns)?;
        self.manager.execute(&sql, no_params())?;
        Ok(())
    }

    /// `CREATE TABLE IF NOT EXISTS`; creating an existing table succeeds.
    pub fn create_table(&self, table: &str, columns: &ColumnSpec) -> bool {
        let result = self.try_create_table(table, columns);
        self.report(&format!("Create table {}", table), result).is_some()
    }

    pub fn try_drop_table(&self, table: &str) -> Result<()> {
        let sql = statement::drop_table(self.policy, table)?;
        self.manager.execute(&sql, no_params())?;
        Ok(())
    }

    pub fn drop_table(&self, table: &str) -> bool {
        let result = self.try_drop_table(table);
        self.report(&format!("Drop table {}", table), result).is_some()
    }

    /// Checks `data` against `rules` without touching the store.
    pub fn validate_data(&self, data: &RowData, rules: &RuleSet) -> bool {
        let result = rules.validate(data);
        self.report("Validation", result).is_some()
    }

    /// Validates and inserts one row, returning the number of rows inserted.
    pub fn try_set(&self, table: &str, data: &RowData, rules: &RuleSet) -> Result<usize> {
        rules.validate(data)?;
        let sql = statement::insert(self.policy, table, data)?;
        self.manager.execute(&sql, data_params(data))
    }

    pub fn set(&self, table: &str, data: &RowData, rules: &RuleSet) -> bool {
        let result = self.try_set(table, data, rules);
        self.report(&format!("Insert into {}", table), result).is_some()
    }

    /// Validates `data` and updates the rows matching `filter`.
    ///
    /// Data values are bound first, then the filter's bindings, so a filter
    /// key equal to a column placeholder overrides that column's value.
    pub fn try_update(&self, table: &str, data: &RowData, filter: &Filter, rules: &RuleSet) -> Result<usize> {
        rules.validate(data)?;
        let sql = statement::update(self.policy, table, data, filter.clause())?;
        let params = data_params(data).chain(filter_params(filter));
        self.manager.execute(&sql, params)
    }

    /// Matching zero rows is a success.
    pub fn update(&self, table: &str, data: &RowData, filter: &Filter, rules: &RuleSet) -> bool {
        let result = self.try_update(table, data, filter, rules);
        self.report(&format!("Update {}", table), result).is_some()
    }

    pub fn try_delete(&self, table: &str, filter: &Filter) -> Result<usize> {
        let sql = statement::delete(self.policy, table, filter.clause())?;
        self.manager.execute(&sql, filter_params(filter))
    }

    pub fn delete(&self, table: &str, filter: &Filter) -> bool {
        let result = self.try_delete(table, filter);
        self.report(&format!("Delete from {}", table), result).is_some()
    }

    pub fn try_get(&self, table: &str, select: &Select) -> Result<Vec<RowData>> {
        let clauses = SelectClauses {
            columns: &select.columns,
            where_clause: Some(select.filter.clause()),
            order_by: select.order_by.as_deref(),
            limit: select.limit,
        };
        let sql = statement::select(self.policy, table, clauses)?;
        self.manager.query(&sql, filter_params(&select.filter))
    }

    /// Fetches all matching rows. `None` signals a failure; no matches is
    /// `Some(vec![])`.
    pub fn get(&self, table: &str, select: &Select) -> Option<Vec<RowData>> {
        let result = self.try_get(table, select);
        self.report(&format!("Select from {}", table), result)
    }

    pub fn begin_transaction(&self) -> bool {
        let result = self.manager.begin();
        self.report("Begin transaction", result).is_some()
    }

    pub fn commit_transaction(&self) -> bool {
        let result = self.manager.commit();
        self.report("Commit transaction", result).is_some()
    }

    pub fn rollback_transaction(&self) -> bool {
        let result = self.manager.rollback();
        self.report("Rollback transaction", result).is_some()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.manager.transaction_state()
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_state() == TransactionState::Transaction
    }

    /// Rowid of the last successful `set`, or `None` when disconnected.
    pub fn last_insert_id(&self) -> Option<i64> {
        self.manager.last_insert_rowid().ok()
    }

    /// Logs an error result and drops it.
    fn report<T>(&self, operation: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("{} failed: {:?}", operation, e);
                self.log.record(&format!("{} failed: {}", operation, e));
                None
            }
        }
    }
}

fn no_params() -> std::iter::Empty<(String, &'static Value)> {
    std::iter::empty()
}

fn data_params(data: &RowData) -> impl Iterator<Item = (String, &Value)> + '_ {
    data.iter().map(|(column, value)| (placeholder(column), value))
}

fn filter_params(filter: &Filter) -> impl Iterator<Item = (String, &Value)> + '_ {
    filter.bindings().iter().map(|(name, value)| (name.to_string(), value))
}
