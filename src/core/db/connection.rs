/// Connection Management Module
///
/// This module owns the single SQLite handle behind a facade instance: opening
/// and closing it, applying connection pragmas, the transaction primitives,
/// and executing statements with named-parameter binding.

use crate::core::value::{RowData, Value};
use crate::core::{LitegateError, Result};
use rusqlite::{Connection, Statement};
use std::time::Duration;
use tracing::{debug, info};

/// Represents database transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    /// No active transaction (autocommit mode)
    #[default]
    Autocommit,
    /// Transaction in progress
    Transaction,
}

/// Settings applied to a freshly opened connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionOptions {
    /// `PRAGMA foreign_keys`
    pub foreign_keys: bool,
    /// `PRAGMA journal_mode`, left untouched when `None`
    pub journal_mode: Option<String>,
    /// How long SQLite waits on a locked store before failing the call
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            foreign_keys: true,
            journal_mode: None,
            busy_timeout: Duration::ZERO,
        }
    }
}

/// Connection manager for a single store handle
///
/// The handle is either open or `None`. Nothing reopens it implicitly; every
/// operation on a closed manager fails with `LitegateError::NotConnected`.
#[derive(Debug)]
pub struct ConnectionManager {
    connection: Option<Connection>,
    path: String,
    options: ConnectionOptions,
}

impl ConnectionManager {
    /// Creates a manager for `path` without opening it
    pub fn new(path: &str, options: ConnectionOptions) -> Self {
        ConnectionManager {
            connection: None,
            path: path.to_string(),
            options,
        }
    }

    /// Opens (or reopens) the store
    ///
    /// # Returns
    ///
    /// `Ok(())` once the handle is open and configured. On failure the
    /// manager is left disconnected.
    pub fn connect(&mut self) -> Result<()> {
        self.connection = None;

        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.options.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", self.options.foreign_keys)?;
        if let Some(mode) = &self.options.journal_mode {
            let applied: String =
                conn.pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))?;
            debug!("journal_mode set to {}", applied);
        }

        info!("Connected to {}", self.path);
        self.connection = Some(conn);
        Ok(())
    }

    /// Closes the handle. Calling this on a closed manager does nothing.
    pub fn disconnect(&mut self) -> Result<()> {
        if let Some(conn) = self.connection.take() {
            info!("Disconnecting from {}", self.path);
            conn.close().map_err(|(_, e)| LitegateError::Database(e))?;
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Path the manager opens, as given at construction
    pub fn path(&self) -> &str {
        &self.path
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or(LitegateError::NotConnected)
    }

    /// Gets the current transaction state from the driver's autocommit flag
    pub fn transaction_state(&self) -> TransactionState {
        match &self.connection {
            Some(conn) if !conn.is_autocommit() => TransactionState::Transaction,
            _ => TransactionState::Autocommit,
        }
    }

    pub fn begin(&self) -> Result<()> {
        self.connection()?.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.connection()?.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        self.connection()?.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Rowid of the most recent successful insert on this handle
    pub fn last_insert_rowid(&self) -> Result<i64> {
        Ok(self.connection()?.last_insert_rowid())
    }

    /// Executes a statement that returns no rows
    ///
    /// # Arguments
    ///
    /// * `sql` - Statement text with named placeholders
    /// * `params` - `(placeholder, value)` pairs, bound in order
    ///
    /// # Returns
    ///
    /// The number of rows changed.
    pub fn execute<'v, S, I>(&self, sql: &str, params: I) -> Result<usize>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, &'v Value)>,
    {
        debug!("execute: {}", sql);
        let mut stmt = self.connection()?.prepare(sql)?;
        bind_all(&mut stmt, params)?;
        Ok(stmt.raw_execute()?)
    }

    /// Runs a query and fetches every row as a column-name-to-value mapping
    pub fn query<'v, S, I>(&self, sql: &str, params: I) -> Result<Vec<RowData>>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, &'v Value)>,
    {
        debug!("query: {}", sql);
        let mut stmt = self.connection()?.prepare(sql)?;
        bind_all(&mut stmt, params)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.raw_query();
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = RowData::new();
            for (i, name) in columns.iter().enumerate() {
                record.insert(name, Value::from_value_ref(row.get_ref(i)?));
            }
            result.push(record);
        }
        debug!("query returned {} rows", result.len());
        Ok(result)
    }
}

/// Binds each named parameter; a name bound twice keeps the last value.
fn bind_all<'v, S, I>(stmt: &mut Statement<'_>, params: I) -> Result<()>
where
    S: AsRef<str>,
    I: IntoIterator<Item = (S, &'v Value)>,
{
    for (name, value) in params {
        let name = name.as_ref();
        let index = stmt
            .parameter_index(name)?
            .ok_or_else(|| LitegateError::UnknownParameter(name.to_string()))?;
        stmt.raw_bind_parameter(index, value)?;
    }
    Ok(())
}
