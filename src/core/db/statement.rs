/// Statement Builder Module
///
/// Assembles the SQL text for each facade operation. Table and column names
/// are interpolated into the statement as given; under
/// `IdentifierPolicy::Trusted` the caller is responsible for them, while
/// `IdentifierPolicy::Strict` rejects anything that is not a plain
/// identifier. WHERE, ORDER BY and column-list fragments are always passed
/// through verbatim.

use crate::core::value::{placeholder, ColumnSpec, RowData};
use crate::core::{LitegateError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// How table and column names are treated before interpolation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Names are interpolated verbatim
    #[default]
    Trusted,
    /// Names must match `^[A-Za-z_][A-Za-z0-9_]*$`
    Strict,
}

impl IdentifierPolicy {
    /// Checks a table or column name against the policy.
    pub fn check<'a>(&self, name: &'a str) -> Result<&'a str> {
        match self {
            IdentifierPolicy::Trusted => Ok(name),
            IdentifierPolicy::Strict if IDENTIFIER.is_match(name) => Ok(name),
            IdentifierPolicy::Strict => Err(LitegateError::InvalidIdentifier(name.to_string())),
        }
    }
}

/// Optional clauses of a `SELECT`, mirroring the arguments of `get`.
#[derive(Debug, Clone, Copy)]
pub struct SelectClauses<'a> {
    pub columns: &'a str,
    pub where_clause: Option<&'a str>,
    pub order_by: Option<&'a str>,
    pub limit: Option<u64>,
}

pub fn create_table(policy: IdentifierPolicy, table: &str, columns: &ColumnSpec) -> Result<String> {
    let table = policy.check(table)?;
    let defs = columns
        .iter()
        .map(|(name, def)| Ok(format!("{} {}", policy.check(name)?, def)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("CREATE TABLE IF NOT EXISTS {} ({})", table, defs.join(", ")))
}

pub fn drop_table(policy: IdentifierPolicy, table: &str) -> Result<String> {
    Ok(format!("DROP TABLE IF EXISTS {}", policy.check(table)?))
}

/// Builds `INSERT INTO t (a, b) VALUES (:a, :b)`.
pub fn insert(policy: IdentifierPolicy, table: &str, data: &RowData) -> Result<String> {
    let table = policy.check(table)?;
    let columns = data
        .columns()
        .map(|c| policy.check(c))
        .collect::<Result<Vec<_>>>()?;
    let placeholders: Vec<String> = columns.iter().map(|c| placeholder(c)).collect();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

/// Builds `UPDATE t SET a = :a, b = :b WHERE <clause>`.
pub fn update(policy: IdentifierPolicy, table: &str, data: &RowData, where_clause: &str) -> Result<String> {
    let table = policy.check(table)?;
    let assignments = data
        .columns()
        .map(|c| Ok(format!("{} = {}", policy.check(c)?, placeholder(c))))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments.join(", "),
        where_clause
    ))
}

pub fn delete(policy: IdentifierPolicy, table: &str, where_clause: &str) -> Result<String> {
    Ok(format!("DELETE FROM {} WHERE {}", policy.check(table)?, where_clause))
}

/// Builds a `SELECT`, appending each optional clause only when it is
/// non-empty. A limit of zero counts as absent; limits above `i64::MAX` are
/// clamped to it, the largest value SQLite accepts.
pub fn select(policy: IdentifierPolicy, table: &str, clauses: SelectClauses<'_>) -> Result<String> {
    let mut sql = format!("SELECT {} FROM {}", clauses.columns, policy.check(table)?);
    if let Some(clause) = clauses.where_clause.filter(|c| !c.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }
    if let Some(order) = clauses.order_by.filter(|o| !o.is_empty()) {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }
    if let Some(limit) = clauses.limit.filter(|l| *l != 0) {
        sql.push_str(&format!(" LIMIT {}", limit.min(i64::MAX as u64)));
    }
    Ok(sql)
}
