/// Value Model Module
///
/// Scalar values exchanged with the store, plus the small ordered containers
/// the facade works with: a row's worth of fields, a table's column
/// definitions, and named parameter bindings.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single scalar stored in or read from a column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text content if this is a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Copies a value borrowed from a result row.
    pub fn from_value_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(r) => ToSqlOutput::from(*r),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An ordered mapping from column name to value.
///
/// Used both for the fields handed to `set`/`update` and for the rows `get`
/// returns. Insertion order is kept; inserting an existing name replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowData {
    fields: Vec<(String, Value)>,
}

impl RowData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for RowData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RowData::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v);
        }
        row
    }
}

impl Serialize for RowData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ordered column definitions for `CREATE TABLE`.
///
/// Type definitions are passed to SQLite verbatim and are not checked here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSpec {
    columns: Vec<(String, String)>,
}

impl ColumnSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &str, definition: &str) -> Self {
        self.columns.push((name.to_string(), definition.to_string()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: AsRef<str>, D: AsRef<str>> FromIterator<(K, D)> for ColumnSpec {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ColumnSpec::new(), |spec, (k, d)| spec.column(k.as_ref(), d.as_ref()))
    }
}

/// Named parameter bindings for a caller-supplied WHERE clause.
///
/// Keys are stored with their sigil; a bare `id` is normalized to `:id`.
/// Binding order is preserved and later bindings of the same key win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.push((placeholder(name), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Returns the named placeholder for a key, adding `:` unless it already
/// carries one of SQLite's parameter sigils.
pub fn placeholder(name: &str) -> String {
    if name.starts_with([':', '@', '$']) {
        name.to_string()
    } else {
        format!(":{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_data_keeps_order_and_replaces() {
        let row = RowData::new()
            .with("id", 1)
            .with("email", "a@b.com")
            .with("id", 2);

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "email"]);
        assert_eq!(row.get("id"), Some(&Value::Integer(2)));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(5), Value::Integer(5));
        assert_eq!(Value::from(1.5), Value::Real(1.5));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("y")), Value::Text("y".to_string()));
    }

    #[test]
    fn test_row_serializes_as_ordered_object() {
        let row = RowData::new()
            .with("id", 1)
            .with("email", "a@b.com")
            .with("score", 2.5)
            .with("note", Value::Null);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":1,"email":"a@b.com","score":2.5,"note":null}"#);
    }

    #[test]
    fn test_placeholder_normalization() {
        assert_eq!(placeholder("id"), ":id");
        assert_eq!(placeholder(":id"), ":id");
        assert_eq!(placeholder("@id"), "@id");
        assert_eq!(placeholder("$id"), "$id");
    }

    #[test]
    fn test_column_spec_from_iter() {
        let spec: ColumnSpec = vec![("id", "INTEGER PRIMARY KEY"), ("email", "TEXT")]
            .into_iter()
            .collect();
        let cols: Vec<_> = spec.iter().collect();
        assert_eq!(cols, vec![("id", "INTEGER PRIMARY KEY"), ("email", "TEXT")]);
    }
}
