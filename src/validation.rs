/// Field Validation Module
///
/// A small declarative rule language for outgoing row data. Each field is
/// given a pipe-delimited rule string such as `"required|integer|min:0"`;
/// tokens may carry one argument after the first `:`.
///
/// Fields are checked in the order they were added to the `RuleSet`, and each
/// field's rules in the order written. The first failing rule ends the whole
/// validation. Fields without rules are never checked, and tokens that do not
/// name a known rule are ignored.

use crate::core::value::{RowData, Value};
use crate::core::{LitegateError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// One parsed rule token
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// The field must be present in the data
    Required,
    /// The value must be text
    String,
    /// An integer, or text made only of ASCII digits
    Integer,
    /// Any number, or text that reads as one
    Float,
    /// Numeric values must be at least this (inclusive)
    Min(f64),
    /// Numeric values must be at most this (inclusive)
    Max(f64),
    /// Text in `local@domain.tld` form
    Email,
    /// The textual form of the value must match this pattern
    Regex(String),
}

impl Rule {
    /// Parses a single token such as `required` or `min:5`.
    ///
    /// Returns `None` for unknown names and for `min`/`max` without a
    /// numeric argument.
    pub fn parse(token: &str) -> Option<Rule> {
        let (name, arg) = match token.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (token, None),
        };
        match name {
            "required" => Some(Rule::Required),
            "string" => Some(Rule::String),
            "integer" => Some(Rule::Integer),
            "float" => Some(Rule::Float),
            "min" => arg.and_then(parse_number).map(Rule::Min),
            "max" => arg.and_then(parse_number).map(Rule::Max),
            "email" => Some(Rule::Email),
            "regex" => arg.map(|p| Rule::Regex(p.to_string())),
            _ => None,
        }
    }

    /// Parses a full pipe-delimited rule string, dropping unknown tokens.
    pub fn parse_list(rules: &str) -> Vec<Rule> {
        rules.split('|').filter_map(Rule::parse).collect()
    }

    /// Checks a field's value; `None` means the field is absent.
    pub fn passes(&self, value: Option<&Value>) -> bool {
        let value = match (self, value) {
            (Rule::Required, v) => return v.is_some(),
            (_, None) => return true,
            (_, Some(v)) => v,
        };

        match self {
            Rule::Required => true,
            Rule::String => matches!(value, Value::Text(_)),
            Rule::Integer => match value {
                Value::Integer(_) => true,
                Value::Text(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
                _ => false,
            },
            Rule::Float => numeric(value).is_some(),
            Rule::Min(min) => numeric(value).map_or(true, |n| n >= *min),
            Rule::Max(max) => numeric(value).map_or(true, |n| n <= *max),
            Rule::Email => value.as_text().map_or(false, |s| EMAIL.is_match(s)),
            Rule::Regex(pattern) => match compile_pattern(pattern) {
                Ok(re) => re.is_match(&value.to_string()),
                Err(_) => false,
            },
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("required"),
            Rule::String => f.write_str("string"),
            Rule::Integer => f.write_str("integer"),
            Rule::Float => f.write_str("float"),
            Rule::Min(n) => write!(f, "min:{}", n),
            Rule::Max(n) => write!(f, "max:{}", n),
            Rule::Email => f.write_str("email"),
            Rule::Regex(p) => write!(f, "regex:{}", p),
        }
    }
}

/// Rules for a set of fields, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    /// An empty rule set; validation always passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field with a pipe-delimited rule string such as `"required|email"`.
    /// Declaring a field again replaces its rules and keeps its position.
    pub fn field(mut self, name: &str, rules: &str) -> Self {
        let rules = Rule::parse_list(rules);
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = rules,
            None => self.fields.push((name.to_string(), rules)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates `data`, stopping at the first failing rule.
    pub fn validate(&self, data: &RowData) -> Result<()> {
        for (field, rules) in &self.fields {
            let value = data.get(field);
            if let Some(rule) = rules.iter().find(|rule| !rule.passes(value)) {
                return Err(LitegateError::Validation {
                    field: field.clone(),
                    rule: rule.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<K: AsRef<str>, R: AsRef<str>> FromIterator<(K, R)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RuleSet::new(), |set, (k, r)| set.field(k.as_ref(), r.as_ref()))
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if NUMERIC.is_match(s) {
        s.parse().ok()
    } else {
        None
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        Value::Text(s) => parse_number(s),
        _ => None,
    }
}

/// Compiles a rule pattern, accepting `/body/flags` delimited form.
fn compile_pattern(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    if let Some(rest) = pattern.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let body = &rest[..end];
            let flags: String = rest[end + 1..]
                .chars()
                .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x'))
                .collect();
            return if flags.is_empty() {
                Regex::new(body)
            } else {
                Regex::new(&format!("(?{}){}", flags, body))
            };
        }
    }
    Regex::new(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, value: impl Into<Value>) -> RowData {
        RowData::new().with(name, value)
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Rule::parse("required"), Some(Rule::Required));
        assert_eq!(Rule::parse("min:0"), Some(Rule::Min(0.0)));
        assert_eq!(Rule::parse("max:2.5"), Some(Rule::Max(2.5)));
        assert_eq!(Rule::parse("regex:^a:b$"), Some(Rule::Regex("^a:b$".to_string())));
        assert_eq!(Rule::parse("min"), None);
        assert_eq!(Rule::parse("min:abc"), None);
        assert_eq!(Rule::parse("uuid"), None);
        assert_eq!(Rule::parse(""), None);
    }

    #[test]
    fn test_parse_list_keeps_order_and_drops_unknown() {
        let rules = Rule::parse_list("required|bogus|integer|min:1");
        assert_eq!(rules, vec![Rule::Required, Rule::Integer, Rule::Min(1.0)]);
    }

    #[test]
    fn test_empty_rules_always_pass() {
        assert!(RuleSet::new().validate(&RowData::new()).is_ok());
        assert!(RuleSet::new().validate(&row("x", "anything")).is_ok());
    }

    #[test]
    fn test_required_only_checks_presence() {
        let rules = RuleSet::new().field("name", "required");
        assert!(rules.validate(&row("other", 1)).is_err());
        assert!(rules.validate(&row("name", Value::Null)).is_ok());
    }

    #[test]
    fn test_absent_fields_skip_non_required_rules() {
        let rules = RuleSet::new().field("age", "integer|min:18|email");
        assert!(rules.validate(&RowData::new()).is_ok());
    }

    #[test]
    fn test_type_rules() {
        let string = RuleSet::new().field("f", "string");
        assert!(string.validate(&row("f", "abc")).is_ok());
        assert!(string.validate(&row("f", 5)).is_err());

        let integer = RuleSet::new().field("f", "integer");
        assert!(integer.validate(&row("f", 5)).is_ok());
        assert!(integer.validate(&row("f", "123")).is_ok());
        assert!(integer.validate(&row("f", "-3")).is_err());
        assert!(integer.validate(&row("f", "")).is_err());
        assert!(integer.validate(&row("f", 1.0)).is_err());

        let float = RuleSet::new().field("f", "float");
        assert!(float.validate(&row("f", 1.5)).is_ok());
        assert!(float.validate(&row("f", 2)).is_ok());
        assert!(float.validate(&row("f", " -1.5e3 ")).is_ok());
        assert!(float.validate(&row("f", "1.2.3")).is_err());
        assert!(float.validate(&row("f", "inf")).is_err());
        assert!(float.validate(&row("f", Value::Null)).is_err());
    }

    #[test]
    fn test_min_max_boundaries_inclusive() {
        let min = RuleSet::new().field("n", "min:10");
        assert!(min.validate(&row("n", 5)).is_err());
        assert!(min.validate(&row("n", 15)).is_ok());
        assert!(min.validate(&row("n", 10)).is_ok());
        assert!(min.validate(&row("n", "9.5")).is_err());

        let max = RuleSet::new().field("n", "max:3");
        assert!(max.validate(&row("n", 3.0)).is_ok());
        assert!(max.validate(&row("n", 4)).is_err());
    }

    #[test]
    fn test_min_ignores_non_numeric_values() {
        let rules = RuleSet::new().field("n", "min:10");
        assert!(rules.validate(&row("n", "hello")).is_ok());
    }

    #[test]
    fn test_email_rule() {
        let rules = RuleSet::new().field("email", "email");
        assert!(rules.validate(&row("email", "a@b.com")).is_ok());
        assert!(rules.validate(&row("email", "first.last+tag@sub.example.org")).is_ok());
        assert!(rules.validate(&row("email", "not-an-email")).is_err());
        assert!(rules.validate(&row("email", "a@b")).is_err());
        assert!(rules.validate(&row("email", ".a@b.com")).is_err());
        assert!(rules.validate(&row("email", 42)).is_err());
    }

    #[test]
    fn test_regex_rule() {
        let rules = RuleSet::new().field("code", "regex:^[A-Z]{3}$");
        assert!(rules.validate(&row("code", "ABC")).is_ok());
        assert!(rules.validate(&row("code", "abc")).is_err());

        let delimited = RuleSet::new().field("code", "regex:/^[a-z]+$/i");
        assert!(delimited.validate(&row("code", "MiXeD")).is_ok());

        let digits = RuleSet::new().field("zip", r"regex:^\d{5}$");
        assert!(digits.validate(&row("zip", 12345)).is_ok());

        let broken = RuleSet::new().field("code", "regex:([");
        assert!(broken.validate(&row("code", "anything")).is_err());
    }

    #[test]
    fn test_short_circuits_on_first_failure() {
        let rules = RuleSet::new()
            .field("a", "required|integer")
            .field("b", "email");
        let data = RowData::new().with("a", "x").with("b", "bad");

        match rules.validate(&data) {
            Err(LitegateError::Validation { field, rule }) => {
                assert_eq!(field, "a");
                assert_eq!(rule, "integer");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_redeclared_field_replaces_rules_in_place() {
        let rules = RuleSet::new()
            .field("n", "min:10")
            .field("other", "required")
            .field("n", "max:100");
        assert!(rules.validate(&RowData::new().with("n", 5).with("other", 1)).is_ok());
        assert!(rules.validate(&RowData::new().with("n", 101).with("other", 1)).is_err());

        // `n` keeps its first position, so it fails before `other` is checked
        match rules.validate(&RowData::new().with("n", 500)) {
            Err(LitegateError::Validation { field, rule }) => {
                assert_eq!(field, "n");
                assert_eq!(rule, "max:100");
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_display_round_trips_token() {
        assert_eq!(Rule::Min(10.0).to_string(), "min:10");
        assert_eq!(Rule::Regex("^a$".to_string()).to_string(), "regex:^a$");
    }
}
