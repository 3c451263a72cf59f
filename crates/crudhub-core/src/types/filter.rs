//! Filter types for list queries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use super::template::replace_recursive;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// `LIKE` pattern match (`%` wildcard).
    Like,
    /// Case-insensitive `LIKE`.
    ILike,
    /// List membership.
    In,
    /// Value is null or absent.
    IsNull,
    /// Value is present and not null.
    IsNotNull,
}

/// A dynamic filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for `In`).
    StringList(Vec<String>),
    /// No value (for `IsNull`, `IsNotNull`).
    Null,
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::String(value.into()))
    }

    /// Shorthand for a case-insensitive LIKE filter.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::ILike, FilterValue::String(pattern.into()))
    }
}

/// Ad-hoc data bound by a list filter form, merged with enrichment values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterData(pub Map<String, Value>);

impl FilterData {
    /// Create empty filter data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether no filter values are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Apply `enrichment` on top of this data; enrichment wins recursively.
    pub fn enrich(self, enrichment: &FilterData) -> FilterData {
        let mut merged = Value::Object(self.0);
        replace_recursive(&mut merged, Value::Object(enrichment.0.clone()));
        match merged {
            Value::Object(map) => FilterData(map),
            _ => FilterData::default(),
        }
    }
}

impl Validate for FilterData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}
