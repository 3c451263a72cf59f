//! Translation of list filter data into field conditions.
//!
//! Filter data entries map to conditions as follows:
//!
//! - `sort` / `direction`: ordering of the result;
//! - null or blank strings: ignored (an unset filter field);
//! - a string: case-insensitive substring match;
//! - `{"op": "...", "value": ...}`: an explicit [`FilterOp`];
//! - any other scalar or list: equality or list membership.

use std::cmp::Ordering;

use serde_json::Value;

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::types::{
    FilterData, FilterField, FilterOp, FilterValue, SortDirection, SortField,
};

/// Key selecting the sort field.
pub const SORT_KEY: &str = "sort";
/// Key selecting the sort direction.
pub const DIRECTION_KEY: &str = "direction";

/// Conditions and ordering derived from filter data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Conditions every matching object satisfies.
    pub fields: Vec<FilterField>,
    /// Requested ordering.
    pub sort: Option<SortField>,
}

impl FilterCriteria {
    /// Derives criteria from bound filter data.
    pub fn from_filter(data: &FilterData) -> AppResult<Self> {
        let mut fields = Vec::new();
        let mut sort_field: Option<String> = None;
        let mut direction = SortDirection::default();

        for (key, value) in data.iter() {
            match key.as_str() {
                SORT_KEY => {
                    sort_field = value
                        .as_str()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string);
                }
                DIRECTION_KEY => {
                    if let Some(parsed) = value.as_str().and_then(SortDirection::parse) {
                        direction = parsed;
                    }
                }
                _ => {
                    if let Some(field) = condition(key, value)? {
                        fields.push(field);
                    }
                }
            }
        }

        Ok(Self {
            fields,
            sort: sort_field.map(|field| SortField::new(field, direction)),
        })
    }

    /// Whether the serialized object satisfies every condition.
    pub fn matches(&self, object: &Value) -> bool {
        self.fields.iter().all(|field| field_matches(field, object))
    }

    /// Orders serialized objects according to the requested sort.
    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        let Some(sort) = &self.sort else {
            return Ordering::Equal;
        };
        let ordering = compare_values(
            left.get(&sort.field).unwrap_or(&Value::Null),
            right.get(&sort.field).unwrap_or(&Value::Null),
        );
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn condition(key: &str, value: &Value) -> AppResult<Option<FilterField>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(FilterField::ilike(key, format!("%{}%", s.trim())))),
        Value::Object(map) => {
            let op = map
                .get("op")
                .ok_or_else(|| {
                    AppError::validation(format!("Filter {key} needs an \"op\" entry"))
                })
                .and_then(|op| {
                    serde_json::from_value::<FilterOp>(op.clone()).map_err(|e| {
                        AppError::validation(format!("Filter {key} has an unknown op: {e}"))
                    })
                })?;
            let operand = map.get("value").cloned().unwrap_or(Value::Null);
            let operand = serde_json::from_value::<FilterValue>(operand).map_err(|e| {
                AppError::validation(format!("Filter {key} has an invalid value: {e}"))
            })?;
            Ok(Some(FilterField::new(key, op, operand)))
        }
        Value::Array(items) => {
            let list = items.iter().map(value_text).collect();
            Ok(Some(FilterField::new(key, FilterOp::In, FilterValue::StringList(list))))
        }
        other => {
            let operand = serde_json::from_value::<FilterValue>(other.clone())?;
            Ok(Some(FilterField::new(key, FilterOp::Eq, operand)))
        }
    }
}

fn field_matches(field: &FilterField, object: &Value) -> bool {
    let actual = object.get(&field.field).unwrap_or(&Value::Null);
    match field.op {
        FilterOp::IsNull => actual.is_null(),
        FilterOp::IsNotNull => !actual.is_null(),
        FilterOp::Eq => equals(actual, &field.value),
        FilterOp::Ne => !equals(actual, &field.value),
        FilterOp::Gt => ordering(actual, &field.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            ordering(actual, &field.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => ordering(actual, &field.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            ordering(actual, &field.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::Like => match &field.value {
            FilterValue::String(pattern) => !actual.is_null() && like(pattern, &value_text(actual)),
            _ => false,
        },
        FilterOp::ILike => match &field.value {
            FilterValue::String(pattern) => {
                !actual.is_null()
                    && like(&pattern.to_lowercase(), &value_text(actual).to_lowercase())
            }
            _ => false,
        },
        FilterOp::In => match &field.value {
            FilterValue::StringList(list) => list.contains(&value_text(actual)),
            _ => false,
        },
    }
}

fn equals(actual: &Value, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::String(s) => !actual.is_null() && value_text(actual) == *s,
        FilterValue::Integer(i) => actual.as_f64() == Some(*i as f64),
        FilterValue::Float(f) => actual.as_f64() == Some(*f),
        FilterValue::Boolean(b) => actual.as_bool() == Some(*b),
        FilterValue::StringList(list) => list.contains(&value_text(actual)),
        FilterValue::Null => actual.is_null(),
    }
}

fn ordering(actual: &Value, expected: &FilterValue) -> Option<Ordering> {
    let expected_number = match expected {
        FilterValue::Integer(i) => Some(*i as f64),
        FilterValue::Float(f) => Some(*f),
        FilterValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if let (Some(a), Some(b)) = (actual.as_f64(), expected_number) {
        return a.partial_cmp(&b);
    }
    match (actual, expected) {
        (Value::String(a), FilterValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// Null sorts first, then booleans, numbers, strings; anything else is equal.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// SQL `LIKE` matching: `%` is any run of characters, `_` exactly one.
fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}
