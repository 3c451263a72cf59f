//! Template variable bags and recursive replacement merging.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::result::AppResult;

/// Merge `replacement` into `base`, replacing values key by key.
///
/// Objects are merged per key and arrays per index; whenever both sides hold
/// a container of the same shape the merge recurses, otherwise the
/// replacement value wins. Keys present only in `base` are kept.
pub fn replace_recursive(base: &mut Value, replacement: Value) {
    match (base, replacement) {
        (Value::Object(base), Value::Object(replacement)) => {
            for (key, value) in replacement {
                merge_entry(base, key, value);
            }
        }
        (Value::Array(base), Value::Array(replacement)) => {
            for (index, value) in replacement.into_iter().enumerate() {
                if index < base.len() {
                    if same_container(&base[index], &value) {
                        replace_recursive(&mut base[index], value);
                    } else {
                        base[index] = value;
                    }
                } else {
                    base.push(value);
                }
            }
        }
        (base, replacement) => *base = replacement,
    }
}

fn merge_entry(map: &mut Map<String, Value>, key: String, value: Value) {
    let recurse = map
        .get(&key)
        .is_some_and(|existing| same_container(existing, &value));
    if recurse {
        if let Some(existing) = map.get_mut(&key) {
            replace_recursive(existing, value);
        }
    } else {
        map.insert(key, value);
    }
}

fn same_container(left: &Value, right: &Value) -> bool {
    matches!(
        (left, right),
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
    )
}

/// Ordered mapping of template variable names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateVars(Map<String, Value>);

impl TemplateVars {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a serializable value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) -> AppResult<()> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Insert a raw JSON value under `key`.
    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Builder-style variant of [`TemplateVars::insert_value`].
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert_value(key, value);
        self
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the bag holds `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Variable names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merge caller overrides into this bag. Overrides win on collision.
    pub fn merge(mut self, overrides: TemplateVars) -> Self {
        for (key, value) in overrides.0 {
            merge_entry(&mut self.0, key, value);
        }
        self
    }

    /// The underlying ordered map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for TemplateVars {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for TemplateVars {
    type Error = crate::error::AppError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::error::AppError::validation(format!(
                "Template variables must be a JSON object, got: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_recursive_objects() {
        let mut base = json!({"a": 1, "nested": {"x": 1, "y": 2}, "keep": true});
        replace_recursive(&mut base, json!({"a": 2, "nested": {"y": 3, "z": 4}}));
        assert_eq!(
            base,
            json!({"a": 2, "nested": {"x": 1, "y": 3, "z": 4}, "keep": true})
        );
    }

    #[test]
    fn test_replace_recursive_arrays_by_index() {
        let mut base = json!({"tags": ["a", "b", "c"]});
        replace_recursive(&mut base, json!({"tags": ["z"]}));
        assert_eq!(base, json!({"tags": ["z", "b", "c"]}));
    }

    #[test]
    fn test_replace_recursive_shape_mismatch_replaces() {
        let mut base = json!({"field": {"x": 1}});
        replace_recursive(&mut base, json!({"field": "scalar"}));
        assert_eq!(base, json!({"field": "scalar"}));
    }

    #[test]
    fn test_merge_caller_wins_and_keeps_unique_keys() {
        let base = TemplateVars::new()
            .with("listRoute", json!("post_list"))
            .with("identifier", json!("id"));
        let overrides = TemplateVars::new()
            .with("listRoute", json!("custom_list"))
            .with("extra", json!(42));

        let merged = base.merge(overrides);
        assert_eq!(merged.get("listRoute"), Some(&json!("custom_list")));
        assert_eq!(merged.get("identifier"), Some(&json!("id")));
        assert_eq!(merged.get("extra"), Some(&json!(42)));
        let keys: Vec<_> = merged.keys().cloned().collect();
        assert_eq!(keys, vec!["listRoute", "identifier", "extra"]);
    }

    #[test]
    fn test_try_from_rejects_non_object() {
        assert!(TemplateVars::try_from(json!([1, 2])).is_err());
        assert_eq!(TemplateVars::try_from(json!({"a": 1})).unwrap().len(), 1);
    }
}
