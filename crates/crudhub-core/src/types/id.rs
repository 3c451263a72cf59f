//! Identifier values and object references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Value of a managed object's single identifier field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifierValue {
    /// Integer identifier (auto-increment keys).
    Int(i64),
    /// Textual identifier (slugs, UUIDs).
    Text(String),
}

impl IdentifierValue {
    /// The identifier as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for IdentifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for IdentifierValue {
    type Err = std::convert::Infallible;

    /// Parses path segments: anything that reads as an integer becomes
    /// [`IdentifierValue::Int`], everything else stays text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Text(s.to_string())))
    }
}

impl From<i64> for IdentifierValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for IdentifierValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for IdentifierValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Either an already-loaded object or the identifier to resolve it from.
#[derive(Debug, Clone)]
pub enum ObjectRef<E> {
    /// The object was loaded by the caller.
    Loaded(E),
    /// The object still has to be looked up by identifier.
    Id(IdentifierValue),
}

impl<E> From<IdentifierValue> for ObjectRef<E> {
    fn from(id: IdentifierValue) -> Self {
        Self::Id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_prefers_integers() {
        assert_eq!("42".parse::<IdentifierValue>().unwrap(), IdentifierValue::Int(42));
        assert_eq!(
            "my-slug".parse::<IdentifierValue>().unwrap(),
            IdentifierValue::Text("my-slug".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(IdentifierValue::Int(7).to_string(), "7");
        assert_eq!(IdentifierValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_serde_untagged() {
        let json = serde_json::to_string(&IdentifierValue::Int(3)).expect("serialize");
        assert_eq!(json, "3");
        let parsed: IdentifierValue = serde_json::from_str("\"x\"").expect("deserialize");
        assert_eq!(parsed, IdentifierValue::Text("x".to_string()));
    }
}
