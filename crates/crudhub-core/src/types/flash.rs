//! Flash message types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// The action succeeded.
    Success,
    /// The submitted form was invalid.
    Error,
}

impl FlashKind {
    /// The lowercase bag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FlashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message queued for display on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Message category.
    pub kind: FlashKind,
    /// Translation key or literal text.
    pub message: String,
}

impl FlashMessage {
    /// Create a new flash message.
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
