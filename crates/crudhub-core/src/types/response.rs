//! Outcome of a CRUD action.

use serde::{Deserialize, Serialize};

/// What an action produced: a rendered page or a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrudResponse {
    /// Rendered template (HTTP 200).
    Html {
        /// Template the body was rendered from.
        template: String,
        /// Rendered body.
        body: String,
    },
    /// Redirect (HTTP 302) to `location`.
    Redirect {
        /// Absolute target URL.
        location: String,
    },
}

impl CrudResponse {
    /// HTTP status code this response maps to.
    pub fn status(&self) -> u16 {
        match self {
            Self::Html { .. } => 200,
            Self::Redirect { .. } => 302,
        }
    }

    /// Whether this is a redirect.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location } => Some(location),
            Self::Html { .. } => None,
        }
    }

    /// Rendered template name, if any.
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::Html { template, .. } => Some(template),
            Self::Redirect { .. } => None,
        }
    }

    /// Rendered body, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Html { body, .. } => Some(body),
            Self::Redirect { .. } => None,
        }
    }
}
