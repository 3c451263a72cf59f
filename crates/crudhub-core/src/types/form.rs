//! Form type descriptors and rendered form views.

use std::collections::BTreeMap;

use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};

/// Describes which fields and buttons a form binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormType {
    /// Form name, exposed to templates.
    pub name: String,
    /// Method whose parameters the form reads.
    pub method: Method,
    /// Bound field names, in display order.
    pub fields: Vec<String>,
    /// Submit button names.
    pub buttons: Vec<String>,
}

impl FormType {
    /// Create a `POST` form type with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: Method::POST,
            fields: Vec::new(),
            buttons: Vec::new(),
        }
    }

    /// Read parameters of `method` instead of the request body.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a bound field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Add a submit button.
    pub fn button(mut self, name: impl Into<String>) -> Self {
        self.buttons.push(name.into());
        self
    }

    /// Whether the form declares `button`.
    pub fn has_button(&self, button: &str) -> bool {
        self.buttons.iter().any(|b| b == button)
    }
}

/// Template-facing snapshot of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormView {
    /// Form name.
    pub name: String,
    /// Current value of each bound field.
    pub values: Map<String, Value>,
    /// Error messages per field; form-level errors use the empty key.
    pub errors: BTreeMap<String, Vec<String>>,
    /// Submit button names.
    pub buttons: Vec<String>,
    /// Whether request data was bound.
    pub submitted: bool,
    /// Whether the bound data passed validation.
    pub valid: bool,
}
