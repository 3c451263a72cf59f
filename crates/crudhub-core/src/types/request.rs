//! Framework-neutral view of an inbound HTTP request.

use std::collections::BTreeMap;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The authenticated caller, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User name.
    pub username: String,
    /// Granted role names (e.g. `ROLE_BLOGPOST_LIST`).
    pub roles: Vec<String>,
}

impl Principal {
    /// Create a principal with the given roles.
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the principal holds `role` (case-sensitive).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// The parts of an HTTP request the CRUD actions read.
#[derive(Debug, Clone)]
pub struct CrudRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Decoded query string parameters.
    pub query: BTreeMap<String, String>,
    /// Decoded form fields from the request body.
    pub form: BTreeMap<String, String>,
    /// Authenticated caller.
    pub principal: Option<Principal>,
}

impl CrudRequest {
    /// Create a request with no parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            form: BTreeMap::new(),
            principal: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a submitted form field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Attach the authenticated caller.
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Whether this is a `POST` request.
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// Look up a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Parameters a form bound with `method` reads: the query string for
    /// `GET` forms, the body otherwise.
    pub fn parameters_for(&self, method: &Method) -> &BTreeMap<String, String> {
        if *method == Method::GET {
            &self.query
        } else {
            &self.form
        }
    }

    /// Serializable snapshot exposed to templates as `request`.
    pub fn to_value(&self) -> Value {
        json!({
            "method": self.method.as_str(),
            "path": self.path,
            "query": self.query,
            "user": self.principal.as_ref().map(|p| p.username.as_str()),
        })
    }
}
