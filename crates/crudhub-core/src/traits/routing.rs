//! URL generation capability.

use std::collections::BTreeMap;

use crate::result::AppResult;

/// Named route parameters.
pub type RouteParameters = BTreeMap<String, String>;

/// Kind of URL to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlReference {
    /// Scheme, host, and path.
    AbsoluteUrl,
    /// Path only.
    AbsolutePath,
}

/// Generates URLs from route names.
pub trait UrlGenerator: Send + Sync {
    /// Generate the URL of `route`. Parameters not consumed by the route
    /// path are appended as a query string.
    fn generate(
        &self,
        route: &str,
        parameters: &RouteParameters,
        reference: UrlReference,
    ) -> AppResult<String>;
}
