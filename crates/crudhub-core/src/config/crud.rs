//! Defaults applied to every CRUD controller definition.

use serde::{Deserialize, Serialize};

/// Default page size for list actions.
pub const DEFAULT_PER_PAGE: u64 = 10;
/// Upper bound for a requested page size.
pub const DEFAULT_MAX_PER_PAGE: u64 = 100;
/// Default route name pattern (`<name>_<action>`, lower-cased).
pub const DEFAULT_ROUTE_PATTERN: &str = "%s_%s";
/// Default role name pattern (`ROLE_<NAME>_<ACTION>`, upper-cased).
pub const DEFAULT_ROLE_PATTERN: &str = "role_%s_%s";

/// CRUD naming and pagination defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrudConfig {
    /// Page size used when the request carries no `perPage`.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    /// Largest page size a request may ask for.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,
    /// Route name pattern with two `%s` placeholders (entity, action).
    #[serde(default = "default_route_pattern")]
    pub route_pattern: String,
    /// Role name pattern with two `%s` placeholders (entity, action).
    #[serde(default = "default_role_pattern")]
    pub role_pattern: String,
    /// Template pattern with two `%s` placeholders (Entity, action).
    #[serde(default)]
    pub template_pattern: Option<String>,
    /// Scheme and host prepended to generated URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            route_pattern: default_route_pattern(),
            role_pattern: default_role_pattern(),
            template_pattern: None,
            base_url: default_base_url(),
        }
    }
}

fn default_per_page() -> u64 {
    DEFAULT_PER_PAGE
}

fn default_max_per_page() -> u64 {
    DEFAULT_MAX_PER_PAGE
}

fn default_route_pattern() -> String {
    DEFAULT_ROUTE_PATTERN.to_string()
}

fn default_role_pattern() -> String {
    DEFAULT_ROLE_PATTERN.to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
