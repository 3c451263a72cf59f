//! Route table URL generator.

use std::collections::{BTreeMap, BTreeSet};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{RouteParameters, UrlGenerator, UrlReference};
use crudhub_core::types::CrudAction;

/// Characters left intact in path segments and query components.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generates URLs from named path templates such as `/posts/{id}/edit`.
#[derive(Debug, Clone)]
pub struct RouteUrlGenerator {
    base_url: String,
    routes: BTreeMap<String, String>,
}

impl RouteUrlGenerator {
    /// Creates a generator prefixing absolute URLs with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            routes: BTreeMap::new(),
        }
    }

    /// Registers `path` under `name`.
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(name.into(), path.into());
        self
    }

    /// Registers the five CRUD paths below `base_path`, named by `route_name`.
    pub fn with_crud_routes(
        mut self,
        base_path: &str,
        route_name: impl Fn(CrudAction) -> String,
    ) -> Self {
        let base = base_path.trim_end_matches('/');
        for action in CrudAction::ALL {
            let path = match action {
                CrudAction::List if base.is_empty() => "/".to_string(),
                CrudAction::List => base.to_string(),
                CrudAction::Create => format!("{base}/new"),
                CrudAction::Edit => format!("{base}/{{id}}/edit"),
                CrudAction::View => format!("{base}/{{id}}"),
                CrudAction::Delete => format!("{base}/{{id}}/delete"),
            };
            self.routes.insert(route_name(action), path);
        }
        self
    }

    /// The path template registered under `name`.
    pub fn route(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }

    fn expand(&self, name: &str, template: &str, parameters: &RouteParameters) -> AppResult<String> {
        let mut path = String::with_capacity(template.len());
        let mut used = BTreeSet::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            path.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                AppError::configuration(format!("Route {name} has an unterminated placeholder"))
            })?;
            let key = &after[..end];
            let value = parameters.get(key).ok_or_else(|| {
                AppError::configuration(format!(
                    "Some mandatory parameters are missing (\"{key}\") to generate a URL for route \"{name}\""
                ))
            })?;
            path.push_str(&utf8_percent_encode(value, COMPONENT).to_string());
            used.insert(key);
            rest = &after[end + 1..];
        }
        path.push_str(rest);

        let query: Vec<String> = parameters
            .iter()
            .filter(|(key, _)| !used.contains(key.as_str()))
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(value, COMPONENT)
                )
            })
            .collect();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }
        Ok(path)
    }
}

impl UrlGenerator for RouteUrlGenerator {
    fn generate(
        &self,
        route: &str,
        parameters: &RouteParameters,
        reference: UrlReference,
    ) -> AppResult<String> {
        let template = self.route(route).ok_or_else(|| {
            AppError::configuration(format!(
                "Unable to generate a URL for the named route \"{route}\" as such route does not exist."
            ))
        })?;
        let path = self.expand(route, template, parameters)?;
        Ok(match reference {
            UrlReference::AbsolutePath => path,
            UrlReference::AbsoluteUrl => format!("{}{path}", self.base_url),
        })
    }
}
