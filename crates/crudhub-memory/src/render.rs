//! JSON template renderer.

use std::collections::BTreeSet;

use serde_json::json;

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::TemplateRenderer;
use crudhub_core::types::TemplateVars;

/// Renders a template as a JSON document holding the template name and its
/// variables.
///
/// Templates can be restricted to a known set; rendering an unknown name is
/// then a rendering error.
#[derive(Debug, Clone, Default)]
pub struct JsonTemplateRenderer {
    pretty: bool,
    known: Option<BTreeSet<String>>,
}

impl JsonTemplateRenderer {
    /// Creates a renderer accepting any template name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Accept `template` (and, once called, only registered templates).
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.known
            .get_or_insert_with(BTreeSet::new)
            .insert(template.into());
        self
    }
}

impl TemplateRenderer for JsonTemplateRenderer {
    fn render(&self, template: &str, vars: &TemplateVars) -> AppResult<String> {
        if let Some(known) = &self.known {
            if !known.contains(template) {
                return Err(AppError::rendering(format!(
                    "Unable to find template \"{template}\""
                )));
            }
        }
        let document = json!({
            "template": template,
            "vars": vars,
        });
        let body = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(body)
    }
}
