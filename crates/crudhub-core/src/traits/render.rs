//! Template rendering capability.

use crate::result::AppResult;
use crate::types::template::TemplateVars;

/// Renders a named template with a variable bag.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` to a string.
    fn render(&self, template: &str, vars: &TemplateVars) -> AppResult<String>;
}
