//! The five CRUD actions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A CRUD action, used to derive route, role, and template names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudAction {
    /// Paginated, filterable listing.
    List,
    /// Creation form and persist.
    Create,
    /// Edit form and persist.
    Edit,
    /// Read-only display.
    View,
    /// Removal.
    Delete,
}

impl CrudAction {
    /// All actions in declaration order.
    pub const ALL: [CrudAction; 5] = [
        Self::List,
        Self::Create,
        Self::Edit,
        Self::View,
        Self::Delete,
    ];

    /// The lowercase action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::View => "view",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
