//! Role based permission checks.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::debug;

use crudhub_core::result::AppResult;
use crudhub_core::traits::{AuthorizationChecker, CrudObject, SecurityContext};
use crudhub_core::types::Principal;

/// Grants an attribute when the principal holds it as a role, directly or
/// through the role hierarchy.
#[derive(Debug, Clone, Default)]
pub struct RoleAuthorizationChecker {
    /// Role → roles it implies.
    hierarchy: HashMap<String, HashSet<String>>,
    /// Roles that are granted every attribute.
    super_roles: HashSet<String>,
}

impl RoleAuthorizationChecker {
    /// Creates a checker without hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that holding `role` also grants every role in `implied`.
    pub fn with_hierarchy<I, S>(mut self, role: impl Into<String>, implied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hierarchy
            .entry(role.into())
            .or_default()
            .extend(implied.into_iter().map(Into::into));
        self
    }

    /// Declares a role that is granted every attribute.
    pub fn with_super_role(mut self, role: impl Into<String>) -> Self {
        self.super_roles.insert(role.into());
        self
    }

    /// Every role `principal` holds, hierarchy included.
    pub fn reachable_roles(&self, principal: &Principal) -> HashSet<String> {
        let mut reachable = HashSet::new();
        let mut pending: Vec<String> = principal.roles.clone();
        while let Some(role) = pending.pop() {
            if !reachable.insert(role.clone()) {
                continue;
            }
            if let Some(implied) = self.hierarchy.get(&role) {
                pending.extend(implied.iter().cloned());
            }
        }
        reachable
    }

    /// Whether `principal` holds `attribute`.
    pub fn has_role(&self, principal: Option<&Principal>, attribute: &str) -> bool {
        let Some(principal) = principal else {
            return false;
        };
        let roles = self.reachable_roles(principal);
        let granted =
            roles.contains(attribute) || roles.iter().any(|role| self.super_roles.contains(role));
        debug!(
            user = %principal.username,
            attribute,
            granted,
            "Evaluated role"
        );
        granted
    }
}

#[async_trait]
impl<E: CrudObject> AuthorizationChecker<E> for RoleAuthorizationChecker {
    async fn is_granted(
        &self,
        principal: Option<&Principal>,
        attribute: &str,
        _subject: Option<&E>,
    ) -> AppResult<bool> {
        Ok(self.has_role(principal, attribute))
    }
}

#[async_trait]
impl<E: CrudObject> SecurityContext<E> for RoleAuthorizationChecker {
    async fn is_granted(
        &self,
        principal: Option<&Principal>,
        attribute: &str,
        _subject: Option<&E>,
    ) -> AppResult<bool> {
        Ok(self.has_role(principal, attribute))
    }
}
