//! Authorization capabilities.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::object::CrudObject;
use crate::types::request::Principal;

/// Primary permission evaluator.
#[async_trait]
pub trait AuthorizationChecker<E: CrudObject>: Send + Sync {
    /// Whether `principal` holds `attribute`, optionally for `subject`.
    async fn is_granted(
        &self,
        principal: Option<&Principal>,
        attribute: &str,
        subject: Option<&E>,
    ) -> AppResult<bool>;
}

/// Legacy permission evaluator, consulted only when no
/// [`AuthorizationChecker`] is wired.
#[async_trait]
pub trait SecurityContext<E: CrudObject>: Send + Sync {
    /// Whether `principal` holds `attribute`, optionally for `subject`.
    async fn is_granted(
        &self,
        principal: Option<&Principal>,
        attribute: &str,
        subject: Option<&E>,
    ) -> AppResult<bool>;
}
