//! Pagination capability.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::object::CrudObject;
use crate::traits::persistence::ListQuery;
use crate::types::pagination::{PageRequest, PageResponse};

/// Turns a list query into one page of results.
#[async_trait]
pub trait Paginator<E: CrudObject>: Send + Sync {
    /// Fetch the page described by `page` from `query`.
    async fn paginate(
        &self,
        query: &dyn ListQuery<E>,
        page: PageRequest,
    ) -> AppResult<PageResponse<E>>;
}
