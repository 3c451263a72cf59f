//! Paginator over prepared list queries.

use async_trait::async_trait;
use tracing::debug;

use crudhub_core::result::AppResult;
use crudhub_core::traits::{CrudObject, ListQuery, Paginator};
use crudhub_core::types::{PageRequest, PageResponse};

/// Counts the query, then fetches the requested window.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPaginator;

impl QueryPaginator {
    /// Creates a paginator.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<E: CrudObject> Paginator<E> for QueryPaginator {
    async fn paginate(
        &self,
        query: &dyn ListQuery<E>,
        page: PageRequest,
    ) -> AppResult<PageResponse<E>> {
        let total = query.count().await?;
        if total == 0 {
            return Ok(PageResponse::empty(&page));
        }
        let items = if page.offset() >= total {
            Vec::new()
        } else {
            query.fetch(page.offset(), page.limit()).await?
        };
        debug!(
            page = page.page,
            page_size = page.page_size,
            total,
            returned = items.len(),
            "Paginated query"
        );
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}
