//! Pagination types for list actions.

use serde::{Deserialize, Serialize};

use crate::config::crud::{DEFAULT_MAX_PER_PAGE, DEFAULT_PER_PAGE};

/// Request parameters for a paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request, clamped to the default maximum page size.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self::bounded(page, page_size, DEFAULT_MAX_PER_PAGE)
    }

    /// Create a new page request with an explicit maximum page size.
    pub fn bounded(page: u64, page_size: u64, max_page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, max_page_size.max(1)),
        }
    }

    /// Number of items preceding this page, saturating at `u64::MAX`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Maximum number of items on this page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of a paginated query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = if total_items == 0 || page_size == 0 {
            1
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Create an empty response for the given request.
    pub fn empty(page_request: &PageRequest) -> Self {
        Self::new(Vec::new(), page_request.page, page_request.page_size, 0)
    }
}
