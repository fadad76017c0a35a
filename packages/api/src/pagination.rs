// ABOUTME: Pagination utilities for list endpoints
// ABOUTME: Normalises page/limit query parameters and builds response metadata

use serde::Serialize;

/// Default page size for paginated queries
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size to prevent performance issues
pub const MAX_PAGE_SIZE: i64 = 100;

/// Minimum page number (1-indexed)
pub const MIN_PAGE: i64 = 1;

pub fn default_page() -> i64 {
    MIN_PAGE
}

pub fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Page request after clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: i64,
    pub limit: i64,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(MIN_PAGE),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET for this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Metadata about pagination state
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let total_pages = (total_items + params.limit - 1) / params.limit;

        Self {
            page: params.page,
            page_size: params.limit,
            total_items,
            total_pages,
            has_next_page: params.page < total_pages,
            has_previous_page: params.page > MIN_PAGE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total_items: i64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(params, total_items),
        }
    }
}
