//! Shared pagination types for API query parameters.
//!
//! This module provides standardized pagination for all list endpoints.
//! All endpoints use page-based pagination with `page` and `page_size`
//! parameters and wrap their results in a [`PaginatedResponse`] envelope.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of items to return per page.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum number of items that can be requested per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Standard pagination parameters for list endpoints.
///
/// All list endpoints use consistent page-based pagination with:
/// - `page`: 1-based page number (default: 1)
/// - `page_size`: Maximum items per page (default: 50, max: 100)
///
/// The `page_size` is clamped to ensure it's always between 1 and 100,
/// preventing both zero-result queries and excessive data fetching.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Page number, starting at 1 (default: 1)
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,

    /// Maximum number of items per page (default: 50, max: 100)
    #[param(default = 50, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page_size: Option<i64>,
}

impl Pagination {
    /// Get the page number, defaulting to 1 and never below it.
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the page size, clamped between 1 and MAX_PAGE_SIZE.
    /// Defaults to DEFAULT_PAGE_SIZE if not specified.
    #[inline]
    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of rows to skip for the current page.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

/// Generic paginated response wrapper for list endpoints.
///
/// Wraps a list of items with pagination metadata including total count
/// for client-side pagination calculations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    /// The items for the current page
    pub items: Vec<T>,
    /// Total number of items matching the query (before pagination)
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Maximum items returned per page
    pub page_size: i64,
    /// Total number of pages for this page size
    pub total_pages: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    /// Create a new paginated response; `page_size` must be at least 1.
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = (total + page_size - 1) / page_size;
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}
