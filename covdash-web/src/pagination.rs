//! Pagination utilities for table views

use serde::{Deserialize, Serialize};

/// Page size constant for all paginated tables
pub const PAGE_SIZE: usize = 50;

/// Query parameters for paginated views
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first row on this page
    pub offset: usize,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use covdash_web::pagination::calculate_pagination;
///
/// // 120 total results = 3 pages (50 + 50 + 20)
/// let p = calculate_pagination(120, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 50);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(120, 99);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 100);
/// ```
pub fn calculate_pagination(total_results: usize, requested_page: usize) -> Pagination {
    let total_pages = total_results.div_ceil(PAGE_SIZE);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

/// One page of an in-memory table
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub total_rows: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub rows: Vec<T>,
}

/// Cut the requested page out of `rows`
pub fn paginate<T>(rows: Vec<T>, requested_page: usize) -> Page<T> {
    let total_rows = rows.len();
    let p = calculate_pagination(total_rows, requested_page);
    let rows = rows.into_iter().skip(p.offset).take(PAGE_SIZE).collect();

    Page {
        total_rows,
        page: p.page,
        page_size: PAGE_SIZE,
        total_pages: p.total_pages,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(120, 2);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 50);
    }

    #[test]
    fn test_pagination_out_of_bounds_high() {
        let p = calculate_pagination(75, 99);
        assert_eq!(p.page, 2); // Clamped to last page
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 50);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(75, 0);
        assert_eq!(p.page, 1); // Clamped to first page
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(100, 2);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 50);
    }

    #[test]
    fn test_paginate_last_page_rows() {
        let page = paginate((0..120).collect::<Vec<_>>(), 3);
        assert_eq!(page.total_rows, 120);
        assert_eq!(page.rows, (100..120).collect::<Vec<_>>());
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::<u8>::new(), 5);
        assert_eq!(page.page, 1);
        assert!(page.rows.is_empty());
    }
}
