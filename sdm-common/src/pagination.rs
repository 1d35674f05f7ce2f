//! Pagination over the student list
//!
//! Pages are 1-indexed. Unlike a clamping pager, an out-of-range request is
//! rejected; callers ask for [`total_pages`] first and validate the page.

/// Default number of students per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Bounds of one page, calculated from total row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first row on the page
    pub offset: usize,
    /// One past the index of the last row on the page
    pub end: usize,
}

/// Number of pages needed for `total` rows
///
/// A zero page size yields zero pages.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Calculate the bounds of `page`
///
/// Returns `None` when `page` is outside `1..=total_pages`.
///
/// # Examples
/// ```
/// use sdm_common::pagination::calculate_pagination;
///
/// // 23 rows, 10 per page = 3 pages (10 + 10 + 3)
/// let p = calculate_pagination(23, 10, 3).unwrap();
/// assert_eq!(p.offset, 20);
/// assert_eq!(p.end, 23);
///
/// assert!(calculate_pagination(23, 10, 0).is_none());
/// assert!(calculate_pagination(23, 10, 4).is_none());
/// ```
pub fn calculate_pagination(total: usize, page_size: usize, page: usize) -> Option<Pagination> {
    let total_pages = total_pages(total, page_size);
    if page == 0 || page > total_pages {
        return None;
    }

    let offset = (page - 1) * page_size;
    let end = (page * page_size).min(total);

    Some(Pagination {
        page,
        total_pages,
        offset,
        end,
    })
}
