//! Pagination parameters and paged results.
//!
//! Pages are 1-indexed. Page sizes are clamped so a single request can never
//! pull the whole inventory.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Page below 1 becomes 1; page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// Number of pages needed for `total_items`. An empty result has zero pages.
    pub fn total_pages(&self, total_items: u64) -> u32 {
        let per_page = self.per_page as u64;
        total_items.div_ceil(per_page) as u32
    }
}

/// One page of results plus the metadata the UI needs to render a pager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, pagination: &Pagination) -> Self {
        let total_pages = pagination.total_pages(total_count);
        Self {
            items,
            total_count,
            page_number: pagination.page,
            page_size: pagination.per_page,
            total_pages,
            has_previous_page: pagination.page > 1,
            has_next_page: pagination.page < total_pages,
        }
    }

    /// Pages an in-memory list. Used by mock repositories.
    pub fn from_vec(all: Vec<T>, pagination: &Pagination) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Self::new(items, total, pagination)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_default() {
        let p = Pagination::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_offset() {
        let p = Pagination::new(3, 25);
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn test_pagination_clamps() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).per_page, 1);
        assert_eq!(Pagination::new(1, 5000).per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_from_query() {
        assert_eq!(Pagination::from_query(None, None), Pagination::default());
        assert_eq!(
            Pagination::from_query(Some(4), Some(10)),
            Pagination::new(4, 10)
        );
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
        assert_eq!(p.total_pages(95), 10);
    }

    #[test]
    fn test_first_page_flags() {
        let result = PagedResult::new(vec![1, 2, 3], 25, &Pagination::new(1, 10));
        assert_eq!(result.total_pages, 3);
        assert!(!result.has_previous_page);
        assert!(result.has_next_page);
    }

    #[test]
    fn test_middle_page_flags() {
        let result = PagedResult::new(vec![0; 10], 25, &Pagination::new(2, 10));
        assert!(result.has_previous_page);
        assert!(result.has_next_page);
    }

    #[test]
    fn test_last_page_flags() {
        let result = PagedResult::new(vec![0; 5], 25, &Pagination::new(3, 10));
        assert!(result.has_previous_page);
        assert!(!result.has_next_page);
    }

    #[test]
    fn test_empty_result() {
        let result: PagedResult<i32> = PagedResult::new(vec![], 0, &Pagination::default());
        assert!(result.is_empty());
        assert_eq!(result.total_pages, 0);
        assert!(!result.has_next_page);
        assert!(!result.has_previous_page);
    }

    #[test]
    fn test_page_past_end() {
        let result: PagedResult<i32> = PagedResult::new(vec![], 5, &Pagination::new(9, 10));
        assert!(result.has_previous_page);
        assert!(!result.has_next_page);
    }

    #[test]
    fn test_from_vec_slices() {
        let result = PagedResult::from_vec((1..=12).collect(), &Pagination::new(2, 5));
        assert_eq!(result.items, vec![6, 7, 8, 9, 10]);
        assert_eq!(result.total_count, 12);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let result = PagedResult::new(vec![1, 2], 12, &Pagination::new(2, 2)).map(|x| x * 10);
        assert_eq!(result.items, vec![10, 20]);
        assert_eq!(result.total_count, 12);
        assert_eq!(result.page_number, 2);
        assert_eq!(result.total_pages, 6);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = PagedResult::new(vec![1], 1, &Pagination::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["hasNextPage"], false);
        assert_eq!(json["pageSize"], DEFAULT_PAGE_SIZE);
    }
}
