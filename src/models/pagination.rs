//! Pagination types
//!
//! Shared by every listing screen: remote range requests, client-side
//! slicing of already-loaded arrays, and the page-number strip rendered
//! under each table.

use serde::{Deserialize, Serialize};

/// Maximum page size accepted from clients
pub const MAX_PER_PAGE: u32 = 100;

/// Number of slots shown by the page strip before it starts truncating
const WINDOW_SLOTS: u32 = 7;

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Get the offset for range requests
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.per_page as u64
    }

    /// Get the limit for range requests
    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

/// Paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: u64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: u64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Get total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64) as u32
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Page strip for this result
    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.page, self.total_pages())
    }

    /// Transform the items, keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}

/// Slice an in-memory list into one page.
///
/// A page past the end yields no items but still reports the full total.
pub fn paginate_slice<T: Clone>(items: &[T], params: &ListParams) -> PagedResult<T> {
    let start = params.offset().min(items.len() as u64) as usize;
    let end = (start + params.per_page as usize).min(items.len());
    PagedResult::new(items[start..end].to_vec(), items.len() as u64, params)
}

/// One slot of the page strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Compute the page-number strip for `(current, total_pages)`.
///
/// Up to seven pages are listed in full. Past that the strip keeps the
/// first and last page, the current page and its neighbours, and folds the
/// gaps into ellipses: `1 2 3 4 5 … N`, `1 … c-1 c c+1 … N` or
/// `1 … N-4 N-3 N-2 N-1 N`.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    if total_pages <= WINDOW_SLOTS {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let mut items = Vec::with_capacity(WINDOW_SLOTS as usize);

    if current <= 4 {
        items.extend((1..=5).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    } else if current >= total_pages - 3 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((total_pages - 4..=total_pages).map(PageItem::Page));
    } else {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((current - 1..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_list_params_clamps() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, MAX_PER_PAGE);

        let params = ListParams::new(3, 0);
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn test_list_params_offset() {
        assert_eq!(ListParams::new(1, 10).offset(), 0);
        assert_eq!(ListParams::new(3, 20).offset(), 40);
        assert_eq!(ListParams::new(3, 20).limit(), 20);
    }

    #[test]
    fn test_total_pages() {
        let params = ListParams::new(1, 10);
        assert_eq!(PagedResult::<()>::new(vec![], 0, &params).total_pages(), 0);
        assert_eq!(PagedResult::<()>::new(vec![], 10, &params).total_pages(), 1);
        assert_eq!(PagedResult::<()>::new(vec![], 11, &params).total_pages(), 2);
    }

    #[test]
    fn test_has_next_prev() {
        let result = PagedResult::<()>::new(vec![], 25, &ListParams::new(2, 10));
        assert!(result.has_next());
        assert!(result.has_prev());

        let last = PagedResult::<()>::new(vec![], 25, &ListParams::new(3, 10));
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_slice() {
        let items: Vec<u32> = (1..=23).collect();

        let page = paginate_slice(&items, &ListParams::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total, 23);

        let past_end = paginate_slice(&items, &ListParams::new(9, 10));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 23);
    }

    #[test]
    fn test_window_empty() {
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_window_small_lists_everything() {
        assert_eq!(page_window(1, 1), vec![Page(1)]);
        assert_eq!(
            page_window(4, 7),
            (1..=7).map(Page).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_window_near_start() {
        assert_eq!(
            page_window(1, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
        assert_eq!(page_window(4, 10), page_window(1, 10));
    }

    #[test]
    fn test_window_near_end() {
        assert_eq!(
            page_window(10, 10),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
        assert_eq!(page_window(7, 10), page_window(10, 10));
    }

    #[test]
    fn test_window_middle() {
        assert_eq!(
            page_window(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_window_clamps_current() {
        assert_eq!(page_window(0, 10), page_window(1, 10));
        assert_eq!(page_window(99, 10), page_window(10, 10));
    }

    #[test]
    fn test_page_item_serializes_tagged() {
        let json = serde_json::to_value(page_window(1, 8)).unwrap();
        assert_eq!(json[0], serde_json::json!({"kind": "page", "page": 1}));
        assert_eq!(json[5], serde_json::json!({"kind": "ellipsis"}));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn window_is_bounded_and_well_formed(total in 1u32..500, current in 0u32..600) {
            let window = page_window(current, total);
            let clamped = current.clamp(1, total);

            prop_assert!(window.len() <= 7);
            prop_assert_eq!(window.first(), Some(&PageItem::Page(1)));
            prop_assert_eq!(window.last(), Some(&PageItem::Page(total)));
            prop_assert!(window.contains(&PageItem::Page(clamped)));

            for pair in window.windows(2) {
                prop_assert!(!(pair[0] == PageItem::Ellipsis && pair[1] == PageItem::Ellipsis));
            }

            let pages: Vec<u32> = window
                .iter()
                .filter_map(|item| match item {
                    PageItem::Page(n) => Some(*n),
                    PageItem::Ellipsis => None,
                })
                .collect();
            for pair in pages.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        #[test]
        fn ellipsis_only_hides_pages(total in 8u32..500, current in 1u32..500) {
            let window = page_window(current, total);
            for (i, item) in window.iter().enumerate() {
                if *item == PageItem::Ellipsis {
                    let (PageItem::Page(before), PageItem::Page(after)) = (window[i - 1], window[i + 1]) else {
                        panic!("ellipsis must sit between pages");
                    };
                    prop_assert!(after - before >= 2);
                }
            }
        }

        #[test]
        fn slice_pages_cover_input(len in 0usize..200, per_page in 1u32..30) {
            let items: Vec<usize> = (0..len).collect();
            let first = paginate_slice(&items, &ListParams::new(1, per_page));
            let pages = first.total_pages().max(1);
            let mut seen = Vec::new();
            for page in 1..=pages {
                seen.extend(paginate_slice(&items, &ListParams::new(page, per_page)).items);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
