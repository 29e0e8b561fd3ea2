//! Pagination types shared by every listing

use serde::{Deserialize, Serialize};

/// Fixed number of rows per listing page
pub const PAGE_SIZE: i64 = 30;

/// One page of a listing together with the total page count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_pages: i64) -> Self {
        Self { items, total_pages }
    }

    /// Convert every item, keeping the page count
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_pages: self.total_pages,
        }
    }
}

/// Number of pages needed for `total_rows` rows
pub fn page_count(total_rows: i64) -> i64 {
    if total_rows <= 0 {
        return 0;
    }
    (total_rows + PAGE_SIZE - 1) / PAGE_SIZE
}

/// Row offset of a 1-based page; page 0 is read as page 1
pub fn page_offset(page: u32) -> i64 {
    i64::from(page.max(1) - 1) * PAGE_SIZE
}
