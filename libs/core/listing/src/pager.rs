//! Page window and page metadata arithmetic.

use serde::Serialize;
use utoipa::ToSchema;

/// Slice of the ordered result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

/// Largest limit or offset a storage backend accepts (signed 64-bit).
pub const MAX_WINDOW: u64 = i64::MAX as u64;

/// Page number and size below 1 are clamped to 1; limit and offset are
/// capped at [`MAX_WINDOW`].
pub fn compute_window(page_number: u64, page_size: u64) -> Window {
    let page_number = page_number.max(1);
    let page_size = page_size.clamp(1, MAX_WINDOW);

    Window {
        limit: page_size,
        offset: (page_number - 1).saturating_mul(page_size).min(MAX_WINDOW),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub page_number: u64,
    pub page_size: u64,
    pub count: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

pub fn compute_meta(total_count: u64, page_number: u64, page_size: u64) -> PageMeta {
    let page_number = page_number.max(1);
    let page_size = page_size.max(1);
    let total_pages = total_count.div_ceil(page_size).max(1);

    PageMeta {
        page_number,
        page_size,
        count: total_count,
        total_pages,
        has_previous_page: page_number > 1,
        has_next_page: page_number < total_pages,
    }
}

/// One page of projected records.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub page_number: u64,
    pub page_size: u64,
    /// Records matching the filter across all pages
    pub count: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(meta: PageMeta, data: Vec<T>) -> Self {
        Self {
            page_number: meta.page_number,
            page_size: meta.page_size,
            count: meta.count,
            total_pages: meta.total_pages,
            has_previous_page: meta.has_previous_page,
            has_next_page: meta.has_next_page,
            data,
        }
    }

    /// Replace the records while keeping the page metadata.
    pub fn with_data<U>(self, data: Vec<U>) -> Page<U> {
        Page {
            page_number: self.page_number,
            page_size: self.page_size,
            count: self.count,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
            data,
        }
    }
}
