//! Pagination and infinite-scroll descriptors.
//!
//! Both are thin collaborators: the table reports page changes and
//! load-more requests through callbacks and never fetches data itself.

use std::fmt;
use std::ops::Range;

use crate::error::{Result, TableError};

/// Default page size choices offered by a page size picker.
pub const DEFAULT_PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50, 100];

/// Default distance from the bottom, in pixels, that triggers load-more.
pub const DEFAULT_LOAD_MORE_THRESHOLD: u32 = 200;

/// Page-based navigation over a known number of items.
///
/// Pages are 1-based.
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    total_items: usize,
    page_size_options: Vec<usize>,
    on_page_change: Option<Box<dyn FnMut(usize)>>,
    on_page_size_change: Option<Box<dyn FnMut(usize)>>,
}

impl Pagination {
    /// Page 1 of `total_items` with the given page size.
    pub fn new(page_size: usize, total_items: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        Ok(Self {
            current_page: 1,
            page_size,
            total_items,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            on_page_change: None,
            on_page_size_change: None,
        })
    }

    /// Set the page change callback.
    pub fn on_page_change(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_page_change = Some(Box::new(f));
        self
    }

    /// Set the page size change callback.
    pub fn on_page_size_change(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_page_size_change = Some(Box::new(f));
        self
    }

    /// Replace the page size choices.
    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Number of pages; at least 1 so an empty table still shows page 1.
    pub fn page_count(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// Item positions shown on the current page.
    pub fn page_bounds(&self) -> Range<usize> {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_items);
        start.min(end)..end
    }

    /// Update the item count, e.g. after filtering. Keeps the current page
    /// in range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        let last = self.page_count();
        if self.current_page > last {
            self.go_to(last);
        }
    }

    /// Move to `page`, clamped to the valid range.
    ///
    /// Returns `true` and fires the callback when the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        let page = page.clamp(1, self.page_count());
        if page == self.current_page {
            return false;
        }
        log::debug!("Page {} -> {}", self.current_page, page);
        self.current_page = page;
        if let Some(f) = self.on_page_change.as_mut() {
            f(page);
        }
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Change the page size and return to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        if page_size != self.page_size {
            self.page_size = page_size;
            if let Some(f) = self.on_page_size_change.as_mut() {
                f(page_size);
            }
        }
        self.go_to(1);
        Ok(())
    }
}

impl fmt::Debug for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pagination")
            .field("current_page", &self.current_page)
            .field("page_size", &self.page_size)
            .field("total_items", &self.total_items)
            .field("page_size_options", &self.page_size_options)
            .finish()
    }
}

/// Load-more trigger for infinite scrolling.
///
/// The caller owns the actual load and reports progress through
/// [`set_loading`](Self::set_loading) and [`set_has_more`](Self::set_has_more).
pub struct InfiniteScroll {
    has_more: bool,
    loading: bool,
    threshold: u32,
    on_load_more: Box<dyn FnMut()>,
}

impl InfiniteScroll {
    pub fn new(on_load_more: impl FnMut() + 'static) -> Self {
        Self {
            has_more: true,
            loading: false,
            threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            on_load_more: Box::new(on_load_more),
        }
    }

    /// Distance from the bottom, in pixels, that triggers a load.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Call on scroll. Fires the load-more callback when more data exists,
    /// no load is in flight, and the viewport is within the threshold of
    /// the bottom.
    pub fn maybe_load_more(&mut self, distance_to_bottom: u32) -> bool {
        if !self.has_more || self.loading || distance_to_bottom > self.threshold {
            return false;
        }
        log::debug!("Requesting more rows ({}px from bottom)", distance_to_bottom);
        (self.on_load_more)();
        true
    }
}

impl fmt::Debug for InfiniteScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfiniteScroll")
            .field("has_more", &self.has_more)
            .field("loading", &self.loading)
            .field("threshold", &self.threshold)
            .finish()
    }
}
