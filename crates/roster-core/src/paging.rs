//! The two pagination strategies behind one interface.

use std::ops::Range;

use roster_api::{to_absolute_index, PageWindow};

/// How a screen's list fetches relate to pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// Every page change delegates to the remote store; its
    /// `{total_items, total_pages, current_page}` values are authoritative.
    RemoteWindow,
    /// One fetch retrieves the entire collection; page changes are local
    /// array slicing with no further network calls.
    ClientSlice,
}

/// Page state for one screen instance.
#[derive(Debug, Clone)]
pub struct Pager {
    strategy: PageStrategy,
    page: u32,
    page_size: u32,
    total_items: usize,
    total_pages: u32,
}

impl Pager {
    pub fn new(strategy: PageStrategy, page_size: u32) -> Self {
        Self {
            strategy,
            page: 1,
            page_size,
            total_items: 0,
            total_pages: 0,
        }
    }

    pub fn strategy(&self) -> PageStrategy {
        self.strategy
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Adopt the authoritative values a server-paginated fetch returned.
    pub fn apply_remote(&mut self, total_items: usize, total_pages: u32, current_page: u32) {
        self.total_items = total_items;
        self.total_pages = total_pages;
        self.page = current_page.max(1);
    }

    /// Recompute totals locally after a full fetch, clamping the page when
    /// the list shrank under it.
    pub fn apply_client(&mut self, total_items: usize) {
        let window = PageWindow::client(self.page, self.page_size, total_items);
        self.total_items = total_items;
        self.total_pages = window.total_pages;
        if self.total_pages > 0 && self.page > self.total_pages {
            self.page = self.total_pages;
        }
    }

    /// Absolute index of a visible row over the full ordering.
    pub fn absolute_index(&self, row: usize) -> usize {
        to_absolute_index(self.page, self.page_size, row)
    }

    /// The slice of a fully fetched list the current page renders.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        match self.strategy {
            // The fetched window is the visible set
            PageStrategy::RemoteWindow => 0..len,
            PageStrategy::ClientSlice => {
                let start = self.absolute_index(0).min(len);
                let end = (start + self.page_size as usize).min(len);
                start..end
            }
        }
    }
}
