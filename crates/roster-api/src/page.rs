//! Page-window math shared by both pagination strategies.

use serde::{Deserialize, Serialize};

/// The page state a screen renders its pager from.
///
/// Under server pagination these are the authoritative values returned by
/// the remote store; under client slicing `page`/`page_size` are local-only
/// and `total_items` is the full list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub total_pages: u32,
}

impl PageWindow {
    /// Build a window from locally known values, computing
    /// `total_pages = ceil(total_items / page_size)`.
    pub fn client(page: u32, page_size: u32, total_items: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            (total_items as u32).div_ceil(page_size)
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// Translate a visible row index into an index over the full ordering.
///
/// Both pagination strategies share this translation; callers must never
/// assume row index equals absolute index.
pub fn to_absolute_index(page: u32, page_size: u32, row: usize) -> usize {
    (page.saturating_sub(1) as usize) * (page_size as usize) + row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_index_translation() {
        assert_eq!(to_absolute_index(3, 10, 2), 22);
        assert_eq!(to_absolute_index(1, 10, 0), 0);
        assert_eq!(to_absolute_index(2, 10, 9), 19);
    }

    #[test]
    fn client_window_rounds_pages_up() {
        assert_eq!(PageWindow::client(1, 10, 25).total_pages, 3);
        assert_eq!(PageWindow::client(1, 10, 30).total_pages, 3);
        assert_eq!(PageWindow::client(1, 10, 0).total_pages, 0);
        assert_eq!(PageWindow::client(1, 0, 25).total_pages, 0);
    }
}
