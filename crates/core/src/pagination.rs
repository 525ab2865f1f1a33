//! Page slicing and page-number window calculation
//!
//! Pure functions that turn a filtered result set into the visible page, and
//! the responsive policy that maps a viewport width to a page size.

use serde::Serialize;
use std::num::NonZeroUsize;

/// Maximum number of page buttons shown around the current page
pub const PAGE_WINDOW_SIZE: usize = 5;

/// Width assumed when the caller does not report one (8 items per page)
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 640;

/// Map a viewport width to the number of cards per page
///
/// 4x3 grid from 992, 3x3 from 768, 2x4 from 640, single column below.
pub fn page_size_for_width(width: u32) -> NonZeroUsize {
    let size = if width >= 992 {
        12
    } else if width >= 768 {
        9
    } else if width >= 640 {
        8
    } else {
        6
    };

    NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)
}

/// Number of pages for a result set; never less than one
pub fn total_pages(total_items: usize, page_size: NonZeroUsize) -> usize {
    total_items.div_ceil(page_size.get()).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(requested_page: usize, total_pages: usize) -> usize {
    requested_page.clamp(1, total_pages.max(1))
}

/// Page numbers to display around `current_page`
///
/// Keeps the current page visible and pins the window to either end near
/// the boundaries.
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<usize> {
    let total_pages = total_pages.max(1);
    let current_page = clamp_page(current_page, total_pages);

    let start = if total_pages <= PAGE_WINDOW_SIZE || current_page <= 3 {
        1
    } else if current_page >= total_pages - 2 {
        total_pages - (PAGE_WINDOW_SIZE - 1)
    } else {
        current_page - 2
    };

    let len = PAGE_WINDOW_SIZE.min(total_pages);
    (start..start + len).collect()
}

/// One page of a result set with its navigation metadata
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub page_window: Vec<usize>,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Pagination controls only make sense when there is more than one page
    pub fn shows_controls(&self) -> bool {
        self.total_items > self.page_size
    }

    /// 1-based position of the first visible item within the result set
    pub fn first_item_number(&self) -> usize {
        (self.current_page - 1) * self.page_size + 1
    }
}

/// Slice `items` into the requested page, clamping the page into range
pub fn paginate<T: Clone>(items: &[T], page_size: NonZeroUsize, requested_page: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let current_page = clamp_page(requested_page, total_pages);

    let start = ((current_page - 1) * page_size.get()).min(total_items);
    let end = (start + page_size.get()).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        current_page,
        total_pages,
        total_items,
        page_size: page_size.get(),
        page_window: page_window(current_page, total_pages),
    }
}

/// Page size and current page of a list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    page_size: NonZeroUsize,
    current_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(page_size_for_width(DEFAULT_VIEWPORT_WIDTH))
    }
}

impl PaginationState {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Back to the first page; used whenever the filtered set changes
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn go_to(&mut self, page: usize, total_items: usize) -> usize {
        self.current_page = clamp_page(page, total_pages(total_items, self.page_size));
        self.current_page
    }

    pub fn next(&mut self, total_items: usize) -> usize {
        self.go_to(self.current_page.saturating_add(1), total_items)
    }

    pub fn previous(&mut self, total_items: usize) -> usize {
        self.go_to(self.current_page.saturating_sub(1), total_items)
    }

    /// Change the page size and re-clamp the current page
    pub fn resize(&mut self, page_size: NonZeroUsize, total_items: usize) -> usize {
        self.page_size = page_size;
        self.go_to(self.current_page, total_items)
    }

    pub fn paginate<T: Clone>(&self, items: &[T]) -> Page<T> {
        paginate(items, self.page_size, self.current_page)
    }
}
