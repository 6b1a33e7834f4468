/// DataTable Pagination
///
/// Slices the sorted rows into fixed-size pages. There is always at least one
/// page, even when no rows remain, so a page index of 0 is always valid.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current page index and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    index: usize,
    size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        PageState {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageState {
    /// Create a page state; a zero size falls back to the default.
    pub fn new(index: usize, size: usize) -> Self {
        PageState {
            index,
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the index without clamping; `paginate` clamps on the next pass.
    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Change the page size, keeping the first row of the current page on
    /// screen. Returns false and keeps the old size when `size` is zero.
    pub fn set_size(&mut self, size: usize) -> bool {
        if size == 0 {
            log::debug!("rejecting page size 0, keeping {}", self.size);
            return false;
        }
        self.index = self.index * self.size / size;
        self.size = size;
        true
    }
}

/// Number of pages needed for `total` rows; never less than 1.
pub fn page_count(total: usize, size: usize) -> usize {
    if size == 0 {
        return 1;
    }
    total.div_ceil(size).max(1)
}

/// One page of rows as positions into the row slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<usize>,
    pub page_count: usize,
}

/// Take the current page out of `ordered`, clamping `state.index` into range.
pub fn paginate(ordered: &[usize], state: &mut PageState) -> Page {
    let count = page_count(ordered.len(), state.size);

    if state.index >= count {
        log::debug!("clamping page index {} to {}", state.index, count - 1);
        state.index = count - 1;
    }

    let start = (state.index * state.size).min(ordered.len());
    let end = (start + state.size).min(ordered.len());

    Page {
        rows: ordered[start..end].to_vec(),
        page_count: count,
    }
}
