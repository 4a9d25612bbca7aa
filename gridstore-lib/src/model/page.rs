//! Pagination state

use serde::Deserialize;
use serde::Serialize;

/// Direction token for moving between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    /// Previous page.
    Left,
    /// Next page.
    Right,
}

/// Cursor-based pagination over filtered data.
///
/// `cursor` is the zero-based offset of the first displayed row, `size` the
/// number of rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Offset of the first displayed row.
    #[serde(default)]
    pub cursor: usize,
    /// Rows per page.
    pub size: usize,
}

impl Pagination {
    /// Creates pagination positioned on the first page.
    pub fn new(size: usize) -> Self {
        Self { cursor: 0, size }
    }

    /// Moves the cursor one page in `direction`.
    ///
    /// The cursor is not clamped against the data length; moving left from
    /// the first page stays at zero.
    pub fn step(&mut self, direction: PageDirection) {
        self.cursor = match direction {
            PageDirection::Right => self.cursor.saturating_add(self.size),
            PageDirection::Left => self.cursor.saturating_sub(self.size),
        };
    }

    /// Moves back to the first page.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns the rows of the current page.
    pub fn slice<'a, T>(&self, data: &'a [T]) -> &'a [T] {
        let start = self.cursor.min(data.len());
        let end = self.cursor.saturating_add(self.size).min(data.len());
        &data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_reset() {
        let mut page = Pagination::new(10);
        page.step(PageDirection::Right);
        page.step(PageDirection::Right);
        assert_eq!(page.cursor, 20);
        page.step(PageDirection::Left);
        assert_eq!(page.cursor, 10);
        page.reset();
        assert_eq!(page.cursor, 0);
        page.step(PageDirection::Left);
        assert_eq!(page.cursor, 0);
    }

    #[test]
    fn test_slice_past_end_is_short_or_empty() {
        let data: Vec<u32> = (0..5).collect();
        let page = Pagination { cursor: 3, size: 4 };
        assert_eq!(page.slice(&data), &[3, 4]);
        let page = Pagination { cursor: 9, size: 4 };
        assert!(page.slice(&data).is_empty());
    }

    #[test]
    fn test_slices_cover_input_once() {
        let data: Vec<u32> = (0..23).collect();
        let mut page = Pagination::new(5);
        let mut seen = Vec::new();
        let mut pages = 0;
        loop {
            let slice = page.slice(&data);
            if slice.is_empty() {
                break;
            }
            pages += 1;
            seen.extend_from_slice(slice);
            page.step(PageDirection::Right);
        }
        assert_eq!(pages, 23usize.div_ceil(5));
        assert_eq!(seen, data);
    }
}
