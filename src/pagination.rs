//! Client-side page window over the current result set.

use std::ops::Range;

pub const PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pagination {
    page_index: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self { page_index: 0, page_size: page_size.max(1) }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changing the size always returns to the first page.
    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page_index = 0;
    }

    /// Step to the next entry of [`PAGE_SIZE_OPTIONS`], wrapping around.
    pub fn cycle_page_size(&mut self) {
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .position(|&s| s == self.page_size)
            .map_or(PAGE_SIZE_OPTIONS[0], |i| PAGE_SIZE_OPTIONS[(i + 1) % PAGE_SIZE_OPTIONS.len()]);
        self.set_page_size(next);
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self, total: usize) -> bool {
        if self.page_index + 1 < self.page_count(total) {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page_index > 0 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    /// Pull the page index back so its offset stays inside `total` rows.
    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total) - 1;
        if self.page_index > last {
            self.page_index = last;
        }
    }

    pub fn window(&self, total: usize) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[self.window(rows.len())]
    }

    /// "1–5 of 7" style range label.
    pub fn label(&self, total: usize) -> String {
        let w = self.window(total);
        if w.is_empty() {
            format!("0–0 of {total}")
        } else {
            format!("{}–{} of {}", w.start + 1, w.end, total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_rows_split_five_and_two() {
        let rows: Vec<u32> = (1..=7).collect();
        let mut p = Pagination::new(5);
        assert_eq!(p.slice(&rows), &[1, 2, 3, 4, 5]);
        assert!(p.next_page(rows.len()));
        assert_eq!(p.slice(&rows), &[6, 7]);
        assert!(!p.next_page(rows.len()));

        p.set_page_size(10);
        assert_eq!(p.page_index(), 0);
        assert_eq!(p.slice(&rows).len(), 7);
    }

    #[test]
    fn clamp_keeps_offset_valid_after_shrink() {
        let mut p = Pagination::new(5);
        p.next_page(11);
        p.next_page(11);
        assert_eq!(p.page_index(), 2);
        p.clamp(10);
        assert_eq!(p.page_index(), 1);
        p.clamp(0);
        assert_eq!(p.page_index(), 0);
        assert_eq!(p.window(0), 0..0);
    }

    #[test]
    fn cycle_walks_size_options() {
        let mut p = Pagination::default();
        p.cycle_page_size();
        assert_eq!(p.page_size(), 10);
        p.cycle_page_size();
        assert_eq!(p.page_size(), 25);
        p.cycle_page_size();
        assert_eq!(p.page_size(), 5);
    }

    #[test]
    fn label_reports_visible_range() {
        let mut p = Pagination::new(5);
        assert_eq!(p.label(7), "1–5 of 7");
        p.next_page(7);
        assert_eq!(p.label(7), "6–7 of 7");
        assert_eq!(Pagination::new(5).label(0), "0–0 of 0");
    }
}
