#![forbid(unsafe_code)]

//! Row-major cell grid.
//!
//! A [`Buffer`] is the full frame handed to a presenter. Out-of-bounds
//! access through the checked accessors is a no-op rather than a panic:
//! animations routinely compute rows above or below the visible area.

use crate::cell::Cell;

/// A `width x height` grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a blank buffer.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    /// Width in columns.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Whether the buffer has no cells at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Cell at `(x, y)`, if inside the grid.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at `(x, y)`, if inside the grid.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`. Ignored outside the grid.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = cell;
        }
    }

    /// Fill every cell with `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.fill(Cell::BLANK);
    }

    /// Change dimensions, discarding content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, Cell::BLANK);
    }

    /// Cells of row `y` (empty slice outside the grid).
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Characters of row `y` as a string.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y).iter().map(|c| c.ch).collect()
    }

    /// Number of non-blank cells.
    pub fn painted_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_blank() {
        let buf = Buffer::new(4, 3);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 3);
        assert_eq!(buf.painted_cells(), 0);
        assert_eq!(buf.row_text(1), "    ");
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut buf = Buffer::new(2, 2);
        buf.set(5, 0, Cell::from_char('x'));
        buf.set(0, 9, Cell::from_char('x'));
        assert!(buf.get(2, 0).is_none());
        assert!(buf.row(2).is_empty());
        assert_eq!(buf.painted_cells(), 0);
    }

    #[test]
    fn set_and_read_back() {
        let mut buf = Buffer::new(3, 2);
        buf.set(2, 1, Cell::from_char('Z'));
        assert_eq!(buf.get(2, 1).map(|c| c.ch), Some('Z'));
        assert_eq!(buf.row_text(1), "  Z");
    }

    #[test]
    fn resize_discards_content() {
        let mut buf = Buffer::new(3, 3);
        buf.fill(Cell::from_char('#'));
        buf.resize(5, 1);
        assert_eq!(buf.width(), 5);
        assert_eq!(buf.height(), 1);
        assert_eq!(buf.painted_cells(), 0);
    }

    #[test]
    fn zero_sized_buffer_is_safe() {
        let mut buf = Buffer::new(0, 0);
        assert!(buf.is_empty());
        buf.set(0, 0, Cell::from_char('x'));
        buf.clear();
        assert_eq!(buf.row_text(0), "");
    }
}
