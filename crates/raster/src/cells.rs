//! Character-cell grid the terminal presenter diffs and flushes.

use crate::surface::Color;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for Rgb {
    fn from(c: Color) -> Self {
        Rgb::new(c.0[0], c.0[1], c.0[2])
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize, keeping the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.cells.resize(len, Cell::default());
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Write text starting at `(x, y)`, clipped at the right edge. Cells
    /// without an explicit background keep the one already there.
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, fg: Rgb, bg: Option<Rgb>) {
        for (dx, ch) in s.chars().enumerate() {
            let Some(cx) = x.checked_add(dx as u16) else {
                break;
            };
            if cx >= self.width {
                break;
            }
            let Some(under) = self.get(cx, y) else {
                break;
            };
            self.set(
                cx,
                y,
                Cell {
                    ch,
                    fg,
                    bg: bg.unwrap_or(under.bg),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut g = CellGrid::new(2, 2);
        g.set(5, 5, Cell::default());
        assert_eq!(g.get(5, 5), None);
    }

    #[test]
    fn put_str_clips_and_keeps_background() {
        let mut g = CellGrid::new(3, 1);
        let red = Rgb::new(255, 0, 0);
        g.set(
            1,
            0,
            Cell {
                ch: ' ',
                fg: red,
                bg: red,
            },
        );
        g.put_str(1, 0, "abc", Rgb::new(1, 2, 3), None);
        assert_eq!(g.get(1, 0).map(|c| (c.ch, c.bg)), Some(('a', red)));
        assert_eq!(g.get(2, 0).map(|c| c.ch), Some('b'));
    }
}
