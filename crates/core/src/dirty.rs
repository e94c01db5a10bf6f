//! Coarse dirty-region tracking for incremental redraws.
//!
//! The surface is split into a grid of cells `DIRTY_GRID_FACTOR` sprites wide
//! and tall. Flagging is deliberately generous (one cell of overscan in each
//! direction) so rounding at rect edges never leaves stale pixels behind.
//!
//! A tracker only ever grows. Once a raster pass has consumed it, it is
//! replaced with a fresh instance rather than cleared.

use std::collections::HashSet;

use crate::types::{world_key, DIRTY_GRID_FACTOR};

#[derive(Debug, Clone)]
pub struct DirtyRegionTracker {
    cell_w: u32,
    cell_h: u32,
    cells: HashSet<i64>,
}

impl DirtyRegionTracker {
    /// Tracker with an explicit grid cell size in pixels.
    pub fn new(cell_w: u32, cell_h: u32) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            cells: HashSet::new(),
        }
    }

    /// Tracker whose cells span `DIRTY_GRID_FACTOR` sprites.
    pub fn for_sprite_size(sprite_size: u32) -> Self {
        let side = sprite_size.max(1) * DIRTY_GRID_FACTOR;
        Self::new(side, side)
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_w, self.cell_h)
    }

    #[inline]
    fn cell_of(&self, px: i32, py: i32) -> i64 {
        let gx = px.div_euclid(self.cell_w as i32);
        let gy = py.div_euclid(self.cell_h as i32);
        world_key(gx, gy)
    }

    /// Flag the grid cell containing a pixel.
    pub fn flag_pixel(&mut self, px: i32, py: i32) {
        let key = self.cell_of(px, py);
        self.cells.insert(key);
    }

    /// Flag every grid cell touched by a pixel rectangle, plus one cell of
    /// overscan to the right and bottom.
    pub fn flag_rect(&mut self, px: i32, py: i32, width: u32, height: u32) {
        let step_x = self.cell_w as i64;
        let step_y = self.cell_h as i64;
        let end_x = px as i64 + width as i64 + step_x;
        let end_y = py as i64 + height as i64 + step_y;

        let mut x = px as i64;
        while x <= end_x {
            let mut y = py as i64;
            while y <= end_y {
                self.flag_pixel(x as i32, y as i32);
                y += step_y;
            }
            x += step_x;
        }
    }

    /// Whether the grid cell containing this pixel has been flagged.
    pub fn is_dirty(&self, px: i32, py: i32) -> bool {
        self.cells.contains(&self.cell_of(px, py))
    }

    /// Fold another tracker's flags into this one.
    ///
    /// Both trackers must share a grid size; mismatched grids are ignored.
    pub fn absorb(&mut self, other: DirtyRegionTracker) {
        if other.cell_size() != self.cell_size() {
            return;
        }
        self.cells.extend(other.cells);
    }

    pub fn dirty_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
