//! Applies a frame's rectangular tile deltas to the tile store and flags the
//! affected screen regions dirty.

use tracing::debug;

use crate::dirty::DirtyRegionTracker;
use crate::tile_store::TileDataStore;
use crate::types::Frame;
use crate::window::RenderWindow;

/// What one frame changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeltaSummary {
    pub rects: usize,
    pub cells_written: usize,
    /// The view origin moved, so the whole view was flagged.
    pub view_moved: bool,
}

/// Stateful applier: remembers the previous view origin so a camera move
/// invalidates the whole view.
#[derive(Debug, Clone)]
pub struct DeltaApplier {
    sprite_size: u32,
    last_origin: Option<(i32, i32)>,
}

impl DeltaApplier {
    pub fn new(sprite_size: u32) -> Self {
        Self {
            sprite_size: sprite_size.max(1),
            last_origin: None,
        }
    }

    pub fn sprite_size(&self) -> u32 {
        self.sprite_size
    }

    /// Unpack every delta rect of `frame` into `store` and flag its footprint
    /// in `tracker`.
    ///
    /// Footprints are clamped to `window`, so the flagged area never exceeds
    /// what a raster pass can draw, whatever size the rect declares.
    pub fn apply(
        &mut self,
        frame: &Frame,
        window: &RenderWindow,
        store: &mut TileDataStore,
        tracker: &mut DirtyRegionTracker,
    ) -> DeltaSummary {
        let s = self.sprite_size;
        let mut summary = DeltaSummary::default();

        let origin = (frame.view_x, frame.view_y);
        if self.last_origin != Some(origin) {
            tracker.flag_rect(
                0,
                0,
                frame.view_width.min(window.width).saturating_mul(s),
                frame.view_height.min(window.height).saturating_mul(s),
            );
            summary.view_moved = true;
        }
        self.last_origin = Some(origin);

        for rect in &frame.deltas {
            summary.rects += 1;

            let x = rect.x.saturating_add(frame.view_x).saturating_sub(window.start_x).max(0);
            let y = rect.y.saturating_add(frame.view_y).saturating_sub(window.start_y).max(0);
            if (x as u32) < window.width && (y as u32) < window.height {
                tracker.flag_rect(
                    x.saturating_mul(s as i32),
                    y.saturating_mul(s as i32),
                    rect.width.min(window.width - x as u32).saturating_mul(s),
                    rect.height.min(window.height - y as u32).saturating_mul(s),
                );
            }

            if rect.width == 0 {
                continue;
            }
            let usable = rect.usable_cells();
            if usable != rect.cells.len() {
                debug!(
                    seq = frame.seq,
                    declared = u64::from(rect.width) * u64::from(rect.height),
                    actual = rect.cells.len(),
                    "delta rect cell count mismatch, clamping"
                );
            }

            let w = rect.width as usize;
            for (i, stack) in rect.cells.iter().take(usable).enumerate() {
                let col = ((i % w) as i32).saturating_add(rect.x).saturating_add(frame.view_x);
                let row = ((i / w) as i32).saturating_add(rect.y).saturating_add(frame.view_y);
                if store.replace(col, row, stack.clone()) {
                    summary.cells_written += 1;
                }
            }
        }

        summary
    }

    /// Forget the previous origin so the next frame flags the whole view.
    pub fn reset(&mut self) {
        self.last_origin = None;
    }
}
