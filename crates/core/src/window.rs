//! The window of world tiles a raster pass covers.

use crate::types::{Frame, PixelPoint, ViewKind, LERP_DISTANCE_CLAMP_PX};

/// Visible tile window in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderWindow {
    pub start_x: i32,
    pub start_y: i32,
    pub width: u32,
    pub height: u32,
}

impl RenderWindow {
    /// Window for a frame.
    ///
    /// The world view shows exactly what the server sent. The follow view is
    /// centred on the server's view and sized to the surface plus a one-tile
    /// margin, grown on every side by the lerp distance clamp. The camera
    /// position of the previous frame is therefore still inside the window
    /// and a glide starts where the last one ended.
    pub fn for_frame(
        view: ViewKind,
        frame: &Frame,
        surface_w: u32,
        surface_h: u32,
        sprite_size: u32,
    ) -> Self {
        match view {
            ViewKind::World => Self {
                start_x: frame.view_x,
                start_y: frame.view_y,
                width: frame.view_width,
                height: frame.view_height,
            },
            ViewKind::Follow => {
                let sprite = sprite_size.max(1);
                let reach = 2 * LERP_DISTANCE_CLAMP_PX.div_ceil(sprite);
                let width = surface_w / sprite + 2 + reach;
                let height = surface_h / sprite + 2 + reach;
                let center_x = frame.view_x.saturating_add((frame.view_width / 2) as i32);
                let center_y = frame.view_y.saturating_add((frame.view_height / 2) as i32);
                Self {
                    start_x: center_x - (width / 2) as i32,
                    start_y: center_y - (height / 2) as i32,
                    width,
                    height,
                }
            }
        }
    }

    /// Top-left corner in world pixels.
    pub fn origin_px(&self, sprite_size: u32) -> PixelPoint {
        let s = sprite_size as i32;
        PixelPoint::new(self.start_x.saturating_mul(s), self.start_y.saturating_mul(s))
    }

    /// Size in pixels.
    pub fn size_px(&self, sprite_size: u32) -> (u32, u32) {
        (
            self.width.saturating_mul(sprite_size),
            self.height.saturating_mul(sprite_size),
        )
    }

    /// Window-relative column/row of a world tile, if inside.
    pub fn local(&self, world_x: i32, world_y: i32) -> Option<(u32, u32)> {
        let col = world_x - self.start_x;
        let row = world_y - self.start_y;
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some((col as u32, row as u32))
    }
}
