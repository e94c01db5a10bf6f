//! Tile and overlay rasterization.
//!
//! Two strategies, picked once from the view kind:
//!
//! - **World**: draws straight onto the surface. Tiles are restored from a
//!   clean copy taken before overlays, so only dirty cells are repainted.
//! - **Follow**: draws into a key-frame buffer covering the whole render
//!   window, which has room for the camera glide on every side. Camera steps
//!   then copy a surface-sized view out of the buffer at the interpolated
//!   offset.
//!
//! The rasterizer owns the sprite sheet, so its scale cache lives and dies
//! with the raster state.

use tracing::debug;

use crate::core::floating::{font_px, FloatingEntity};
use crate::core::lerp::buffer_offset;
use crate::core::{DirtyRegionTracker, RenderWindow, TileDataStore};
use crate::sprites::SpriteSheet;
use crate::surface::{rgb, Color, Label, Surface};
use crate::types::{CreatureSnapshot, PixelPoint, TileRect, ViewKind, SIDEBAR_WIDTH_PX};

pub const PLAY_AREA: Color = rgb(174, 223, 101);
pub const SIDEBAR: Color = rgb(0x27, 0x78, 0x2e);

const BAR_EMPTY: Color = rgb(0x66, 0x66, 0x66);
const BAR_HEIGHT_PX: u32 = 4;
const BAR_GAP_PX: i32 = 5;
const FOLLOW_BOX: Color = rgb(0, 0, 0x99);
const FOLLOW_BOX_LINE_PX: u32 = 3;
const BOUNDARY_HEIGHT_PX: u32 = 2000;
const BLACK: Color = rgb(0, 0, 0);
const WHITE: Color = rgb(255, 255, 255);
const DAMAGE: Color = rgb(255, 0, 0);
const FRAME_COUNTER_FONT_PX: u32 = 15;

/// 100 colours from red (no health) to green (full health).
pub fn damage_gradient() -> [Color; 100] {
    let mut out = [BLACK; 100];
    for (x, slot) in out.iter_mut().enumerate() {
        let step = (x as f64 * 2.55).floor() as u32;
        let r = 255 - step;
        let g = step;
        let b = 255 - r.max(g);
        *slot = rgb(r as u8, g as u8, b as u8);
    }
    out
}

/// Rough rendered width of a label.
pub fn text_width_px(text: &str, font_px: u32) -> u32 {
    text.chars().count() as u32 * font_px * 3 / 5
}

/// Which cells a pass repaints.
#[derive(Debug, Clone, Copy)]
pub enum RedrawScope<'a> {
    All,
    Dirty(&'a DirtyRegionTracker),
}

impl RedrawScope<'_> {
    fn includes(&self, px: i32, py: i32) -> bool {
        match self {
            RedrawScope::All => true,
            RedrawScope::Dirty(tracker) => tracker.is_dirty(px, py),
        }
    }
}

/// Everything drawn on top of the tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlays<'a> {
    pub creatures: &'a [CreatureSnapshot],
    pub floating: &'a [FloatingEntity],
    pub frame_seq: u64,
    /// Outline of a tracked follow view, world view only.
    pub follow_box: Option<TileRect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterStats {
    pub cells_redrawn: usize,
    pub layers_drawn: usize,
    pub layers_missing: usize,
}

#[derive(Debug, Clone)]
enum Strategy {
    World {
        clean: Option<Surface>,
    },
    Follow {
        key_frame: Surface,
        clean: Option<Surface>,
        window: Option<RenderWindow>,
    },
}

impl Strategy {
    fn for_view(view: ViewKind) -> Self {
        match view {
            ViewKind::World => Strategy::World { clean: None },
            ViewKind::Follow => Strategy::Follow {
                key_frame: Surface::new(0, 0),
                clean: None,
                window: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rasterizer {
    view: ViewKind,
    sprite_size: u32,
    surface: Surface,
    strategy: Strategy,
    sprites: SpriteSheet,
    gradient: [Color; 100],
}

impl Rasterizer {
    /// Rasterizer with an empty sprite sheet; see [`with_sprites`](Self::with_sprites).
    pub fn new(view: ViewKind, surface_w: u32, surface_h: u32, sprite_size: u32) -> Self {
        let sprite_size = sprite_size.max(1);
        Self {
            view,
            sprite_size,
            surface: Surface::new(surface_w, surface_h),
            strategy: Strategy::for_view(view),
            sprites: SpriteSheet::new(sprite_size),
            gradient: damage_gradient(),
        }
    }

    pub fn with_sprites(mut self, sprites: SpriteSheet) -> Self {
        if sprites.sprite_size() != self.sprite_size {
            debug!(
                sheet = sprites.sprite_size(),
                raster = self.sprite_size,
                "sprite sheet scaled for a different size"
            );
        }
        self.sprites = sprites;
        self
    }

    pub fn sprites(&self) -> &SpriteSheet {
        &self.sprites
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The key-frame buffer, follow view only.
    pub fn key_frame(&self) -> Option<&Surface> {
        match &self.strategy {
            Strategy::Follow { key_frame, .. } => Some(key_frame),
            Strategy::World { .. } => None,
        }
    }

    /// Drop clean copies, the key-frame buffer and the scale cache. The next
    /// pass repaints everything.
    pub fn reset(&mut self) {
        self.strategy = Strategy::for_view(self.view);
        self.sprites.clear_cache();
    }

    pub fn resize(&mut self, surface_w: u32, surface_h: u32) {
        self.surface.resize(surface_w, surface_h);
        self.reset();
    }

    /// Rasterize one frame.
    ///
    /// In the world view the result lands on the surface. In the follow view
    /// it lands in the key-frame buffer and becomes visible through
    /// [`present_step`](Self::present_step).
    pub fn draw_frame(
        &mut self,
        window: &RenderWindow,
        store: &TileDataStore,
        scope: RedrawScope<'_>,
        overlays: &Overlays<'_>,
    ) -> RasterStats {
        let s = self.sprite_size;
        let view = self.view;
        let gradient = &self.gradient;
        let sprites = &mut self.sprites;

        match &mut self.strategy {
            Strategy::World { clean } => {
                let stats = compose_tiles(&mut self.surface, clean, window, store, sprites, scope, s, true);
                draw_overlays(&mut self.surface, window, overlays, gradient, s, view);
                stats
            }
            Strategy::Follow {
                key_frame,
                clean,
                window: last,
            } => {
                let (w, h) = window.size_px(s);
                let mut scope = scope;
                if *last != Some(*window) {
                    // Buffer contents are window-relative; a moved window
                    // invalidates all of them.
                    key_frame.resize(w, h);
                    *clean = None;
                    scope = RedrawScope::All;
                }
                let stats = compose_tiles(key_frame, clean, window, store, sprites, scope, s, false);
                draw_overlays(key_frame, window, overlays, gradient, s, view);
                *last = Some(*window);
                stats
            }
        }
    }

    /// Show the key-frame buffer at a camera position. Returns `false` when
    /// there is nothing to show (world view, or no frame drawn yet).
    pub fn present_step(&mut self, step: PixelPoint) -> bool {
        let Strategy::Follow {
            key_frame,
            window: Some(window),
            ..
        } = &self.strategy
        else {
            return false;
        };
        let (ox, oy) = buffer_offset(
            step,
            window,
            self.sprite_size,
            self.surface.width(),
            self.surface.height(),
        );
        self.surface.blit_window(key_frame, ox, oy);
        true
    }
}

fn background_at(px: i32, target_w: u32, sidebar: bool) -> Color {
    if sidebar && px >= target_w.saturating_sub(SIDEBAR_WIDTH_PX) as i32 {
        SIDEBAR
    } else {
        PLAY_AREA
    }
}

fn paint_background(target: &mut Surface, sidebar: bool) {
    let (w, h) = (target.width(), target.height());
    target.fill(PLAY_AREA);
    if sidebar {
        let x = w.saturating_sub(SIDEBAR_WIDTH_PX);
        target.fill_rect(x as i32, 0, w - x, h, SIDEBAR);
    }
}

#[allow(clippy::too_many_arguments)]
fn compose_tiles(
    target: &mut Surface,
    clean: &mut Option<Surface>,
    window: &RenderWindow,
    store: &TileDataStore,
    sprites: &mut SpriteSheet,
    scope: RedrawScope<'_>,
    s: u32,
    sidebar: bool,
) -> RasterStats {
    let mut scope = scope;
    match clean.as_ref() {
        Some(c) if c.width() == target.width() && c.height() == target.height() => {
            target.copy_from(c);
        }
        _ => {
            paint_background(target, sidebar);
            scope = RedrawScope::All;
        }
    }

    let mut stats = RasterStats::default();
    let (tw, th) = (target.width() as i32, target.height() as i32);
    for row in 0..window.height {
        let py = (row * s) as i32;
        if py >= th {
            break;
        }
        for col in 0..window.width {
            let px = (col * s) as i32;
            if px >= tw {
                break;
            }
            if !scope.includes(px, py) {
                continue;
            }
            stats.cells_redrawn += 1;
            target.fill_rect(px, py, s, s, background_at(px, target.width(), sidebar));

            let wx = window.start_x + col as i32;
            let wy = window.start_y + row as i32;
            let Some(layers) = store.get(wx, wy) else {
                continue;
            };
            for layer in layers {
                match sprites.tile(layer.image_id, layer.rotation) {
                    Some(tile) => {
                        target.draw_image(tile.image(), px, py);
                        stats.layers_drawn += 1;
                    }
                    None => stats.layers_missing += 1,
                }
            }
        }
    }

    if stats.layers_missing > 0 {
        debug!(missing = stats.layers_missing, "skipped layers with unknown images");
    }

    match clean {
        Some(c) => c.copy_from(target),
        None => *clean = Some(target.clone()),
    }
    stats
}

fn draw_overlays(
    target: &mut Surface,
    window: &RenderWindow,
    overlays: &Overlays<'_>,
    gradient: &[Color; 100],
    s: u32,
    view: ViewKind,
) {
    let si = s as i32;

    for creature in overlays.creatures {
        let col = creature.x - window.start_x;
        let row = creature.y - window.start_y;
        if row >= window.height as i32 - 2 {
            continue;
        }

        let pct = creature.health_fraction();
        let idx = (100.0 * pct).clamp(0.0, 99.0).floor() as usize;
        let filled = (s as f64 * pct) as u32;
        let bar_y = (row + 1) * si + BAR_GAP_PX;
        target.fill_rect(col * si, bar_y, filled, BAR_HEIGHT_PX, gradient[idx]);
        target.fill_rect(col * si + filled as i32, bar_y, s - filled, BAR_HEIGHT_PX, BAR_EMPTY);

        if let Some(name) = &creature.username {
            let (font, y_shift) = match view {
                ViewKind::World => (9, 10),
                ViewKind::Follow => (12, 0),
            };
            let text_w = text_width_px(name, font) as i32;
            let x = col * si + si / 2 - text_w / 2;
            target.push_label(Label {
                x: x + 3,
                y: (row + 2) * si + 4 + y_shift - font as i32,
                text: name.clone(),
                fg: WHITE,
                bg: Some(BLACK),
                font_px: font,
            });
        }
    }

    target.push_label(Label {
        x: 20,
        y: 20 - FRAME_COUNTER_FONT_PX as i32,
        text: overlays.frame_seq.to_string(),
        fg: WHITE,
        bg: None,
        font_px: FRAME_COUNTER_FONT_PX,
    });

    let font = font_px(s);
    for entity in overlays.floating {
        if let Some(p) = entity.surface_position(window, s) {
            target.push_label(Label {
                x: p.x,
                y: p.y - font as i32,
                text: entity.value.to_string(),
                fg: DAMAGE,
                bg: None,
                font_px: font,
            });
        }
    }

    if view == ViewKind::World {
        if let Some(b) = overlays.follow_box {
            let line = FOLLOW_BOX_LINE_PX as i32;
            target.stroke_rect(
                (b.x - window.start_x) * si - line,
                (b.y - window.start_y) * si - line,
                b.width.saturating_mul(s),
                b.height.saturating_mul(s),
                FOLLOW_BOX_LINE_PX,
                FOLLOW_BOX,
            );
        }
        target.fill_rect(0, 0, 1, BOUNDARY_HEIGHT_PX, BLACK);
    }
}
