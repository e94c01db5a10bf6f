//! Shared data model and constants for the viewer.
//!
//! Everything in here is plain data with no external dependencies, so it can
//! be used by the pipeline, the rasterizer and the wire protocol alike.
//!
//! # Coordinate Spaces
//!
//! - **World tiles**: integer tile coordinates as reported by the server.
//! - **World pixels**: world tiles multiplied by the active sprite size.
//! - **Surface pixels**: pixels of the raster surface being displayed.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `RENDER_TICK_MS` | 5 | Render tick period |
//! | `LERP_STEP_MS` | 20 | Minimum time between two lerp steps with an empty backlog |
//! | `HEALTH_CHECK_MS` | 5000 | Transport liveness check period |
//! | `RECONNECT_BACKOFF_MS` | 200 | Delay before reconnecting a dead transport |
//!
//! # Examples
//!
//! ```
//! use rogue_view_types::{Rotation, ViewKind, world_key};
//!
//! assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
//! assert_eq!(Rotation::from_degrees(45), None);
//!
//! assert_eq!(ViewKind::from_wire("SERVER_VIEW_WORLD"), Some(ViewKind::World));
//!
//! assert_eq!(world_key(1, 2), 32768 + 2);
//! assert!(!rogue_view_types::key_in_range(40_000));
//! ```

/// Multiplier used to pack a coordinate pair into one integer key.
///
/// Keys are `x * COORD_STRIDE + y`; the packing is only unique while
/// `|y| < COORD_STRIDE`.
pub const COORD_STRIDE: i64 = 32768;

/// Buffered frame count above which the session is considered lost.
pub const MAX_PENDING_FRAMES: usize = 100;

/// Backlog above which frames are applied without a raster pass.
pub const CATCH_UP_BACKLOG: usize = 10;

/// Dirty grid cell size, in sprites.
pub const DIRTY_GRID_FACTOR: u32 = 5;

/// Number of render advances a floating damage number stays alive.
pub const FLOATING_MAX_AGE: u32 = 10;

/// Render tick period (milliseconds).
pub const RENDER_TICK_MS: u64 = 5;

/// Base delay between lerp steps (milliseconds).
pub const LERP_STEP_MS: u64 = 20;

/// Transport liveness check period (milliseconds).
pub const HEALTH_CHECK_MS: u64 = 5000;

/// Fixed reconnect backoff (milliseconds).
pub const RECONNECT_BACKOFF_MS: u64 = 200;

/// Width of the sidebar painted on the right edge of the surface.
pub const SIDEBAR_WIDTH_PX: u32 = 200;

/// Largest view edge, in tiles, accepted from the server.
pub const MAX_VIEW_TILES: u32 = 1024;

/// Vertical camera distance beyond which a glide takes no fewer steps.
///
/// The follow view keeps this much world around the camera target, so a
/// glide of up to this distance stays inside the key-frame buffer.
pub const LERP_DISTANCE_CLAMP_PX: u32 = 320;

/// Pack a coordinate pair into a single map key.
///
/// Callers storing data under the key check [`key_in_range`] first; outside
/// that range two coordinates can share a key.
#[inline]
pub fn world_key(x: i32, y: i32) -> i64 {
    (x as i64) * COORD_STRIDE + (y as i64)
}

/// Whether `y` packs into a unique [`world_key`].
#[inline]
pub fn key_in_range(y: i32) -> bool {
    (y as i64).abs() < COORD_STRIDE
}

/// Clockwise tile rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a rotation in degrees. Only right angles are valid.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// One image reference in a cell's layer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileLayer {
    pub image_id: u32,
    pub rotation: Rotation,
}

impl TileLayer {
    pub const fn new(image_id: u32, rotation: Rotation) -> Self {
        Self { image_id, rotation }
    }
}

/// Layers of one world cell, bottom (index 0) to top.
pub type LayerStack = Vec<TileLayer>;

/// A rectangular patch of tile changes.
///
/// `x`/`y` are relative to the frame's view origin; `cells` is row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDeltaRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<LayerStack>,
}

impl TileDeltaRect {
    /// Number of cells that can be applied safely.
    ///
    /// A rect whose cell list disagrees with `width * height` only yields the
    /// overlapping prefix.
    pub fn usable_cells(&self) -> usize {
        let declared = (self.width as usize).saturating_mul(self.height as usize);
        self.cells.len().min(declared)
    }
}

/// A creature visible in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureSnapshot {
    pub x: i32,
    pub y: i32,
    pub hp: i64,
    pub max_hp: i64,
    pub username: Option<String>,
}

impl CreatureSnapshot {
    /// Remaining health in `[0, 1]`.
    pub fn health_fraction(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp.max(0) as f64 / self.max_hp as f64).min(1.0)
    }
}

/// One server-reported world snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u64,
    pub view_x: i32,
    pub view_y: i32,
    pub view_width: u32,
    pub view_height: u32,
    pub deltas: Vec<TileDeltaRect>,
    pub creatures: Vec<CreatureSnapshot>,
    /// Bypass dirty tracking and redraw every visible cell.
    pub full_redraw: bool,
    pub game_ticks: Option<u64>,
}

/// A combat hit reported through the UI side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatEvent {
    pub x: i32,
    pub y: i32,
    /// Frame sequence the hit belongs to.
    pub frame: u64,
    pub damage: i64,
}

/// Which server view the viewer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewKind {
    /// Static camera showing the whole world.
    World,
    /// Camera tracking a single agent.
    #[default]
    Follow,
}

impl ViewKind {
    /// Parse the server's view type name.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "SERVER_VIEW_WORLD" => Some(ViewKind::World),
            "SERVER_VIEW_FOLLOW" => Some(ViewKind::Follow),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            ViewKind::World => "SERVER_VIEW_WORLD",
            ViewKind::Follow => "SERVER_VIEW_FOLLOW",
        }
    }

    /// Parse a user-facing name (`world`, `follow`), case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "world" => Some(ViewKind::World),
            "follow" => Some(ViewKind::Follow),
            _ => Self::from_wire(s),
        }
    }
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in world tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
