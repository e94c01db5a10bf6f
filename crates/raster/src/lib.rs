//! Raster side of the viewer.
//!
//! The rasterizer paints tiles and overlays into an RGBA [`Surface`]. The
//! terminal presenter then samples that surface into half-block character
//! cells and flushes only what changed.

pub mod cells;
pub mod present;
pub mod rasterizer;
pub mod sprites;
pub mod surface;

pub use rogue_view_core as core;
pub use rogue_view_types as types;

pub use cells::{Cell, CellGrid, Rgb};
pub use present::{downsample_into, encode_diff_into, encode_full_into, TerminalPresenter};
pub use rasterizer::{Overlays, RasterStats, Rasterizer, RedrawScope};
pub use sprites::SpriteSheet;
pub use surface::{Label, Surface};
