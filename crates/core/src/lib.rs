//! Frame pipeline for the viewer: pure, deterministic and testable.
//!
//! Nothing in here performs I/O or draws pixels. The pipeline turns an
//! unordered stream of delta frames into an ordered sequence of store updates
//! and dirty regions, plus a camera path for smooth scrolling.
//!
//! # Module Structure
//!
//! - [`reassembler`]: buffers out-of-order frames and releases them in order
//! - [`delta`]: unpacks tile delta rects into the store
//! - [`tile_store`]: sparse world tile map
//! - [`dirty`]: coarse grid of regions needing a redraw
//! - [`window`]: the tile window a raster pass covers
//! - [`lerp`]: camera interpolation between snapshots
//! - [`floating`]: floating damage numbers
//! - [`pacing`]: render timing and catch-up decisions
//! - [`rng`]: deterministic direction picking
//!
//! # Example
//!
//! ```
//! use rogue_view_core::{DeltaApplier, DirtyRegionTracker, FrameReassembler, RenderWindow, TileDataStore};
//! use rogue_view_types::{Frame, Rotation, TileDeltaRect, TileLayer, ViewKind};
//!
//! let frame = Frame {
//!     seq: 1,
//!     view_x: 0,
//!     view_y: 0,
//!     view_width: 4,
//!     view_height: 4,
//!     deltas: vec![TileDeltaRect {
//!         x: 1,
//!         y: 1,
//!         width: 1,
//!         height: 1,
//!         cells: vec![vec![TileLayer::new(7, Rotation::Deg0)]],
//!     }],
//!     creatures: Vec::new(),
//!     full_redraw: false,
//!     game_ticks: None,
//! };
//!
//! let mut reassembler = FrameReassembler::new();
//! reassembler.submit(frame).unwrap();
//! let frame = reassembler.pop_ready().unwrap();
//!
//! let window = RenderWindow::for_frame(ViewKind::World, &frame, 128, 128, 32);
//! let mut store = TileDataStore::new();
//! let mut dirty = DirtyRegionTracker::for_sprite_size(32);
//! DeltaApplier::new(32).apply(&frame, &window, &mut store, &mut dirty);
//!
//! assert_eq!(store.base_image(1, 1), Some(7));
//! assert!(dirty.is_dirty(32, 32));
//! ```

pub mod delta;
pub mod dirty;
pub mod floating;
pub mod lerp;
pub mod pacing;
pub mod reassembler;
pub mod rng;
pub mod tile_store;
pub mod window;

pub use rogue_view_types as types;

pub use delta::{DeltaApplier, DeltaSummary};
pub use dirty::DirtyRegionTracker;
pub use floating::{FloatingDamage, FloatingEntity};
pub use lerp::CameraInterpolator;
pub use pacing::RenderPacer;
pub use reassembler::{FrameReassembler, SubmitError};
pub use rng::SimpleRng;
pub use tile_store::TileDataStore;
pub use window::RenderWindow;
