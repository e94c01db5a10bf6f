//! rogue-view (workspace facade crate).
//!
//! Re-exports the member crates under `rogue_view::{types,core,raster,net,viewer}`
//! so tests, benches and the binary share one import path.

pub use rogue_view_core as core;
pub use rogue_view_net as net;
pub use rogue_view_raster as raster;
pub use rogue_view_types as types;
pub use rogue_view_viewer as viewer;

pub mod keys;
