//! Session state for the viewer: ties the network messages to the frame
//! pipeline and the rasterizer.
//!
//! - [`context`]: [`ViewerContext`], one per connection lifetime
//! - [`ui`]: latest side-channel data (scores, event log, round state)
//! - [`config`]: viewer settings from the environment

pub mod config;
pub mod context;
pub mod ui;

pub use rogue_view_core as core;
pub use rogue_view_net as net;
pub use rogue_view_raster as raster;
pub use rogue_view_types as types;

pub use config::ViewerConfig;
pub use context::{IngestOutcome, TickOutcome, ViewerContext, ViewerStats};
pub use ui::{EventLog, UiState};
