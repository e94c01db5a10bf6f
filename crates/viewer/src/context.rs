//! ViewerContext: owns every stateful pipeline component for one session.
//!
//! The render loop feeds it decoded messages through [`ViewerContext::ingest`]
//! and calls [`ViewerContext::tick`] on every render tick. A tick does at most
//! one unit of work: one frame, or one camera step.

use tracing::{debug, warn};

use crate::core::lerp::natural_target;
use crate::core::pacing::{frame_interval_ms, lerp_step_interval_ms, should_catch_up};
use crate::core::{
    CameraInterpolator, DeltaApplier, DirtyRegionTracker, FloatingDamage, FrameReassembler, RenderPacer,
    RenderWindow, SubmitError, TileDataStore,
};
use crate::config::ViewerConfig;
use crate::net::Inbound;
use crate::raster::{Overlays, RedrawScope, Rasterizer, SpriteSheet, Surface};
use crate::types::{TileRect, ViewKind};
use crate::ui::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Accepted,
    /// The frame backlog overflowed; the transport must be torn down.
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing due.
    Idle,
    FrameDrawn { seq: u64, cells_redrawn: usize },
    /// Applied without a raster pass to catch up with the backlog.
    FrameSkipped { seq: u64 },
    CameraStep { remaining: usize },
}

/// Running counters, mostly for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerStats {
    pub frames_drawn: u64,
    pub frames_skipped: u64,
    pub camera_steps: u64,
    pub overflows: u64,
    /// Tiles written to the store across all applied frames.
    pub cells_written: u64,
}

pub struct ViewerContext {
    view: ViewKind,
    sprite_size: u32,
    surface_width: u32,
    surface_height: u32,
    rng_seed: u32,

    reassembler: FrameReassembler,
    applier: DeltaApplier,
    store: TileDataStore,
    dirty: DirtyRegionTracker,
    lerp: CameraInterpolator,
    floating: FloatingDamage,
    rasterizer: Rasterizer,
    frame_pacer: RenderPacer,
    step_pacer: RenderPacer,

    follow_box: Option<TileRect>,
    last_window: Option<RenderWindow>,
    last_seq: Option<u64>,
    ui: UiState,
    stats: ViewerStats,
}

impl ViewerContext {
    pub fn new(config: &ViewerConfig, sprites: SpriteSheet) -> Self {
        let s = config.sprite_size.max(1);
        Self {
            view: config.view,
            sprite_size: s,
            surface_width: config.surface_width,
            surface_height: config.surface_height,
            rng_seed: config.rng_seed,
            reassembler: FrameReassembler::new(),
            applier: DeltaApplier::new(s),
            store: TileDataStore::new(),
            dirty: DirtyRegionTracker::for_sprite_size(s),
            lerp: CameraInterpolator::new(),
            floating: FloatingDamage::new(s, config.rng_seed),
            rasterizer: Rasterizer::new(config.view, config.surface_width, config.surface_height, s)
                .with_sprites(sprites),
            frame_pacer: RenderPacer::new(),
            step_pacer: RenderPacer::new(),
            follow_box: config.follow_box,
            last_window: None,
            last_seq: None,
            ui: UiState::default(),
            stats: ViewerStats::default(),
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn surface(&self) -> &Surface {
        self.rasterizer.surface()
    }

    pub fn store(&self) -> &TileDataStore {
        &self.store
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn stats(&self) -> ViewerStats {
        self.stats
    }

    pub fn pending_frames(&self) -> usize {
        self.reassembler.len()
    }

    pub fn pending_steps(&self) -> usize {
        self.lerp.pending_steps()
    }

    pub fn floating(&self) -> &FloatingDamage {
        &self.floating
    }

    /// Sequence of the last frame applied, drawn or not.
    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    /// Window covered by the last frame.
    pub fn last_window(&self) -> Option<RenderWindow> {
        self.last_window
    }

    /// Take in one decoded server message.
    pub fn ingest(&mut self, msg: Inbound) -> IngestOutcome {
        match msg {
            Inbound::Frame(frame) => match self.reassembler.submit(frame) {
                Ok(()) => IngestOutcome::Accepted,
                Err(SubmitError::BacklogOverflow { pending, limit }) => {
                    warn!(pending, limit, "frame backlog overflow");
                    self.stats.overflows += 1;
                    IngestOutcome::Overflow
                }
            },
            Inbound::Ui(update) => {
                self.ui.apply(&update);
                self.floating.queue(update.combat_events());
                IngestOutcome::Accepted
            }
            Inbound::Unknown { msg_type } => {
                debug!(%msg_type, "ignoring message");
                IngestOutcome::Accepted
            }
        }
    }

    /// Do at most one unit of work.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        let backlog = self.reassembler.len();
        match self.view {
            ViewKind::Follow => {
                if self.lerp.pending_steps() > 0 {
                    return self.camera_step(now_ms, backlog);
                }
                self.next_frame(now_ms, backlog)
            }
            ViewKind::World => {
                if !self.frame_pacer.ready(now_ms, frame_interval_ms(backlog)) {
                    return TickOutcome::Idle;
                }
                self.next_frame(now_ms, backlog)
            }
        }
    }

    fn camera_step(&mut self, now_ms: u64, backlog: usize) -> TickOutcome {
        if !self.step_pacer.ready(now_ms, lerp_step_interval_ms(backlog)) {
            return TickOutcome::Idle;
        }
        let Some(step) = self.lerp.next_step() else {
            return TickOutcome::Idle;
        };
        self.rasterizer.present_step(step);
        self.step_pacer.mark(now_ms);
        self.stats.camera_steps += 1;
        TickOutcome::CameraStep {
            remaining: self.lerp.pending_steps(),
        }
    }

    fn next_frame(&mut self, now_ms: u64, backlog: usize) -> TickOutcome {
        let Some(frame) = self.reassembler.pop_ready() else {
            return TickOutcome::Idle;
        };
        let s = self.sprite_size;
        let window = RenderWindow::for_frame(self.view, &frame, self.surface_width, self.surface_height, s);

        // Marks carried over from skipped frames are drawn with this one.
        let mut dirty = std::mem::replace(&mut self.dirty, DirtyRegionTracker::for_sprite_size(s));
        let applied = self.applier.apply(&frame, &window, &mut self.store, &mut dirty);
        debug!(
            seq = frame.seq,
            rects = applied.rects,
            cells = applied.cells_written,
            view_moved = applied.view_moved,
            "applied frame"
        );
        self.stats.cells_written += applied.cells_written as u64;
        if frame.game_ticks.is_some() {
            self.ui.game_ticks = frame.game_ticks;
        }
        self.floating.release_due(frame.seq);
        self.last_window = Some(window);
        self.last_seq = Some(frame.seq);
        self.frame_pacer.mark(now_ms);

        if should_catch_up(backlog, frame.full_redraw) {
            debug!(seq = frame.seq, backlog, "skipping raster pass");
            self.dirty.absorb(dirty);
            self.stats.frames_skipped += 1;
            return TickOutcome::FrameSkipped { seq: frame.seq };
        }

        let floating = self.floating.advance();
        let overlays = Overlays {
            creatures: &frame.creatures,
            floating: &floating,
            frame_seq: frame.seq,
            follow_box: self.follow_box,
        };
        let scope = if frame.full_redraw {
            RedrawScope::All
        } else {
            RedrawScope::Dirty(&dirty)
        };
        let stats = self.rasterizer.draw_frame(&window, &self.store, scope, &overlays);

        if self.view == ViewKind::Follow {
            let target = natural_target(&frame, self.surface_width, self.surface_height, s);
            self.lerp.retarget(target);
            self.step_pacer.reset();
        }

        self.stats.frames_drawn += 1;
        TickOutcome::FrameDrawn {
            seq: frame.seq,
            cells_redrawn: stats.cells_redrawn,
        }
    }

    /// Drop all per-session state. Called when the transport goes away.
    ///
    /// UI side data survives so the last known scores stay visible.
    pub fn reset(&mut self) {
        let s = self.sprite_size;
        self.reassembler = FrameReassembler::new();
        self.applier.reset();
        self.store.clear();
        self.dirty = DirtyRegionTracker::for_sprite_size(s);
        self.lerp.reset();
        self.floating = FloatingDamage::new(s, self.rng_seed);
        self.rasterizer.reset();
        self.frame_pacer.reset();
        self.step_pacer.reset();
        self.last_window = None;
        self.last_seq = None;
    }
}
