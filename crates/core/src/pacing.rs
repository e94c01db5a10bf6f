//! Render pacing.
//!
//! The render loop ticks far more often than it draws. A pacer decides
//! whether enough time has passed since the last unit of work, with intervals
//! that shrink as the frame backlog grows so the viewer catches up.

use crate::types::{CATCH_UP_BACKLOG, LERP_STEP_MS};

const FRAME_BASE_MS: u64 = 30;
const FRAME_SLACK_PER_SLOT_MS: u64 = 7;
const LERP_SPEEDUP_PER_FRAME_MS: u64 = 4;

/// Minimum time between two world-view frames.
pub fn frame_interval_ms(backlog: usize) -> u64 {
    let free_slots = (CATCH_UP_BACKLOG as u64).saturating_sub(backlog as u64);
    FRAME_BASE_MS + FRAME_SLACK_PER_SLOT_MS * free_slots
}

/// Minimum time between two camera steps.
pub fn lerp_step_interval_ms(backlog: usize) -> u64 {
    LERP_STEP_MS.saturating_sub(LERP_SPEEDUP_PER_FRAME_MS.saturating_mul(backlog as u64))
}

/// Whether a frame should be applied without drawing it.
pub fn should_catch_up(backlog: usize, full_redraw: bool) -> bool {
    backlog > CATCH_UP_BACKLOG && !full_redraw
}

#[derive(Debug, Clone, Default)]
pub struct RenderPacer {
    last_mark_ms: u64,
    has_marked: bool,
}

impl RenderPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least `interval_ms` has elapsed since the last mark.
    ///
    /// Always ready before the first mark.
    pub fn ready(&self, now_ms: u64, interval_ms: u64) -> bool {
        !self.has_marked || now_ms.saturating_sub(self.last_mark_ms) >= interval_ms
    }

    /// Record that a unit of work was done at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.has_marked = true;
        self.last_mark_ms = now_ms;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_interval_shrinks_with_backlog() {
        assert_eq!(frame_interval_ms(0), 100);
        assert_eq!(frame_interval_ms(4), 72);
        assert_eq!(frame_interval_ms(10), 30);
        assert_eq!(frame_interval_ms(50), 30);
    }

    #[test]
    fn lerp_interval_floors_at_zero() {
        assert_eq!(lerp_step_interval_ms(0), 20);
        assert_eq!(lerp_step_interval_ms(2), 12);
        assert_eq!(lerp_step_interval_ms(5), 0);
        assert_eq!(lerp_step_interval_ms(90), 0);
    }

    #[test]
    fn catch_up_needs_backlog_and_partial_frame() {
        assert!(!should_catch_up(10, false));
        assert!(should_catch_up(11, false));
        assert!(!should_catch_up(11, true));
    }

    #[test]
    fn pacer_waits_for_interval() {
        let mut p = RenderPacer::new();
        assert!(p.ready(0, 50));
        p.mark(100);
        assert!(!p.ready(120, 50));
        assert!(p.ready(150, 50));
        p.reset();
        assert!(p.ready(0, 50));
    }
}
