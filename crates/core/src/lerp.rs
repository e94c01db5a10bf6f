//! Camera interpolation between discrete server snapshots.
//!
//! Each frame moves the camera to a new natural target. Instead of jumping,
//! the interpolator emits a short run of intermediate positions which the
//! render loop presents one at a time.

use arrayvec::ArrayVec;

use crate::types::{Frame, PixelPoint, LERP_DISTANCE_CLAMP_PX};
use crate::window::RenderWindow;

/// Largest number of steps a single retarget can produce.
pub const MAX_LERP_STEPS: usize = 12;

const MIN_LERP_STEPS: u32 = 2;
const DISTANCE_PER_STEP_PX: u32 = 45;

/// Number of steps used to cover a vertical distance.
///
/// Longer moves get fewer steps so the camera catches up faster. Only the
/// vertical distance is considered.
pub fn step_count(dy: i32) -> usize {
    let distance = dy.unsigned_abs().min(LERP_DISTANCE_CLAMP_PX);
    let reduction = (distance / DISTANCE_PER_STEP_PX).min(MAX_LERP_STEPS as u32 - MIN_LERP_STEPS);
    MAX_LERP_STEPS - reduction as usize
}

/// Camera position that centres the frame's view on the surface, in world
/// pixels.
pub fn natural_target(frame: &Frame, surface_w: u32, surface_h: u32, sprite_size: u32) -> PixelPoint {
    let s = sprite_size as i32;
    let cx = (frame.view_x + (frame.view_width / 2) as i32) * s;
    let cy = (frame.view_y + (frame.view_height / 2) as i32) * s;
    PixelPoint::new(cx - (surface_w / 2) as i32, cy - (surface_h / 2) as i32)
}

/// Map a camera position into key-frame buffer space.
///
/// The result is the top-left corner of a surface-sized window inside a
/// buffer covering `window`, clamped so the window never leaves the buffer.
pub fn buffer_offset(
    step: PixelPoint,
    window: &RenderWindow,
    sprite_size: u32,
    surface_w: u32,
    surface_h: u32,
) -> (u32, u32) {
    let origin = window.origin_px(sprite_size);
    let (buf_w, buf_h) = window.size_px(sprite_size);
    let max_x = buf_w.saturating_sub(surface_w) as i64;
    let max_y = buf_h.saturating_sub(surface_h) as i64;
    let x = (step.x as i64 - origin.x as i64).clamp(0, max_x);
    let y = (step.y as i64 - origin.y as i64).clamp(0, max_y);
    (x as u32, y as u32)
}

#[derive(Debug, Clone, Default)]
pub struct CameraInterpolator {
    current: Option<PixelPoint>,
    /// Pending steps, last step first so `pop` yields the next one.
    steps: ArrayVec<PixelPoint, MAX_LERP_STEPS>,
}

impl CameraInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the path from the current position to `target`.
    ///
    /// Steps still pending from an earlier target are dropped. The first
    /// target ever seen, or one equal to the current position, yields a
    /// single step. Returns the number of steps queued.
    pub fn retarget(&mut self, target: PixelPoint) -> usize {
        self.steps.clear();

        let from = match self.current {
            Some(from) if from != target => from,
            _ => {
                self.current = Some(target);
                self.steps.push(target);
                return 1;
            }
        };

        let n = step_count(target.y - from.y);
        for i in (1..=n as i64).rev() {
            self.steps.push(PixelPoint::new(
                lerp_floor(from.x, target.x, i, n as i64),
                lerp_floor(from.y, target.y, i, n as i64),
            ));
        }
        self.current = Some(target);
        n
    }

    /// Next camera position to present, if any.
    pub fn next_step(&mut self) -> Option<PixelPoint> {
        self.steps.pop()
    }

    pub fn pending_steps(&self) -> usize {
        self.steps.len()
    }

    /// Position the camera is heading to (the last target).
    pub fn current(&self) -> Option<PixelPoint> {
        self.current
    }

    /// Forget the camera position and any pending steps.
    pub fn reset(&mut self) {
        self.current = None;
        self.steps.clear();
    }
}

#[inline]
fn lerp_floor(from: i32, to: i32, i: i64, n: i64) -> i32 {
    let delta = (to as i64 - from as i64) * i;
    (from as i64 + delta.div_euclid(n)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_bounds() {
        assert_eq!(step_count(0), 12);
        assert_eq!(step_count(44), 12);
        assert_eq!(step_count(45), 11);
        assert_eq!(step_count(-90), 10);
        assert_eq!(step_count(320), 5);
        assert_eq!(step_count(10_000), 5);
    }

    #[test]
    fn first_target_is_a_single_step() {
        let mut lerp = CameraInterpolator::new();
        assert_eq!(lerp.retarget(PixelPoint::new(100, 100)), 1);
        assert_eq!(lerp.next_step(), Some(PixelPoint::new(100, 100)));
        assert_eq!(lerp.next_step(), None);
    }

    #[test]
    fn identical_target_is_a_single_step() {
        let mut lerp = CameraInterpolator::new();
        lerp.retarget(PixelPoint::new(5, 5));
        lerp.next_step();
        assert_eq!(lerp.retarget(PixelPoint::new(5, 5)), 1);
        assert_eq!(lerp.next_step(), Some(PixelPoint::new(5, 5)));
    }

    #[test]
    fn steps_are_monotonic_and_end_on_target() {
        let mut lerp = CameraInterpolator::new();
        lerp.retarget(PixelPoint::new(0, 0));
        lerp.next_step();

        let target = PixelPoint::new(-33, 320);
        assert_eq!(lerp.retarget(target), 5);

        let mut seen = Vec::new();
        while let Some(p) = lerp.next_step() {
            seen.push(p);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], PixelPoint::new(-7, 64));
        assert_eq!(*seen.last().unwrap(), target);
        assert!(seen.windows(2).all(|w| w[0].y < w[1].y && w[0].x >= w[1].x));
        assert_eq!(lerp.current(), Some(target));
    }

    #[test]
    fn retarget_drops_stale_steps() {
        let mut lerp = CameraInterpolator::new();
        lerp.retarget(PixelPoint::new(0, 0));
        lerp.retarget(PixelPoint::new(0, 10));
        assert_eq!(lerp.pending_steps(), 12);
        lerp.retarget(PixelPoint::new(0, 20));
        assert_eq!(lerp.pending_steps(), 12);
        let last = std::iter::from_fn(|| lerp.next_step()).last();
        assert_eq!(last, Some(PixelPoint::new(0, 20)));
    }

    #[test]
    fn natural_target_centres_view() {
        let frame = Frame {
            seq: 0,
            view_x: 10,
            view_y: 20,
            view_width: 40,
            view_height: 30,
            deltas: Vec::new(),
            creatures: Vec::new(),
            full_redraw: false,
            game_ticks: None,
        };
        let t = natural_target(&frame, 320, 240, 8);
        assert_eq!(t, PixelPoint::new(30 * 8 - 160, 35 * 8 - 120));
    }

    #[test]
    fn buffer_offset_clamps_into_buffer() {
        let window = RenderWindow {
            start_x: 10,
            start_y: 10,
            width: 12,
            height: 9,
        };
        // Buffer is 96x72 at 8px, surface 80x56: 16 px of slack each way.
        assert_eq!(buffer_offset(PixelPoint::new(88, 84), &window, 8, 80, 56), (8, 4));
        assert_eq!(buffer_offset(PixelPoint::new(0, 0), &window, 8, 80, 56), (0, 0));
        assert_eq!(buffer_offset(PixelPoint::new(500, 500), &window, 8, 80, 56), (16, 16));
    }
}
