//! Floating damage numbers.
//!
//! Combat events arrive on the UI side channel tagged with the frame they
//! belong to. They are held back until the render loop reaches that frame,
//! then spawn a short-lived number that drifts away from the hit.

use crate::rng::SimpleRng;
use crate::types::{CombatEvent, PixelPoint, FLOATING_MAX_AGE};
use crate::window::RenderWindow;

/// Pixels travelled per unit of velocity on each advance.
const DRIFT_PER_ADVANCE: i32 = 5;

/// A damage number on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingEntity {
    pub world_x: i32,
    pub world_y: i32,
    pub age: u32,
    pub velocity_x: i32,
    pub velocity_y: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub value: i64,
}

impl FloatingEntity {
    /// Where to draw the number, relative to the window's top-left pixel.
    ///
    /// `None` when the hit lies outside the window or the drifted text would
    /// start past the window's right or bottom edge.
    pub fn surface_position(&self, window: &RenderWindow, sprite_size: u32) -> Option<PixelPoint> {
        let (col, row) = window.local(self.world_x, self.world_y)?;
        let s = sprite_size as i32;
        let (w, h) = window.size_px(sprite_size);
        let x = col as i32 * s + self.offset_x;
        let y = row as i32 * s + self.offset_y;
        if x >= w as i32 || y >= h as i32 {
            return None;
        }
        Some(PixelPoint::new(x, y))
    }
}

/// Font size used for damage numbers at a given sprite size.
pub fn font_px(sprite_size: u32) -> u32 {
    if sprite_size < 10 {
        10
    } else {
        20
    }
}

/// Drift speed for a given sprite size.
pub fn drift_magnitude(sprite_size: u32) -> i32 {
    let basis = if sprite_size > 10 { sprite_size } else { 5 };
    (7 * basis / 22) as i32
}

#[derive(Debug, Clone)]
pub struct FloatingDamage {
    pending: Vec<CombatEvent>,
    live: Vec<FloatingEntity>,
    rng: SimpleRng,
    magnitude: i32,
}

impl FloatingDamage {
    pub fn new(sprite_size: u32, seed: u32) -> Self {
        Self {
            pending: Vec::new(),
            live: Vec::new(),
            rng: SimpleRng::new(seed),
            magnitude: drift_magnitude(sprite_size),
        }
    }

    /// Hold combat events until their frame is reached.
    pub fn queue<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = CombatEvent>,
    {
        self.pending.extend(events);
    }

    /// Spawn entities for every held event with `frame <= seq`. Returns the
    /// number spawned.
    pub fn release_due(&mut self, seq: u64) -> usize {
        let before = self.live.len();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].frame <= seq {
                let event = self.pending.swap_remove(i);
                let (dx, dy) = self.rng.spread();
                self.live.push(FloatingEntity {
                    world_x: event.x,
                    world_y: event.y,
                    age: 0,
                    velocity_x: self.magnitude * dx,
                    velocity_y: self.magnitude * dy,
                    offset_x: 0,
                    offset_y: 0,
                    value: event.damage,
                });
            } else {
                i += 1;
            }
        }
        self.live.len() - before
    }

    /// Age and move every live entity by one render pass.
    ///
    /// Returns the entities to draw on this pass. Entities that have now been
    /// drawn `FLOATING_MAX_AGE` times are removed afterwards.
    pub fn advance(&mut self) -> Vec<FloatingEntity> {
        for entity in &mut self.live {
            entity.age += 1;
            entity.offset_x += entity.velocity_x * DRIFT_PER_ADVANCE;
            entity.offset_y += entity.velocity_y * DRIFT_PER_ADVANCE;
        }
        let drawn = self.live.clone();
        self.live.retain(|e| e.age < FLOATING_MAX_AGE);
        drawn
    }

    pub fn live(&self) -> &[FloatingEntity] {
        &self.live
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop held events and live entities.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.live.clear();
    }
}
