// Copyright (c) 2026 rezky_nightky

use crate::entropy::RandomSource;
use crate::runtime::{Tuning, OVERSHOOT_ROWS};

/// One column's falling head. `head` is a fractional row and goes negative
/// while the head waits above the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Column {
    pub head: f32,
    pub speed: f32,
}

impl Column {
    /// Staggered start: the head begins up to a full grid height above row 0.
    pub fn spawn(rows: u16, tuning: &Tuning, rng: &mut impl RandomSource) -> Self {
        let head = -((rng.unit() * rows as f32).floor());
        Self {
            head,
            speed: draw_speed(tuning, rng),
        }
    }

    /// Advances the head by one frame. Returns `true` when the head ran past
    /// the bottom slack and the column was recycled.
    pub fn advance(&mut self, rows: u16, tuning: &Tuning, rng: &mut impl RandomSource) -> bool {
        self.head += self.speed;
        if self.head < rows as f32 + OVERSHOOT_ROWS {
            return false;
        }
        self.head = -(1.0 - rng.unit()) * rows as f32 * 0.5;
        self.speed = draw_speed(tuning, rng);
        true
    }

    /// Row currently under the head, if it is on the grid.
    pub fn head_row(&self, rows: u16) -> Option<u16> {
        let r = self.head.floor();
        if r < 0.0 || r >= rows as f32 {
            return None;
        }
        Some(r as u16)
    }
}

fn draw_speed(tuning: &Tuning, rng: &mut impl RandomSource) -> f32 {
    let s = tuning.min_speed + rng.unit() * (tuning.max_speed - tuning.min_speed);
    s.clamp(tuning.min_speed, tuning.max_speed)
}
