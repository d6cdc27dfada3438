// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    White,
    Green,
    Cyan,
    Gold,
    Purple,
    Fire,
}

pub const MIN_GRID_COLS: u16 = 80;
pub const MIN_GRID_ROWS: u16 = 40;

/// Rows a head may run past the bottom edge before its column recycles.
pub const OVERSHOOT_ROWS: f32 = 5.0;

/// Rendered intensity multiplier for unlocked cells once the wave is complete.
pub const DIM_FACTOR: f32 = 0.7;

pub const LOCK_INTENSITY: f32 = 1.0;

pub const LOCK_ACCENT: Duration = Duration::from_millis(340);

pub const DEFAULT_TEXT: &str = "RATIONAL X";

/// Simulation constants, fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub freeze_start: Duration,
    pub full_lock: Duration,
    pub trail_decay: f32,
    pub head_intensity: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            freeze_start: Duration::from_millis(40),
            full_lock: Duration::from_millis(100),
            trail_decay: 0.5,
            head_intensity: 0.9,
            min_speed: 3.5,
            max_speed: 9.0,
        }
    }
}

/// Grid dimensions for a viewport measured in cells, never below the
/// minimum density.
pub fn grid_size_for_viewport(view_cols: u16, view_rows: u16) -> (u16, u16) {
    (view_cols.max(MIN_GRID_COLS), view_rows.max(MIN_GRID_ROWS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_viewports_clamp_to_minimum_grid() {
        assert_eq!(grid_size_for_viewport(20, 10), (80, 40));
        assert_eq!(grid_size_for_viewport(0, 0), (80, 40));
        assert_eq!(grid_size_for_viewport(200, 30), (200, 40));
        assert_eq!(grid_size_for_viewport(120, 60), (120, 60));
    }
}
