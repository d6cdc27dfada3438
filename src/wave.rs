// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use crate::runtime::Tuning;

/// The freeze front for one frame, derived from a single elapsed-time
/// snapshot. Columns within `reach` of the horizontal center may lock cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveFront {
    pub progress: f32,
    pub center: f32,
    pub reach: f32,
    pub started: bool,
    pub dim_others: bool,
}

impl WaveFront {
    pub fn at(elapsed: Duration, cols: u16, tuning: &Tuning) -> Self {
        let window = tuning
            .full_lock
            .saturating_sub(tuning.freeze_start)
            .max(Duration::from_millis(1));
        let since = elapsed.as_secs_f64() - tuning.freeze_start.as_secs_f64();
        let progress = (since / window.as_secs_f64()).clamp(0.0, 1.0) as f32;

        let last = cols.saturating_sub(1) as f32;
        let center = last / 2.0;
        let max_dist = center.max(last - center);

        Self {
            progress,
            center,
            reach: progress * max_dist,
            started: elapsed >= tuning.freeze_start,
            dim_others: elapsed >= tuning.full_lock,
        }
    }

    pub fn eligible(&self, col: u16) -> bool {
        self.started && (col as f32 - self.center).abs() <= self.reach
    }
}

#[allow(dead_code)]
pub fn eligible(col: u16, cols: u16, elapsed: Duration, tuning: &Tuning) -> bool {
    WaveFront::at(elapsed, cols, tuning).eligible(col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn nothing_is_eligible_before_freeze_start() {
        let t = Tuning::default();
        for cols in [80u16, 81, 120] {
            for e in [0, 10, 39] {
                let w = WaveFront::at(ms(e), cols, &t);
                assert_eq!(w.progress, 0.0);
                assert!((0..cols).all(|c| !w.eligible(c)));
                assert!(!w.dim_others);
            }
        }
    }

    #[test]
    fn front_opens_at_the_center_first() {
        let t = Tuning::default();
        let w = WaveFront::at(ms(40), 81, &t);
        assert!(w.eligible(40));
        assert!(!w.eligible(39));
        assert!(!w.eligible(41));

        let w = WaveFront::at(ms(70), 81, &t);
        assert!((w.progress - 0.5).abs() < 1e-6);
        assert!(w.eligible(20) && w.eligible(60));
        assert!(!w.eligible(19) && !w.eligible(61));
    }

    #[test]
    fn eligibility_is_mirror_symmetric() {
        let t = Tuning::default();
        for cols in [80u16, 81, 97, 120] {
            for e in (0..=120).step_by(5) {
                let w = WaveFront::at(ms(e), cols, &t);
                for c in 0..cols {
                    assert_eq!(w.eligible(c), w.eligible(cols - 1 - c), "cols={cols} e={e} c={c}");
                }
            }
        }
    }

    #[test]
    fn saturated_wave_never_recedes() {
        let t = Tuning::default();
        for e in [100u64, 101, 1_000, 3_600_000] {
            let w = WaveFront::at(ms(e), 120, &t);
            assert_eq!(w.progress, 1.0);
            assert!(w.dim_others);
            assert!((0..120).all(|c| w.eligible(c)));
        }
    }

    #[test]
    fn collapsed_window_does_not_divide_by_zero() {
        let t = Tuning {
            freeze_start: ms(50),
            full_lock: ms(50),
            ..Tuning::default()
        };
        let w = WaveFront::at(ms(50), 80, &t);
        assert!(w.progress.is_finite());
        assert!(w.dim_others);
        assert!(eligible(0, 80, ms(51), &t));
    }
}
