// Copyright (c) 2026 rezky_nightky

//! Drives one grid step per display frame.
//!
//! The recurring frame callback is an explicit [`RepeatingTask`] owned by
//! the [`Scheduler`]. Each due frame hands out a [`FrameTicket`] stamped with
//! the grid generation it was issued for; a resize or restart bumps the
//! generation, so a ticket that outlives its grid is rejected instead of
//! writing into the replacement.

use std::time::{Duration, Instant};

use crate::entropy::RandomSource;
use crate::grid::{FrameDelta, Grid};
use crate::runtime::{grid_size_for_viewport, Tuning};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

pub struct RepeatingTask {
    period: Duration,
    next_due: Instant,
    cancelled: bool,
}

impl RepeatingTask {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_due: start,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Fires at most once per period. A late frame resyncs to `now` rather
    /// than bursting to catch up.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.cancelled || now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        true
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.cancelled {
            return None;
        }
        Some(self.next_due.saturating_duration_since(now))
    }
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub text: String,
    pub alphabet: Vec<char>,
    pub tuning: Tuning,
}

struct Session {
    grid: Grid,
    generation: u64,
}

pub struct Scheduler<R: RandomSource> {
    settings: SessionSettings,
    rng: R,
    task: RepeatingTask,
    session: Option<Session>,
    generation: u64,
    view: (u16, u16),
    epoch: Instant,
    paused_at: Option<Instant>,
}

impl<R: RandomSource> Scheduler<R> {
    pub fn start(
        settings: SessionSettings,
        rng: R,
        period: Duration,
        view_cols: u16,
        view_rows: u16,
        now: Instant,
    ) -> Self {
        let mut s = Self {
            settings,
            rng,
            task: RepeatingTask::new(period, now),
            session: None,
            generation: 0,
            view: (view_cols, view_rows),
            epoch: now,
            paused_at: None,
        };
        s.rebuild(view_cols, view_rows);
        s
    }

    /// Replaces grid, mask and all column/cell state for a new viewport.
    /// The session clock keeps running.
    pub fn rebuild(&mut self, view_cols: u16, view_rows: u16) {
        if self.task.is_cancelled() {
            return;
        }
        self.view = (view_cols, view_rows);
        let (cols, rows) = grid_size_for_viewport(view_cols, view_rows);
        self.generation += 1;
        let grid = Grid::build(
            cols,
            rows,
            &self.settings.text,
            &self.settings.alphabet,
            self.settings.tuning,
            &mut self.rng,
        );
        tracing::info!(
            generation = self.generation,
            cols,
            rows,
            view_cols,
            view_rows,
            active = grid.mask().active_count(),
            bbox_left = grid.mask().bbox().left,
            bbox_right = grid.mask().bbox().right,
            "built session grid"
        );
        self.session = Some(Session {
            grid,
            generation: self.generation,
        });
    }

    /// Fresh grid and a fresh clock; the wave replays from the start.
    pub fn restart(&mut self, now: Instant) {
        let (w, h) = self.view;
        self.rebuild(w, h);
        self.epoch = now;
        if self.paused_at.is_some() {
            self.paused_at = Some(now);
        }
    }

    pub fn teardown(&mut self) {
        self.task.cancel();
        self.session = None;
        tracing::info!(generation = self.generation, "scheduler torn down");
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_cancelled()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        match self.paused_at.take() {
            Some(at) => {
                let paused = now.saturating_duration_since(at);
                self.epoch += paused;
                tracing::debug!(paused_ms = paused.as_millis() as u64, "resumed");
            }
            None => {
                self.paused_at = Some(now);
                tracing::debug!("paused");
            }
        }
    }

    /// Session time with paused spans removed.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let until = self.paused_at.unwrap_or(now);
        until.saturating_duration_since(self.epoch)
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.session.as_ref().map(|s| &s.grid)
    }

    /// Has the next frame repaint every cell of the current grid.
    pub fn request_snapshot(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.grid.request_snapshot();
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.task.time_until_due(now)
    }

    /// Issues a ticket when a frame is due for the current grid.
    pub fn poll(&mut self, now: Instant) -> Option<FrameTicket> {
        if self.paused_at.is_some() || self.session.is_none() {
            return None;
        }
        if !self.task.poll(now) {
            return None;
        }
        Some(FrameTicket {
            generation: self.generation,
        })
    }

    /// Runs the frame a ticket was issued for. Tickets from a torn-down or
    /// replaced grid are dropped without touching any state.
    pub fn run(&mut self, ticket: FrameTicket, now: Instant) -> Option<FrameDelta> {
        if self.task.is_cancelled() {
            return None;
        }
        let elapsed = self.elapsed(now);
        let session = self.session.as_mut()?;
        if session.generation != ticket.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = session.generation,
                "discarding frame for replaced grid"
            );
            return None;
        }
        Some(session.grid.step(elapsed, &mut self.rng))
    }

    pub fn tick(&mut self, now: Instant) -> Option<FrameDelta> {
        let ticket = self.poll(now)?;
        self.run(ticket, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::SeededSource;

    const FRAME: Duration = Duration::from_millis(16);

    fn settings() -> SessionSettings {
        SessionSettings {
            text: "RATIONAL X".to_string(),
            alphabet: vec!['0', '1'],
            tuning: Tuning::default(),
        }
    }

    fn scheduler(now: Instant) -> Scheduler<SeededSource> {
        Scheduler::start(settings(), SeededSource::from_seed(42), FRAME, 100, 30, now)
    }

    #[test]
    fn task_fires_once_per_period_and_resyncs_when_late() {
        let t0 = Instant::now();
        let mut task = RepeatingTask::new(FRAME, t0);
        assert!(task.poll(t0));
        assert!(!task.poll(t0 + Duration::from_millis(5)));
        assert_eq!(
            task.time_until_due(t0 + Duration::from_millis(5)),
            Some(Duration::from_millis(11))
        );
        assert!(task.poll(t0 + FRAME));

        let late = t0 + Duration::from_millis(200);
        assert!(task.poll(late));
        assert!(!task.poll(late));
        assert!(task.poll(late + FRAME));

        task.cancel();
        assert!(!task.poll(late + FRAME * 10));
        assert_eq!(task.time_until_due(late), None);
    }

    #[test]
    fn grid_is_sized_from_viewport_with_minimums() {
        let s = scheduler(Instant::now());
        let g = s.grid().unwrap();
        assert_eq!((g.cols(), g.rows()), (100, 40));
    }

    #[test]
    fn nothing_locks_in_the_head_start() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let mut t = t0;
        while t <= t0 + Duration::from_millis(20) {
            if let Some(d) = s.tick(t) {
                assert_eq!(d.newly_locked, 0);
            }
            t += Duration::from_millis(4);
        }
        assert_eq!(s.grid().unwrap().locked_count(), 0);
    }

    #[test]
    fn ticket_for_a_replaced_grid_is_discarded() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let ticket = s.poll(t0).unwrap();

        s.rebuild(120, 60);
        assert_eq!(s.generation(), 2);
        assert!(s.run(ticket, t0).is_none());

        // The replacement grid is untouched: its first frame is still a full snapshot.
        let d = s.tick(t0 + FRAME).unwrap();
        assert!(d.full);
        assert_eq!(d.updates.len(), 120 * 60);
    }

    #[test]
    fn teardown_stops_all_further_frames() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let ticket = s.poll(t0).unwrap();
        s.teardown();

        assert!(!s.is_running());
        assert!(s.grid().is_none());
        assert!(s.run(ticket, t0).is_none());
        assert!(s.tick(t0 + FRAME * 3).is_none());
        assert_eq!(s.time_until_due(t0), None);

        s.rebuild(80, 40);
        assert!(s.grid().is_none());
        s.request_snapshot();
    }

    #[test]
    fn snapshot_request_repaints_the_whole_grid() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        assert!(s.tick(t0).unwrap().full);
        assert!(!s.tick(t0 + FRAME).unwrap().full);

        s.request_snapshot();
        let d = s.tick(t0 + FRAME * 2).unwrap();
        assert!(d.full);
        assert_eq!(d.updates.len(), 100 * 40);
    }

    #[test]
    fn paused_time_is_excluded_from_elapsed() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let at = t0 + Duration::from_millis(30);
        s.toggle_pause(at);
        assert!(s.is_paused());
        assert!(s.poll(at + FRAME).is_none());
        assert_eq!(s.elapsed(at + Duration::from_secs(5)), Duration::from_millis(30));

        s.toggle_pause(at + Duration::from_secs(5));
        assert!(!s.is_paused());
        assert_eq!(
            s.elapsed(at + Duration::from_secs(5) + Duration::from_millis(10)),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn rebuild_keeps_the_clock_but_restart_resets_it() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let later = t0 + Duration::from_millis(500);

        s.rebuild(90, 45);
        assert_eq!(s.elapsed(later), Duration::from_millis(500));

        s.restart(later);
        assert_eq!(s.elapsed(later), Duration::ZERO);
        let g = s.grid().unwrap();
        assert_eq!((g.cols(), g.rows()), (90, 45));
        assert_eq!(g.locked_count(), 0);
    }
}
