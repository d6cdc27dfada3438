// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use crate::cell::{Cell, Transition, Visit};
use crate::column::Column;
use crate::entropy::RandomSource;
use crate::mask::{build_mask, Mask};
use crate::runtime::{Tuning, DIM_FACTOR};
use crate::wave::WaveFront;

/// Visual state of one cell as the painter should show it after a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellUpdate {
    pub row: u16,
    pub col: u16,
    pub glyph: char,
    /// Rendered intensity in `[0, 1]`, dimming already applied.
    pub intensity: f32,
    pub locked: bool,
    /// Set only on the frame the cell locked.
    pub just_locked: bool,
    pub dimmed: bool,
}

#[derive(Clone, Debug)]
pub struct FrameDelta {
    pub elapsed: Duration,
    pub wave: WaveFront,
    /// `updates` covers every cell, not only the changed ones.
    pub full: bool,
    pub updates: Vec<CellUpdate>,
    pub newly_locked: usize,
    pub locked_total: usize,
}

/// Fixed-size arena of cells (row-major) plus one falling column per grid
/// column. Dimensions never change; a resize builds a new grid.
pub struct Grid {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
    columns: Vec<Column>,
    mask: Mask,
    alphabet: Vec<char>,
    tuning: Tuning,
    dimmed: bool,
    snapshot_pending: bool,
    locked_total: usize,
}

impl Grid {
    pub fn build(
        cols: u16,
        rows: u16,
        text: &str,
        alphabet: &[char],
        tuning: Tuning,
        rng: &mut impl RandomSource,
    ) -> Self {
        let mask = build_mask(cols, rows, text);
        Self::with_mask(mask, alphabet, tuning, rng)
    }

    pub fn with_mask(
        mask: Mask,
        alphabet: &[char],
        tuning: Tuning,
        rng: &mut impl RandomSource,
    ) -> Self {
        let cols = mask.cols();
        let rows = mask.rows();
        let alphabet = if alphabet.is_empty() {
            vec!['0', '1']
        } else {
            alphabet.to_vec()
        };

        let cells = (0..cols as usize * rows as usize)
            .map(|_| Cell::new(alphabet[rng.index(alphabet.len())]))
            .collect();
        let columns = (0..cols)
            .map(|_| Column::spawn(rows, &tuning, rng))
            .collect();

        Self {
            cols,
            rows,
            cells,
            columns,
            mask,
            alphabet,
            tuning,
            dimmed: false,
            snapshot_pending: true,
            locked_total: 0,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[allow(dead_code)]
    pub fn cell(&self, row: u16, col: u16) -> &Cell {
        &self.cells[row as usize * self.cols as usize + col as usize]
    }

    pub fn locked_count(&self) -> usize {
        self.locked_total
    }

    /// Next step reports every cell, e.g. after the painter lost its state.
    pub fn request_snapshot(&mut self) {
        self.snapshot_pending = true;
    }

    /// Runs one frame at `elapsed`. The wave front is computed once and
    /// shared by every column.
    pub fn step(&mut self, elapsed: Duration, rng: &mut impl RandomSource) -> FrameDelta {
        let wave = WaveFront::at(elapsed, self.cols, &self.tuning);
        let dim_flip = wave.dim_others != self.dimmed;
        self.dimmed = wave.dim_others;
        let full = std::mem::take(&mut self.snapshot_pending);

        let Self {
            cols,
            rows,
            cells,
            columns,
            mask,
            alphabet,
            tuning,
            ..
        } = self;
        let (cols, rows) = (*cols, *rows);

        let mut updates = Vec::new();
        let mut newly_locked = 0;

        for (c, column) in columns.iter_mut().enumerate() {
            let c = c as u16;
            column.advance(rows, tuning, rng);

            let head = column.head_row(rows).and_then(|r| {
                if cells[r as usize * cols as usize + c as usize].is_locked() {
                    return None;
                }
                let glyph = alphabet[rng.index(alphabet.len())];
                let capture = wave.eligible(c) && mask.is_active(r, c);
                Some((r, Visit::Head { glyph, capture }))
            });

            for r in 0..rows {
                let cell = &mut cells[r as usize * cols as usize + c as usize];
                let visit = match head {
                    Some((hr, v)) if hr == r => v,
                    _ => Visit::Trail,
                };
                let transition = cell.apply(visit, tuning);
                let just_locked = transition == Transition::Locked;
                if just_locked {
                    newly_locked += 1;
                }

                let changed =
                    full || transition != Transition::Unchanged || (dim_flip && !cell.is_locked());
                if changed {
                    updates.push(report(r, c, cell, just_locked, wave.dim_others));
                }
            }
        }

        self.locked_total += newly_locked;
        if dim_flip && wave.dim_others {
            tracing::info!(
                elapsed_ms = elapsed.as_millis() as u64,
                locked = self.locked_total,
                "wave complete; dimming background"
            );
        }

        FrameDelta {
            elapsed,
            wave,
            full,
            updates,
            newly_locked,
            locked_total: self.locked_total,
        }
    }
}

fn report(row: u16, col: u16, cell: &Cell, just_locked: bool, dim_others: bool) -> CellUpdate {
    let locked = cell.is_locked();
    let dimmed = dim_others && !locked;
    CellUpdate {
        row,
        col,
        glyph: cell.glyph,
        intensity: if dimmed {
            cell.intensity * DIM_FACTOR
        } else {
            cell.intensity
        },
        locked,
        just_locked,
        dimmed,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::entropy::testing::ScriptedSource;
    use crate::entropy::SeededSource;

    const ALPHABET: [char; 4] = ['a', 'b', 'c', 'd'];

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn block_mask(cols: u16, rows: u16, c0: u16, c1: u16, r0: u16, r1: u16) -> Mask {
        let mut active = vec![false; cols as usize * rows as usize];
        for r in r0..r1 {
            for c in c0..c1 {
                active[r as usize * cols as usize + c as usize] = true;
            }
        }
        Mask::from_active(cols, rows, active)
    }

    #[test]
    fn first_step_is_a_full_snapshot_then_deltas() {
        let mut rng = SeededSource::from_seed(1);
        let mut grid = Grid::build(80, 40, "RATIONAL X", &ALPHABET, Tuning::default(), &mut rng);

        let d = grid.step(ms(0), &mut rng);
        assert!(d.full);
        assert_eq!(d.updates.len(), 80 * 40);

        let d = grid.step(ms(16), &mut rng);
        assert!(!d.full);
        assert!(d.updates.len() < 80 * 40);

        grid.request_snapshot();
        let d = grid.step(ms(32), &mut rng);
        assert!(d.full);
        assert_eq!(d.updates.len(), 80 * 40);
    }

    #[test]
    fn heads_on_the_wave_lock_active_cells() {
        let mut rng = ScriptedSource::constant(0.5);
        let mask = Mask::from_active(80, 40, vec![true; 80 * 40]);
        let mut grid = Grid::with_mask(mask, &ALPHABET, Tuning::default(), &mut rng);
        for col in &mut grid.columns {
            col.head = 19.0;
            col.speed = 1.0;
        }

        let d = grid.step(ms(100), &mut rng);
        assert_eq!(d.newly_locked, 80);
        assert_eq!(grid.locked_count(), 80);
        for c in 0..80 {
            let cell = grid.cell(20, c);
            assert!(cell.is_locked());
            assert_eq!(cell.glyph, 'c');
            assert_eq!(cell.intensity, 1.0);
        }
        let just: Vec<_> = d.updates.iter().filter(|u| u.just_locked).collect();
        assert_eq!(just.len(), 80);
        assert!(just.iter().all(|u| u.row == 20 && u.locked && !u.dimmed));

        let d = grid.step(ms(116), &mut rng);
        assert_eq!(d.newly_locked, 80);
        assert!(d.updates.iter().filter(|u| u.just_locked).all(|u| u.row == 21));
    }

    #[test]
    fn heads_before_freeze_start_only_ignite() {
        let mut rng = ScriptedSource::constant(0.5);
        let mask = Mask::from_active(80, 40, vec![true; 80 * 40]);
        let tuning = Tuning::default();
        let mut grid = Grid::with_mask(mask, &ALPHABET, tuning, &mut rng);
        for col in &mut grid.columns {
            col.head = 9.0;
            col.speed = 1.0;
        }

        let d = grid.step(ms(20), &mut rng);
        assert_eq!(d.newly_locked, 0);
        for c in 0..80 {
            let cell = grid.cell(10, c);
            assert!(!cell.is_locked());
            assert_eq!(cell.intensity, tuning.head_intensity);
        }
    }

    #[test]
    fn block_scenario_locks_exactly_the_cells_heads_crossed_on_the_wave() {
        let tuning = Tuning::default();
        let mut rng = SeededSource::from_seed(2024);
        let mask = block_mask(120, 60, 50, 70, 27, 33);
        let mut grid = Grid::with_mask(mask, &ALPHABET, tuning, &mut rng);

        let mut captured: HashSet<(u16, u16)> = HashSet::new();
        for e in (0..=100).step_by(10) {
            let d = grid.step(ms(e), &mut rng);
            if e < 40 {
                assert_eq!(d.newly_locked, 0);
            }
            if e == 20 {
                assert_eq!(grid.locked_count(), 0);
            }
            for (c, col) in grid.columns().iter().enumerate() {
                let c = c as u16;
                if let Some(r) = col.head_row(60) {
                    if d.wave.eligible(c) && grid.mask().is_active(r, c) {
                        captured.insert((r, c));
                    }
                }
            }
        }

        for &(r, c) in &captured {
            assert!(grid.cell(r, c).is_locked(), "({r},{c}) crossed but not locked");
        }
        let mut locked = 0;
        for r in 0..60 {
            for c in 0..120 {
                if grid.cell(r, c).is_locked() {
                    locked += 1;
                    assert!(captured.contains(&(r, c)));
                }
            }
        }
        assert_eq!(locked, captured.len());
        assert_eq!(grid.locked_count(), locked);
    }

    #[test]
    fn locked_cells_never_change_again() {
        let mut rng = SeededSource::from_seed(5);
        let mut grid = Grid::build(80, 40, "RATIONAL X", &ALPHABET, Tuning::default(), &mut rng);

        let mut frozen: HashMap<(u16, u16), (char, u32)> = HashMap::new();
        for f in 0..400u64 {
            let d = grid.step(ms(f * 16), &mut rng);
            for u in &d.updates {
                if let Some(&(g, i)) = frozen.get(&(u.row, u.col)) {
                    assert_eq!((u.glyph, u.intensity.to_bits()), (g, i));
                    assert!(!u.just_locked);
                }
            }
            for r in 0..40 {
                for c in 0..80 {
                    let cell = grid.cell(r, c);
                    let key = (r, c);
                    if cell.is_locked() {
                        let entry = frozen
                            .entry(key)
                            .or_insert((cell.glyph, cell.intensity.to_bits()));
                        assert_eq!(*entry, (cell.glyph, cell.intensity.to_bits()));
                    }
                }
            }
        }
        assert!(!frozen.is_empty());
        assert!(frozen.keys().all(|&(r, c)| grid.mask().is_active(r, c)));
    }

    #[test]
    fn dim_phase_reports_every_unlocked_cell_once_at_reduced_intensity() {
        let mut rng = SeededSource::from_seed(9);
        let mut grid = Grid::build(80, 40, "RATIONAL X", &ALPHABET, Tuning::default(), &mut rng);
        let _ = grid.step(ms(0), &mut rng);
        let _ = grid.step(ms(50), &mut rng);

        let d = grid.step(ms(100), &mut rng);
        assert!(d.wave.dim_others);
        let unlocked = 80 * 40 - grid.locked_count();
        let dimmed: Vec<_> = d.updates.iter().filter(|u| u.dimmed).collect();
        assert_eq!(dimmed.len(), unlocked);
        for u in dimmed {
            let cell = grid.cell(u.row, u.col);
            assert!((u.intensity - cell.intensity * DIM_FACTOR).abs() < 1e-6);
        }
        assert!(d.updates.iter().filter(|u| u.locked).all(|u| !u.dimmed));

        let d = grid.step(ms(116), &mut rng);
        assert!(d.updates.len() < unlocked);
    }

    #[test]
    fn degenerate_mask_keeps_raining_without_locking() {
        let mut rng = SeededSource::from_seed(77);
        let mut grid = Grid::build(80, 40, "", &ALPHABET, Tuning::default(), &mut rng);
        let mut lit = 0;
        for f in 0..300u64 {
            let d = grid.step(ms(f * 16), &mut rng);
            assert_eq!(d.newly_locked, 0);
            lit += d.updates.iter().filter(|u| u.intensity > 0.0).count();
        }
        assert_eq!(grid.locked_count(), 0);
        assert!(lit > 0);
    }

    #[test]
    fn empty_alphabet_falls_back_to_binary() {
        let mut rng = SeededSource::from_seed(1);
        let grid = Grid::build(80, 40, "X", &[], Tuning::default(), &mut rng);
        assert!(matches!(grid.cell(0, 0).glyph, '0' | '1'));
    }
}
