// Copyright (c) 2026 rezky_nightky

use crate::runtime::{Tuning, LOCK_INTENSITY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Falling,
    Locked,
}

/// What a column's head does to a cell this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visit {
    /// The head is elsewhere; the cell only fades.
    Trail,
    /// The head sits on this cell. `capture` is set when the column is
    /// inside the wave front and the cell belongs to the logotype.
    Head { glyph: char, capture: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Faded,
    Ignited,
    Locked,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub phase: Phase,
    pub glyph: char,
    pub intensity: f32,
}

impl Cell {
    pub fn new(glyph: char) -> Self {
        Self {
            phase: Phase::Falling,
            glyph,
            intensity: 0.0,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    /// Applies one frame to the cell: locked cells never change, everything
    /// else decays first and is then re-lit or captured by a head visit.
    pub fn apply(&mut self, visit: Visit, tuning: &Tuning) -> Transition {
        if self.is_locked() {
            return Transition::Unchanged;
        }

        let before = self.intensity;
        self.intensity = (self.intensity - tuning.trail_decay).max(0.0);

        match visit {
            Visit::Head {
                glyph,
                capture: true,
            } => {
                self.phase = Phase::Locked;
                self.glyph = glyph;
                self.intensity = LOCK_INTENSITY;
                Transition::Locked
            }
            Visit::Head { glyph, .. } => {
                self.glyph = glyph;
                self.intensity = tuning.head_intensity;
                Transition::Ignited
            }
            Visit::Trail if self.intensity != before => Transition::Faded,
            Visit::Trail => Transition::Unchanged,
        }
    }
}
