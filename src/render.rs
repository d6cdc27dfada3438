// Copyright (c) 2026 rezky_nightky

//! Turns grid deltas into terminal paint.
//!
//! The grid is at least as large as the viewport and is cropped around its
//! center. Freshly locked cells flash in the accent color for a short while
//! before settling on the shape color.

use std::time::Duration;

use crate::frame::{Frame, Paint};
use crate::grid::{CellUpdate, FrameDelta};
use crate::palette::Palette;
use crate::runtime::LOCK_ACCENT;

const BOLD_ABOVE: f32 = 0.6;

struct Accent {
    x: u16,
    y: u16,
    glyph: char,
    until: Duration,
}

pub struct Renderer {
    palette: Palette,
    backdrop: bool,
    offset_x: u16,
    offset_y: u16,
    accents: Vec<Accent>,
}

impl Renderer {
    pub fn new(palette: Palette, backdrop: bool) -> Self {
        Self {
            palette,
            backdrop,
            offset_x: 0,
            offset_y: 0,
            accents: Vec::new(),
        }
    }

    pub fn bg(&self) -> Option<crossterm::style::Color> {
        self.palette.bg
    }

    /// Re-anchors the crop after the grid or viewport changed.
    pub fn fit(&mut self, grid_cols: u16, grid_rows: u16, view_cols: u16, view_rows: u16) {
        self.offset_x = grid_cols.saturating_sub(view_cols) / 2;
        self.offset_y = grid_rows.saturating_sub(view_rows) / 2;
        self.accents.clear();
    }

    fn to_view(&self, frame: &Frame, row: u16, col: u16) -> Option<(u16, u16)> {
        let x = col.checked_sub(self.offset_x)?;
        let y = row.checked_sub(self.offset_y)?;
        frame.index(x, y).map(|_| (x, y))
    }

    pub fn paint_for(&self, u: &CellUpdate) -> Paint {
        let bg = self.palette.bg;
        if u.locked {
            let fg = if u.just_locked {
                self.palette.accent
            } else {
                self.palette.shape
            };
            return Paint {
                ch: u.glyph,
                fg,
                bg,
                bold: true,
            };
        }

        if u.intensity <= 0.0 {
            if !self.backdrop {
                return Paint::blank(bg);
            }
            let fg = if u.dimmed {
                self.palette.dim_color(0.0)
            } else {
                self.palette.backdrop_color()
            };
            return Paint {
                ch: u.glyph,
                fg,
                bg,
                bold: false,
            };
        }

        if u.dimmed {
            return Paint {
                ch: u.glyph,
                fg: self.palette.dim_color(u.intensity),
                bg,
                bold: false,
            };
        }

        Paint {
            ch: u.glyph,
            fg: self.palette.rain_color(u.intensity),
            bg,
            bold: u.intensity > BOLD_ABOVE,
        }
    }

    pub fn apply(&mut self, delta: &FrameDelta, frame: &mut Frame) {
        if delta.full {
            frame.mark_all_dirty();
        }

        for u in &delta.updates {
            let Some((x, y)) = self.to_view(frame, u.row, u.col) else {
                continue;
            };
            frame.set(x, y, self.paint_for(u));
            if u.just_locked {
                self.accents.push(Accent {
                    x,
                    y,
                    glyph: u.glyph,
                    until: delta.elapsed + LOCK_ACCENT,
                });
            }
        }

        let now = delta.elapsed;
        let shape = Paint {
            ch: ' ',
            fg: self.palette.shape,
            bg: self.palette.bg,
            bold: true,
        };
        self.accents.retain(|a| {
            if a.until > now {
                return true;
            }
            frame.set(a.x, a.y, Paint { ch: a.glyph, ..shape });
            false
        });
    }
}
