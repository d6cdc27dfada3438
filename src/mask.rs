// Copyright (c) 2026 rezky_nightky

//! Rasterizes the logotype into a per-cell activation grid.
//!
//! The text is drawn with the 8x8 legacy bitmap font, scaled so it spans a
//! fixed fraction of the grid width, into an alpha buffer at `CELL_PX` pixels
//! per cell. Each cell then votes on a stride-2 subgrid of its pixels; a
//! coverage vote keeps anti-aliased edges from producing ragged outlines.

use font8x8::legacy::BASIC_LEGACY;

pub const CELL_PX: usize = 16;

const SAMPLE_STRIDE: usize = 2;
const ALPHA_CUTOFF: u8 = 8;
const COVERAGE_VOTES: usize = 28;
const TEXT_WIDTH_FRACTION: f32 = 0.78;
const INITIAL_FONT_FRACTION: f32 = 0.2;
const CAP_OFFSET_FRACTION: f32 = 0.65;

const GLYPH_UNITS: usize = 8;
// Legacy glyphs sit on a baseline between bitmap rows 6 and 7.
const BASELINE_UNITS: f32 = 7.0;
const SUPERSAMPLE: usize = 2;

/// Horizontal extent of the rendered text in column units, `right` exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bbox {
    pub left: i32,
    pub right: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    cols: u16,
    rows: u16,
    active: Vec<bool>,
    bbox: Bbox,
}

impl Mask {
    pub fn empty(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            active: vec![false; cols as usize * rows as usize],
            bbox: Bbox::default(),
        }
    }

    /// Wraps a precomputed row-major activation grid; the bbox spans the
    /// active columns.
    #[cfg(test)]
    pub fn from_active(cols: u16, rows: u16, active: Vec<bool>) -> Self {
        assert_eq!(active.len(), cols as usize * rows as usize);
        let mut left = i32::MAX;
        let mut right = i32::MIN;
        for (i, _) in active.iter().enumerate().filter(|(_, a)| **a) {
            let c = (i % cols as usize) as i32;
            left = left.min(c);
            right = right.max(c + 1);
        }
        let bbox = if left <= right {
            Bbox { left, right }
        } else {
            Bbox::default()
        };
        Self {
            cols,
            rows,
            active,
            bbox,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    pub fn is_active(&self, row: u16, col: u16) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.active[row as usize * self.cols as usize + col as usize]
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }
}

fn glyph_bits(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

fn measure(glyphs: &[[u8; 8]], font_px: f32) -> f32 {
    glyphs.len() as f32 * font_px
}

struct Layout {
    scale: f32,
    origin_x: f32,
    top: f32,
    text_w: f32,
    text_h: f32,
}

impl Layout {
    fn fit(glyphs: &[[u8; 8]], width: usize, height: usize) -> Option<Self> {
        let target = width as f32 * TEXT_WIDTH_FRACTION;
        let initial = (height as f32 * INITIAL_FONT_FRACTION).floor();
        let measured = measure(glyphs, initial);
        if measured <= 0.0 {
            return None;
        }
        let font_px = (initial * (target / measured)).floor();
        if font_px < 1.0 {
            return None;
        }

        let text_w = measure(glyphs, font_px);
        let text_h = font_px;
        let scale = font_px / GLYPH_UNITS as f32;
        let baseline = (height as f32 + text_h * CAP_OFFSET_FRACTION) / 2.0;
        Some(Self {
            scale,
            origin_x: (width as f32 - text_w) / 2.0,
            top: baseline - BASELINE_UNITS * scale,
            text_w,
            text_h,
        })
    }
}

/// Single-channel coverage buffer, one byte per pixel.
struct Coverage {
    width: usize,
    alpha: Vec<u8>,
}

impl Coverage {
    fn render(glyphs: &[[u8; 8]], layout: &Layout, width: usize, height: usize) -> Self {
        let mut alpha = vec![0u8; width * height];

        let x0 = layout.origin_x.floor().max(0.0) as usize;
        let x1 = ((layout.origin_x + layout.text_w).ceil().max(0.0) as usize).min(width);
        let y0 = layout.top.floor().max(0.0) as usize;
        let y1 = ((layout.top + layout.text_h).ceil().max(0.0) as usize).min(height);
        let span_units = glyphs.len() * GLYPH_UNITS;
        let samples = (SUPERSAMPLE * SUPERSAMPLE) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                let mut hits = 0u32;
                for sy in 0..SUPERSAMPLE {
                    let v = (py as f32 + (sy as f32 + 0.5) / SUPERSAMPLE as f32 - layout.top)
                        / layout.scale;
                    if v < 0.0 || v >= GLYPH_UNITS as f32 {
                        continue;
                    }
                    let gy = v as usize;
                    for sx in 0..SUPERSAMPLE {
                        let u = (px as f32 + (sx as f32 + 0.5) / SUPERSAMPLE as f32
                            - layout.origin_x)
                            / layout.scale;
                        if u < 0.0 || u >= span_units as f32 {
                            continue;
                        }
                        let u = u as usize;
                        let bits = glyphs[u / GLYPH_UNITS][gy];
                        if (bits >> (u % GLYPH_UNITS)) & 1 == 1 {
                            hits += 1;
                        }
                    }
                }
                alpha[py * width + px] = (hits * 255 / samples) as u8;
            }
        }

        Self { width, alpha }
    }

    fn votes(&self, col: usize, row: usize) -> usize {
        let x0 = col * CELL_PX;
        let y0 = row * CELL_PX;
        let mut count = 0;
        for yy in (0..CELL_PX).step_by(SAMPLE_STRIDE) {
            let line = (y0 + yy) * self.width;
            for xx in (0..CELL_PX).step_by(SAMPLE_STRIDE) {
                if self.alpha[line + x0 + xx] > ALPHA_CUTOFF {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Builds the activation mask for `text` on a `cols x rows` grid. Text that
/// cannot be laid out yields an all-inactive mask.
#[tracing::instrument(level = "debug", skip(text))]
pub fn build_mask(cols: u16, rows: u16, text: &str) -> Mask {
    let width = cols as usize * CELL_PX;
    let height = rows as usize * CELL_PX;
    let glyphs: Vec<[u8; 8]> = text.chars().map(glyph_bits).collect();

    let Some(layout) = Layout::fit(&glyphs, width, height) else {
        tracing::warn!(cols, rows, text, "logotype cannot be measured; mask is empty");
        return Mask::empty(cols, rows);
    };

    let coverage = Coverage::render(&glyphs, &layout, width, height);
    let mut active = vec![false; cols as usize * rows as usize];
    for r in 0..rows as usize {
        for c in 0..cols as usize {
            active[r * cols as usize + c] = coverage.votes(c, r) >= COVERAGE_VOTES;
        }
    }

    let bbox = Bbox {
        left: (layout.origin_x / CELL_PX as f32).floor() as i32,
        right: ((layout.origin_x + layout.text_w) / CELL_PX as f32).ceil() as i32,
    };
    let mask = Mask {
        cols,
        rows,
        active,
        bbox,
    };
    tracing::debug!(
        cols,
        rows,
        active = mask.active_count(),
        left = bbox.left,
        right = bbox.right,
        "built logotype mask"
    );
    mask
}
