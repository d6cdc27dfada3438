// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::{ColorMode, ColorScheme};

const RAMP_STEPS: usize = 16;

// Backdrop gray, blended over black at 50%..90% coverage.
const DIM_GRAY: (u8, u8, u8) = (156, 163, 175);
const DIM_LOW: f32 = 0.5;
const DIM_SPAN: f32 = 0.4;
// Untouched cells show at the same 60% the dim ramp reaches at a quarter.
const BACKDROP_LEVEL: f32 = 0.25;

#[derive(Clone, Debug)]
pub struct Palette {
    /// Head/trail ramp, darkest first.
    pub rain: Vec<Color>,
    /// Gray ramp for the receded background once the wave completes.
    pub dim: Vec<Color>,
    pub shape: Option<Color>,
    pub accent: Option<Color>,
    pub bg: Option<Color>,
}

impl Palette {
    pub fn rain_color(&self, intensity: f32) -> Option<Color> {
        ramp_pick(&self.rain, intensity)
    }

    pub fn dim_color(&self, intensity: f32) -> Option<Color> {
        ramp_pick(&self.dim, intensity)
    }

    pub fn backdrop_color(&self) -> Option<Color> {
        ramp_pick(&self.dim, BACKDROP_LEVEL)
    }
}

fn ramp_pick(ramp: &[Color], t: f32) -> Option<Color> {
    if ramp.is_empty() {
        return None;
    }
    let last = (ramp.len() - 1) as f32;
    let idx = (t.clamp(0.0, 1.0) * last).round() as usize;
    ramp.get(idx).copied()
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, level) = if avg < 8 {
        (16, 0)
    } else if avg > 238 {
        (231, 255)
    } else {
        let step = (avg - 8) / 10;
        (232 + step, 8 + 10 * step)
    };
    let gray_dist = dist2(r, g, b, level, level, level);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

fn convert(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn scale_rgb((r, g, b): (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    (lerp_u8(0, r, t), lerp_u8(0, g, t), lerp_u8(0, b, t))
}

fn gradient_from_stops(stops: &[(u8, u8, u8)], steps: usize) -> Vec<(u8, u8, u8)> {
    if steps == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        return vec![stops[0]; steps];
    }

    let segs = stops.len() - 1;
    (0..steps)
        .map(|i| {
            let pos = (i as f32) / ((steps - 1) as f32) * (segs as f32);
            let seg = (pos.floor() as usize).min(segs - 1);
            let lt = pos - (seg as f32);
            let (r0, g0, b0) = stops[seg];
            let (r1, g1, b1) = stops[seg + 1];
            (lerp_u8(r0, r1, lt), lerp_u8(g0, g1, lt), lerp_u8(b0, b1, lt))
        })
        .collect()
}

fn ramp(mode: ColorMode, stops: &[(u8, u8, u8)]) -> Vec<Color> {
    if mode == ColorMode::Mono {
        return Vec::new();
    }
    gradient_from_stops(stops, RAMP_STEPS)
        .into_iter()
        .filter_map(|rgb| convert(mode, rgb))
        .collect()
}

struct Theme {
    rain: &'static [(u8, u8, u8)],
    shape: (u8, u8, u8),
    accent: (u8, u8, u8),
}

fn theme(scheme: ColorScheme) -> Theme {
    match scheme {
        ColorScheme::White => Theme {
            rain: &[(28, 28, 28), (150, 150, 150), (255, 255, 255)],
            shape: (235, 235, 235),
            accent: (255, 255, 255),
        },
        ColorScheme::Green => Theme {
            rain: &[(0, 40, 0), (0, 160, 60), (180, 255, 190)],
            shape: (200, 255, 200),
            accent: (255, 255, 255),
        },
        ColorScheme::Cyan => Theme {
            rain: &[(0, 30, 40), (0, 140, 170), (160, 255, 255)],
            shape: (190, 250, 255),
            accent: (255, 255, 255),
        },
        ColorScheme::Gold => Theme {
            rain: &[(40, 25, 0), (200, 140, 0), (255, 230, 150)],
            shape: (255, 215, 90),
            accent: (255, 255, 220),
        },
        ColorScheme::Purple => Theme {
            rain: &[(20, 0, 40), (120, 60, 200), (225, 190, 255)],
            shape: (215, 170, 255),
            accent: (255, 255, 255),
        },
        ColorScheme::Fire => Theme {
            rain: &[(50, 0, 0), (200, 40, 0), (255, 160, 0), (255, 240, 180)],
            shape: (255, 200, 60),
            accent: (255, 255, 255),
        },
    }
}

pub fn build_palette(scheme: ColorScheme, mode: ColorMode, default_background: bool) -> Palette {
    let bg = if default_background {
        None
    } else {
        match mode {
            ColorMode::Color16 => Some(Color::Black),
            ColorMode::TrueColor => Some(Color::Rgb { r: 0, g: 0, b: 0 }),
            _ => Some(Color::AnsiValue(16)),
        }
    };

    let t = theme(scheme);
    let dim_stops = [
        scale_rgb(DIM_GRAY, DIM_LOW),
        scale_rgb(DIM_GRAY, DIM_LOW + DIM_SPAN),
    ];

    Palette {
        rain: ramp(mode, t.rain),
        dim: ramp(mode, &dim_stops),
        shape: convert(mode, t.shape),
        accent: convert(mode, t.accent),
        bg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_run_dark_to_bright() {
        let p = build_palette(ColorScheme::White, ColorMode::TrueColor, false);
        assert_eq!(p.rain.len(), RAMP_STEPS);
        assert_eq!(p.rain_color(0.0), Some(Color::Rgb { r: 28, g: 28, b: 28 }));
        assert_eq!(
            p.rain_color(1.0),
            Some(Color::Rgb {
                r: 255,
                g: 255,
                b: 255
            })
        );
        assert_eq!(p.dim_color(0.0), Some(Color::Rgb { r: 78, g: 82, b: 88 }));
        assert_eq!(
            p.dim_color(1.0),
            Some(Color::Rgb {
                r: 140,
                g: 147,
                b: 158
            })
        );
    }

    #[test]
    fn mono_leaves_foreground_to_the_terminal() {
        let p = build_palette(ColorScheme::Green, ColorMode::Mono, true);
        assert_eq!(p.rain_color(0.5), None);
        assert_eq!(p.backdrop_color(), None);
        assert_eq!(p.shape, None);
        assert_eq!(p.bg, None);
    }

    #[test]
    fn ansi256_maps_pure_tones() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
    }

    #[test]
    fn color16_picks_nearest_entry() {
        assert_eq!(rgb_to_color16(250, 250, 250), Color::White);
        assert_eq!(rgb_to_color16(0, 120, 0), Color::DarkGreen);
    }

    #[test]
    fn out_of_range_intensity_is_clamped() {
        let p = build_palette(ColorScheme::Fire, ColorMode::Color256, false);
        assert_eq!(p.rain_color(-3.0), p.rain_color(0.0));
        assert_eq!(p.rain_color(7.0), p.rain_color(1.0));
        assert_eq!(p.bg, Some(Color::AnsiValue(16)));
    }
}
