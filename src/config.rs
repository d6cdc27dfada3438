// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::charset::{build_chars, charset_from_str, literal_chars};
use crate::error::{GlyphfallError, Result};
use crate::runtime::{ColorMode, ColorScheme, Tuning, DEFAULT_TEXT};

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphfall --text \"RATIONAL X\" --charset auto --color white --color-bg black --fps 60 --freeze-start-ms 40 --full-lock-ms 100 --decay 0.5 --head-intensity 0.9 --min-speed 3.5 --max-speed 9";

pub fn default_params_usage_for_help() -> String {
    if !color_enabled_stdout() {
        return DEFAULT_PARAMS_USAGE.to_string();
    }
    let mut out = String::with_capacity(DEFAULT_PARAMS_USAGE.len() + 32);
    for (i, line) in DEFAULT_PARAMS_USAGE.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(rest) = line.strip_prefix("  glyphfall") {
            out.push_str("  \x1b[1;34mglyphfall\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        }
    }
    out
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

impl ColorBg {
    pub fn keeps_terminal_background(self) -> bool {
        matches!(self, ColorBg::DefaultBackground | ColorBg::Transparent)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 't',
        long = "text",
        default_value = DEFAULT_TEXT,
        help_heading = "GENERAL",
        help = "Logotype the rain freezes into"
    )]
    pub text: String,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for a reproducible session"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "white",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detect from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        value_enum,
        default_value_t = ColorBg::Black,
        help_heading = "APPEARANCE",
        help = "Background: black, default-background or transparent"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "no-backdrop",
        help_heading = "APPEARANCE",
        help = "Leave untouched cells blank instead of faint glyphs"
    )]
    pub no_backdrop: bool,

    #[arg(
        long = "freeze-start-ms",
        default_value_t = 40,
        help_heading = "TIMING",
        help = "Milliseconds of free rain before the freeze wave starts"
    )]
    pub freeze_start_ms: u64,

    #[arg(
        long = "full-lock-ms",
        default_value_t = 100,
        help_heading = "TIMING",
        help = "Milliseconds until the wave covers the full width"
    )]
    pub full_lock_ms: u64,

    #[arg(
        long = "decay",
        default_value_t = 0.5,
        help_heading = "TIMING",
        help = "Trail intensity lost per frame (min 0.001 max 1)"
    )]
    pub decay: f32,

    #[arg(
        long = "head-intensity",
        default_value_t = 0.9,
        help_heading = "TIMING",
        help = "Intensity of an unlocked head cell (min 0.01 max 1)"
    )]
    pub head_intensity: f32,

    #[arg(
        long = "min-speed",
        default_value_t = 3.5,
        help_heading = "TIMING",
        help = "Slowest column, rows per frame (min 0.01 max 64)"
    )]
    pub min_speed: f32,

    #[arg(
        long = "max-speed",
        default_value_t = 9.0,
        help_heading = "TIMING",
        help = "Fastest column, rows per frame (min 0.01 max 64)"
    )]
    pub max_speed: f32,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Literal rain alphabet, overrides --charset"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "log-file",
        help_heading = "DIAGNOSTICS",
        help = "Write tracing output to this file"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "log-level",
        default_value = "info",
        help_heading = "DIAGNOSTICS",
        help = "Log level for --log-file (error, warn, info, debug, trace)"
    )]
    pub log_level: tracing::Level,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn require_f64_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(GlyphfallError::invalid(name, v, "must be a finite number"));
    }
    if v < min || v > max {
        return Err(GlyphfallError::invalid(
            name,
            v,
            format!("min {} max {}", min, max),
        ));
    }
    Ok(v)
}

fn require_f32_range(name: &'static str, v: f32, min: f32, max: f32) -> Result<f32> {
    if !v.is_finite() {
        return Err(GlyphfallError::invalid(name, v, "must be a finite number"));
    }
    if v < min || v > max {
        return Err(GlyphfallError::invalid(
            name,
            v,
            format!("min {} max {}", min, max),
        ));
    }
    Ok(v)
}

impl Args {
    pub fn tuning(&self) -> Result<Tuning> {
        let min_speed = require_f32_range("--min-speed", self.min_speed, 0.01, 64.0)?;
        let max_speed = require_f32_range("--max-speed", self.max_speed, 0.01, 64.0)?;
        if min_speed > max_speed {
            return Err(GlyphfallError::invalid(
                "--min-speed",
                min_speed,
                format!("must not exceed --max-speed {}", max_speed),
            ));
        }
        if self.full_lock_ms < self.freeze_start_ms {
            return Err(GlyphfallError::invalid(
                "--full-lock-ms",
                self.full_lock_ms,
                format!("must not precede --freeze-start-ms {}", self.freeze_start_ms),
            ));
        }

        Ok(Tuning {
            freeze_start: Duration::from_millis(self.freeze_start_ms),
            full_lock: Duration::from_millis(self.full_lock_ms),
            trail_decay: require_f32_range("--decay", self.decay, 0.001, 1.0)?,
            head_intensity: require_f32_range(
                "--head-intensity",
                self.head_intensity,
                0.01,
                1.0,
            )?,
            min_speed,
            max_speed,
        })
    }

    pub fn frame_period(&self) -> Result<Duration> {
        let fps = require_f64_range("--fps", self.fps, 1.0, 240.0)?;
        Ok(Duration::from_secs_f64(1.0 / fps))
    }

    pub fn run_limit(&self) -> Result<Option<Duration>> {
        match self.duration {
            Some(s) if !s.is_finite() => Err(GlyphfallError::invalid(
                "--duration",
                s,
                "must be a finite number",
            )),
            Some(s) if s > 0.0 => Ok(Some(Duration::from_secs_f64(require_f64_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?))),
            _ => Ok(None),
        }
    }

    pub fn alphabet(&self, default_to_ascii: bool) -> Result<Vec<char>> {
        if let Some(chars) = &self.chars {
            return literal_chars(chars);
        }
        Ok(build_chars(charset_from_str(&self.charset, default_to_ascii)?))
    }

    pub fn color_scheme(&self) -> Result<ColorScheme> {
        parse_color_scheme(&self.color)
    }

    pub fn forced_color_mode(&self) -> Result<Option<ColorMode>> {
        let Some(m) = self.colormode else {
            return Ok(None);
        };
        match m {
            0 => Ok(Some(ColorMode::Mono)),
            16 => Ok(Some(ColorMode::Color16)),
            8 | 256 => Ok(Some(ColorMode::Color256)),
            24 | 32 => Ok(Some(ColorMode::TrueColor)),
            _ => Err(GlyphfallError::invalid(
                "--colormode",
                m,
                "allowed: 0,16,8,256,24,32",
            )),
        }
    }
}

pub fn parse_color_scheme(s: &str) -> Result<ColorScheme> {
    match s.trim().to_ascii_lowercase().as_str() {
        "white" | "mono" => Ok(ColorScheme::White),
        "green" | "matrix" => Ok(ColorScheme::Green),
        "cyan" => Ok(ColorScheme::Cyan),
        "gold" => Ok(ColorScheme::Gold),
        "purple" => Ok(ColorScheme::Purple),
        "fire" | "inferno" => Ok(ColorScheme::Fire),
        other => Err(GlyphfallError::UnknownColor(other.to_string())),
    }
}

fn print_heading(title: &str, note: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", title);
        println!("\x1b[2m{}\x1b[0m", note);
    } else {
        println!("{}", title);
        println!("{}", note);
    }
    println!();
}

pub fn print_list_charsets() {
    print_heading(
        "AVAILABLE CHARSET PRESETS:",
        "NOTE: Use only the VALUE (left side) with --charset.",
    );
    println!("VALUE        DESCRIPTION");
    println!("auto         Auto-select (ascii-safe when non-UTF, otherwise intro)");
    println!("intro        Halfwidth katakana + digits + capitals (alias: matrix)");
    println!("ascii        Printable ASCII");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("digits       Digits only (aliases: dec, decimal)");
    println!("english      Letters only");
    println!("katakana     Halfwidth katakana");
    println!("symbols      Math/technical symbols");
    println!("blocks       Block elements");
    println!("braille      Braille");
}

pub fn print_list_colors() {
    print_heading(
        "AVAILABLE COLOR THEMES:",
        "NOTE: Use only the VALUE (left side) with --color.",
    );
    println!("VALUE        DESCRIPTION");
    println!("white        White rain, white logotype (alias: mono)");
    println!("green        Green rain (alias: matrix)");
    println!("cyan         Cyan rain");
    println!("gold         Gold rain");
    println!("purple       Purple rain");
    println!("fire         Fire rain (alias: inferno)");
}
