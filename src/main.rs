// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod column;
mod config;
mod entropy;
mod error;
mod frame;
mod grid;
mod mask;
mod palette;
mod render;
mod runtime;
mod scheduler;
mod terminal;
mod wave;

use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_charsets, print_list_colors,
    Args,
};
use crate::entropy::SeededSource;
use crate::error::Result;
use crate::frame::Frame;
use crate::palette::build_palette;
use crate::render::Renderer;
use crate::runtime::ColorMode;
use crate::scheduler::{Scheduler, SessionSettings};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// Upper bound on one idle wait while paused, so quit keys stay responsive.
const PAUSED_POLL: Duration = Duration::from_millis(100);

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term == "linux" {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

fn install_exit_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(args.log_level)
        .init();
    Ok(())
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn run() -> Result<()> {
    let args = parse_args();

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", env!("GLYPHFALL_BUILD"));
        let sha = env!("GLYPHFALL_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let tuning = args.tuning()?;
    let period = args.frame_period()?;
    let run_limit = args.run_limit()?;
    let alphabet = args.alphabet(default_to_ascii())?;
    let scheme = args.color_scheme()?;
    let color_mode = args
        .forced_color_mode()?
        .unwrap_or_else(detect_color_mode_auto);

    init_logging(&args)?;
    tracing::info!(
        text = %args.text,
        glyphs = alphabet.len(),
        ?color_mode,
        ?scheme,
        fps = args.fps,
        seed = ?args.seed,
        "starting session"
    );

    let rng = match args.seed {
        Some(seed) => SeededSource::from_seed(seed),
        None => SeededSource::from_os(),
    };
    let palette = build_palette(
        scheme,
        color_mode,
        args.color_bg.keeps_terminal_background(),
    );
    let mut renderer = Renderer::new(palette, !args.no_backdrop);

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;

    let start_time = Instant::now();
    let end_time = run_limit.map(|d| start_time + d);

    let settings = SessionSettings {
        text: args.text.clone(),
        alphabet,
        tuning,
    };
    let mut scheduler = Scheduler::start(settings, rng, period, w, h, start_time);
    let mut frame = Frame::new(w, h, renderer.bg());
    if let Some(g) = scheduler.grid() {
        renderer.fit(g.cols(), g.rows(), w, h);
    }

    let mut raining = true;
    while raining && scheduler.is_running() {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;
        let mut restart = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            raining = false;
                            break;
                        }

                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => raining = false,
                            KeyCode::Char(' ') => restart = true,
                            KeyCode::Char('p') => scheduler.toggle_pause(Instant::now()),
                            KeyCode::Char('r') => {
                                scheduler.request_snapshot();
                                frame.mark_all_dirty();
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !raining || restart || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            let mut timeout = if scheduler.is_paused() {
                PAUSED_POLL
            } else {
                match scheduler.time_until_due(now) {
                    Some(t) if !t.is_zero() => t,
                    _ => break,
                }
            };
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !raining {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            scheduler.rebuild(nw, nh);
            frame = Frame::new(nw, nh, renderer.bg());
        }
        if restart {
            scheduler.restart(Instant::now());
        }
        if pending_resize.is_some() || restart {
            if let Some(g) = scheduler.grid() {
                renderer.fit(g.cols(), g.rows(), frame.width, frame.height);
            }
        }

        let now = Instant::now();
        if let Some(delta) = scheduler.tick(now) {
            renderer.apply(&delta, &mut frame);
        }
        if frame.has_changes() {
            term.draw(&mut frame)?;
        }
    }

    let locked = scheduler.grid().map_or(0, |g| g.locked_count());
    let generations = scheduler.generation();
    scheduler.teardown();
    tracing::info!(
        locked,
        generations,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "session ended"
    );
    Ok(())
}

fn main() {
    install_exit_handlers();

    if let Err(e) = run() {
        restore_terminal_best_effort();
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
