// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::{Frame, Paint};

/// Current SGR state of the output stream, so runs of equally styled cells
/// only pay for one set of escape codes.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, p: &Paint) -> Result<()> {
        if p.fg != self.fg {
            out.queue(SetForegroundColor(p.fg.unwrap_or(Color::Reset)))?;
            self.fg = p.fg;
        }
        if p.bg != self.bg {
            out.queue(SetBackgroundColor(p.bg.unwrap_or(Color::Reset)))?;
            self.bg = p.bg;
        }
        if p.bold != self.bold {
            out.queue(SetAttribute(if p.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = p.bold;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    drawn: Option<(u16, u16)>,
    run_buf: String,
    scratch: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            drawn: None,
            run_buf: String::with_capacity(64),
            scratch: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let total = frame.width as usize * frame.height as usize;
        let full = self.drawn != Some(size)
            || frame.is_dirty_all()
            || frame.dirty_indices().len() >= total / 3;

        let mut pen = Pen::default();
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;

        if full {
            if self.drawn != Some(size) {
                self.stdout
                    .queue(terminal::Clear(terminal::ClearType::All))?;
            }
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                let row = y as usize * frame.width as usize;
                for idx in row..row + frame.width as usize {
                    let p = frame.paint_at_index(idx);
                    pen.apply(&mut self.stdout, &p)?;
                    self.stdout.queue(Print(p.ch))?;
                }
            }
            self.drawn = Some(size);
        } else {
            self.scratch.clear();
            self.scratch.extend_from_slice(frame.dirty_indices());
            self.scratch.sort_unstable();

            let width = frame.width as usize;
            let mut i = 0;
            while i < self.scratch.len() {
                let start = self.scratch[i];
                let p0 = frame.paint_at_index(start);
                self.run_buf.clear();
                self.run_buf.push(p0.ch);

                // Extend across horizontally adjacent cells of the same style.
                let mut j = i + 1;
                while j < self.scratch.len() {
                    let idx = self.scratch[j];
                    let prev = self.scratch[j - 1];
                    if idx != prev + 1 || idx % width == 0 {
                        break;
                    }
                    let p = frame.paint_at_index(idx);
                    if p.fg != p0.fg || p.bg != p0.bg || p.bold != p0.bold {
                        break;
                    }
                    self.run_buf.push(p.ch);
                    j += 1;
                }

                self.stdout.queue(cursor::MoveTo(
                    (start % width) as u16,
                    (start / width) as u16,
                ))?;
                pen.apply(&mut self.stdout, &p0)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                i = j;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
