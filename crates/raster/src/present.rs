//! TerminalPresenter: shows a raster surface on a real terminal.
//!
//! Each terminal cell covers two vertically stacked samples of the surface,
//! drawn as an upper half block (`▀`) with the top sample as foreground and
//! the bottom sample as background. Labels are written over the cells as
//! plain text. Only runs of cells that changed since the last flush are sent.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::cells::{Cell, CellGrid, Rgb};
use crate::surface::Surface;

const HALF_BLOCK: char = '▀';

/// Sample `surface` into `grid`, two pixel rows per cell row, then overlay
/// the surface's labels.
pub fn downsample_into(surface: &Surface, grid: &mut CellGrid) {
    let cols = grid.width() as u64;
    let rows = grid.height() as u64;
    if cols == 0 || rows == 0 {
        return;
    }
    let sw = surface.width() as u64;
    let sh = surface.height() as u64;

    let sample = |px: u64, py: u64| -> Rgb {
        surface
            .pixel((px * sw / cols) as u32, (py * sh / (rows * 2)) as u32)
            .map(Rgb::from)
            .unwrap_or_default()
    };

    for y in 0..rows {
        for x in 0..cols {
            grid.set(
                x as u16,
                y as u16,
                Cell {
                    ch: HALF_BLOCK,
                    fg: sample(x, y * 2),
                    bg: sample(x, y * 2 + 1),
                },
            );
        }
    }

    if sw == 0 || sh == 0 {
        return;
    }
    for label in surface.labels() {
        if label.x < 0 || label.y < 0 {
            continue;
        }
        let cx = label.x as u64 * cols / sw;
        let cy = label.y as u64 * rows / sh;
        if cx >= cols || cy >= rows {
            continue;
        }
        grid.put_str(
            cx as u16,
            cy as u16,
            &label.text,
            Rgb::from(label.fg),
            label.bg.map(Rgb::from),
        );
    }
}

pub struct TerminalPresenter {
    stdout: io::Stdout,
    next: CellGrid,
    last: Option<CellGrid>,
    buf: Vec<u8>,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            next: CellGrid::new(0, 0),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next present to be a full redraw.
    ///
    /// Call on terminal resize.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Present a surface on a `cols x rows` terminal.
    pub fn present(&mut self, surface: &Surface, cols: u16, rows: u16) -> Result<()> {
        self.next.resize(cols, rows);
        downsample_into(surface, &mut self.next);

        self.buf.clear();
        match self.last.take() {
            Some(mut prev) if prev.width() == cols && prev.height() == rows => {
                encode_diff_into(&prev, &self.next, &mut self.buf)?;
                std::mem::swap(&mut prev, &mut self.next);
                self.last = Some(prev);
            }
            _ => {
                encode_full_into(&self.next, &mut self.buf)?;
                self.last = Some(self.next.clone());
            }
        }
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a full redraw into `out`.
pub fn encode_full_into(grid: &CellGrid, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut current: Option<(Rgb, Rgb)> = None;
    for y in 0..grid.height() {
        out.queue(cursor::MoveTo(0, y))?;
        for x in 0..grid.width() {
            let cell = grid.get(x, y).unwrap_or_default();
            emit_cell(out, cell, &mut current)?;
        }
    }

    out.queue(ResetColor)?;
    Ok(())
}

/// Encode only the changed runs between `prev` and `next` into `out`.
pub fn encode_diff_into(prev: &CellGrid, next: &CellGrid, out: &mut Vec<u8>) -> Result<()> {
    let mut current: Option<(Rgb, Rgb)> = None;

    for_each_changed_run(prev, next, |x, y, len| {
        out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = next.get(x + dx, y).unwrap_or_default();
            emit_cell(out, cell, &mut current)?;
        }
        Ok(())
    })?;

    out.queue(ResetColor)?;
    Ok(())
}

fn emit_cell(out: &mut Vec<u8>, cell: Cell, current: &mut Option<(Rgb, Rgb)>) -> Result<()> {
    if *current != Some((cell.fg, cell.bg)) {
        out.queue(SetForegroundColor(rgb_to_color(cell.fg)))?;
        out.queue(SetBackgroundColor(rgb_to_color(cell.bg)))?;
        *current = Some((cell.fg, cell.bg));
    }
    out.queue(Print(cell.ch))?;
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn for_each_changed_run(
    prev: &CellGrid,
    next: &CellGrid,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        for y in 0..next.height() {
            f(0, y, next.width())?;
        }
        return Ok(());
    }

    let w = next.width();
    for y in 0..next.height() {
        let mut x = 0;
        while x < w {
            if prev.get(x, y) == next.get(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            x += 1;
            while x < w && prev.get(x, y) != next.get(x, y) {
                x += 1;
            }
            f(start, y, x - start)?;
        }
    }

    Ok(())
}
