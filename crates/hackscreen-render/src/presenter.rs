#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! The presenter remembers the last frame it wrote and, on the next
//! [`Presenter::present`], only emits the cells that changed. The first frame
//! and any frame with different dimensions is a full repaint preceded by an
//! erase.
//!
//! Style changes use reset-then-apply: whenever a cell's colours or flags
//! differ from the current pen, the pen is reset and rebuilt. Output for a
//! frame is buffered and flushed once, wrapped in DEC 2026 synchronized output
//! when enabled.
//!
//! # Usage
//!
//! ```
//! use hackscreen_render::buffer::Buffer;
//! use hackscreen_render::cell::Cell;
//! use hackscreen_render::presenter::Presenter;
//!
//! let mut presenter = Presenter::new(Vec::new());
//! let mut frame = Buffer::new(10, 2);
//! frame.set(0, 0, Cell::from_char('x'));
//! presenter.present(&frame)?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, BufWriter, Write};

use crate::ansi::{self, EraseDisplayMode};
use crate::buffer::Buffer;
use crate::cell::{Cell, PackedRgba, StyleFlags};

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// Cached pen state for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    flags: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            flags: cell.flags,
        }
    }
}

/// Per-frame output counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentStats {
    /// Cells written this frame.
    pub cells_written: usize,
    /// Whether the frame was a full repaint.
    pub full_repaint: bool,
}

/// State-tracked ANSI presenter.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    /// Current pen (None = unknown/reset).
    current_style: Option<CellStyle>,
    /// Current cursor position (x, y). None = unknown.
    cursor: Option<(u16, u16)>,
    /// Last frame written, for diffing.
    previous: Option<Buffer>,
    sync_output: bool,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter with synchronized output enabled.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            cursor: None,
            previous: None,
            sync_output: true,
        }
    }

    /// Enable or disable DEC 2026 synchronized output.
    #[must_use]
    pub fn with_sync_output(mut self, enabled: bool) -> Self {
        self.sync_output = enabled;
        self
    }

    /// Forget the previous frame; the next present repaints everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.current_style = None;
        self.cursor = None;
    }

    /// Present a frame.
    ///
    /// 1. Begins synchronized output (if enabled)
    /// 2. Emits changed cells (or all cells on a repaint)
    /// 3. Resets the pen
    /// 4. Ends synchronized output
    /// 5. Flushes all buffered output
    pub fn present(&mut self, buffer: &Buffer) -> io::Result<PresentStats> {
        let span = hackscreen_core::info_span!(
            "present",
            width = buffer.width(),
            height = buffer.height()
        );
        let _guard = span.enter();

        if self.sync_output {
            ansi::sync_begin(&mut self.writer)?;
        }

        let full_repaint = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != buffer.width() || prev.height() != buffer.height());

        let mut stats = PresentStats {
            cells_written: 0,
            full_repaint,
        };

        if full_repaint {
            ansi::sgr_reset(&mut self.writer)?;
            ansi::erase_display(&mut self.writer, EraseDisplayMode::All)?;
            self.current_style = None;
            self.cursor = None;
        }

        for y in 0..buffer.height() {
            for (x, cell) in buffer.row(y).iter().enumerate() {
                let x = x as u16;
                let unchanged = !full_repaint
                    && self
                        .previous
                        .as_ref()
                        .and_then(|prev| prev.get(x, y))
                        .is_some_and(|old| old == cell);
                if unchanged || (full_repaint && cell.is_blank()) {
                    continue;
                }
                self.move_cursor_to(x, y)?;
                self.emit_cell(cell)?;
                stats.cells_written += 1;
            }
        }

        ansi::sgr_reset(&mut self.writer)?;
        self.current_style = None;

        if self.sync_output {
            ansi::sync_end(&mut self.writer)?;
        }

        match self.previous.as_mut() {
            Some(prev) if !full_repaint => prev.clone_from(buffer),
            _ => self.previous = Some(buffer.clone()),
        }

        hackscreen_core::trace!(cells = stats.cells_written, full_repaint, "frame presented");
        self.writer.flush()?;
        Ok(stats)
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, io::Error> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        self.emit_style_changes(cell)?;
        let mut buf = [0u8; 4];
        self.writer.write_all(cell.ch.encode_utf8(&mut buf).as_bytes())?;
        if let Some((x, y)) = self.cursor {
            self.cursor = Some((x.saturating_add(1), y));
        }
        Ok(())
    }

    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let new_style = CellStyle::from_cell(cell);
        if self.current_style == Some(new_style) {
            return Ok(());
        }

        ansi::sgr_reset(&mut self.writer)?;
        if new_style.fg.a() > 0 {
            ansi::sgr_fg_packed(&mut self.writer, new_style.fg)?;
        }
        if new_style.bg.a() > 0 {
            ansi::sgr_bg_packed(&mut self.writer, new_style.bg)?;
        }
        ansi::sgr_flags(&mut self.writer, new_style.flags)?;

        self.current_style = Some(new_style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        ansi::cup(&mut self.writer, y, x)?;
        self.cursor = Some((x, y));
        Ok(())
    }
}
