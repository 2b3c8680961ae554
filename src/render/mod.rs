//! The rendering surface: a byte frame buffer filled with ANSI output.
//!
//! The frame callback draws into a [`FrameBuffer`] each tick. The scheduler
//! compares the finished bytes with the previous frame and only writes them
//! to the terminal when something changed.

mod style;
mod text;

pub use style::{Attr, Style};
pub use text::{Line, RawSegment, Span, StyledBlock, Trimmed, split_raw_segments, trim_to_width};

use crate::ansi;
use crate::geometry::{Point, Rect, TerminalSize};
use std::io;

/// Bytes of one rendered frame.
#[derive(Clone, Debug, Default)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
    size: TerminalSize,
}

impl FrameBuffer {
    /// Create an empty frame buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminal size as of the current tick.
    #[must_use]
    pub const fn size(&self) -> TerminalSize {
        self.size
    }

    /// Rectangle covering the whole screen.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        Rect::from_size(self.size)
    }

    pub(crate) fn set_size(&mut self, size: TerminalSize) {
        self.size = size;
    }

    /// Start a new frame: drop previous contents, clear screen, cursor home.
    ///
    /// Keeps the allocation.
    pub fn begin_frame(&mut self) {
        self.bytes.clear();
        self.clear_screen();
        self.set_pos(Point::HOME);
    }

    /// Rendered bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Move the cursor to `point` (1-based).
    pub fn set_pos(&mut self, point: Point) {
        self.write_str(&ansi::cursor_position(point.x, point.y));
    }

    /// Move the cursor `n` lines down (up when negative).
    pub fn move_lines(&mut self, n: i32) {
        self.write_str(&ansi::move_lines(n));
    }

    /// Clear the whole screen.
    pub fn clear_screen(&mut self) {
        self.write_str(ansi::CLEAR_SCREEN);
    }

    /// Append text or escape sequences verbatim.
    pub fn write_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Draw styled lines inside `rect`.
    ///
    /// Lines beyond the rect's height are dropped, spans are trimmed to the
    /// remaining width and whatever is left of each row is blanked.
    pub fn render_styled_block(&mut self, rect: Rect, block: &StyledBlock) {
        let rows = usize::try_from(rect.height).unwrap_or(0);
        let width = usize::try_from(rect.width).unwrap_or(0);
        let mut point = rect.origin();

        for line in block.lines.iter().take(rows) {
            self.set_pos(point);
            self.write_str(ansi::RESET);
            let mut remaining = width;
            for span in &line.spans {
                let trim = trim_to_width(&span.text, remaining);
                self.write_str(&span.style.sgr());
                self.write_str(trim.trimmed);
                remaining -= trim.width;
                if !trim.tail.is_empty() || remaining == 0 {
                    break;
                }
            }
            self.write_str(ansi::RESET);
            self.bytes.resize(self.bytes.len() + remaining, b' ');
            point.y += 1;
        }
        self.write_str(ansi::RESET);
    }

    /// Draw raw text (which may contain its own escape sequences) inside `rect`.
    ///
    /// Text is trimmed to the rect's width per line, but escape sequences past
    /// the cut are still written so colour state stays consistent.
    pub fn render_raw_text(&mut self, rect: Rect, text: &str) {
        let rows = usize::try_from(rect.height).unwrap_or(0);
        let width = usize::try_from(rect.width).unwrap_or(0);
        let mut point = rect.origin();

        self.write_str(ansi::RESET);
        for line in text.split('\n').take(rows) {
            self.set_pos(point);
            let mut remaining = width;
            for segment in split_raw_segments(line) {
                self.write_str(segment.control);
                if remaining > 0 {
                    let trim = trim_to_width(segment.text, remaining);
                    self.write_str(trim.trimmed);
                    remaining -= trim.width;
                    if !trim.tail.is_empty() {
                        remaining = 0;
                    }
                }
            }
            point.y += 1;
        }
        self.write_str(ansi::RESET);
    }
}

impl io::Write for FrameBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
