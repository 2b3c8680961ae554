//! Terminal mode control: raw mode, alternate screen, cursor and mouse
//! reporting.

mod raw;

pub use raw::{RawModeGuard, enable_raw_mode, is_tty, make_raw, terminal_size, terminal_size_of};

use crate::ansi;
use std::io::{self, Write};

/// Terminal state manager.
///
/// Every mode it turns on is turned back off by [`cleanup`](Self::cleanup),
/// which also runs on drop.
pub struct Terminal<W: Write> {
    writer: W,
    alt_screen: bool,
    mouse_enabled: bool,
    cursor_hidden: bool,
    raw_mode_guard: Option<RawModeGuard>,
}

impl<W: Write> Terminal<W> {
    /// Create a terminal controller writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            alt_screen: false,
            mouse_enabled: false,
            cursor_hidden: false,
            raw_mode_guard: None,
        }
    }

    /// Check if terminal is in raw mode.
    #[must_use]
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode_guard.is_some()
    }

    /// Enter raw mode on stdin.
    pub fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_mode_guard.is_none() {
            self.raw_mode_guard = Some(enable_raw_mode()?);
        }
        Ok(())
    }

    /// Exit raw mode, restoring the saved terminal state.
    pub fn exit_raw_mode(&mut self) -> io::Result<()> {
        if let Some(guard) = self.raw_mode_guard.take() {
            guard.restore()?;
        }
        Ok(())
    }

    /// Enter alternate screen buffer.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        if !self.alt_screen {
            self.writer.write_all(ansi::ALT_SCREEN_ON.as_bytes())?;
            self.alt_screen = true;
        }
        Ok(())
    }

    /// Leave alternate screen buffer.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        if self.alt_screen {
            self.writer.write_all(ansi::ALT_SCREEN_OFF.as_bytes())?;
            self.alt_screen = false;
        }
        Ok(())
    }

    /// Enable SGR mouse reporting for all events.
    pub fn enable_mouse(&mut self) -> io::Result<()> {
        if !self.mouse_enabled {
            self.writer.write_all(ansi::MOUSE_ON.as_bytes())?;
            self.mouse_enabled = true;
        }
        Ok(())
    }

    /// Disable mouse reporting.
    pub fn disable_mouse(&mut self) -> io::Result<()> {
        if self.mouse_enabled {
            self.writer.write_all(ansi::MOUSE_OFF.as_bytes())?;
            self.mouse_enabled = false;
        }
        Ok(())
    }

    /// Hide cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        if !self.cursor_hidden {
            self.writer.write_all(ansi::CURSOR_HIDE.as_bytes())?;
            self.cursor_hidden = true;
        }
        Ok(())
    }

    /// Show cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            self.writer.write_all(ansi::CURSOR_SHOW.as_bytes())?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Flush the output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Undo every mode this controller enabled.
    pub fn cleanup(&mut self) -> io::Result<()> {
        self.show_cursor()?;
        self.disable_mouse()?;
        self.leave_alt_screen()?;
        self.writer.write_all(ansi::RESET.as_bytes())?;
        self.flush()?;
        self.exit_raw_mode()
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
