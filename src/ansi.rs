//! ANSI escape sequences written to the terminal.

/// Reset all attributes to default.
pub const RESET: &str = "\x1b[0m";

/// Clear entire screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// Hide cursor.
pub const CURSOR_HIDE: &str = "\x1b[?25l";

/// Show cursor.
pub const CURSOR_SHOW: &str = "\x1b[?25h";

/// Enable alternative screen buffer.
pub const ALT_SCREEN_ON: &str = "\x1b[?1049h";

/// Disable alternative screen buffer.
pub const ALT_SCREEN_OFF: &str = "\x1b[?1049l";

/// Report every mouse event (1003) using SGR encoding (1006).
pub const MOUSE_ON: &str = "\x1b[?1003;1006h";

/// Disable mouse reporting.
pub const MOUSE_OFF: &str = "\x1b[?1003;1006l";

/// Move the cursor to a 1-based column and row (`CSI row ; col H`).
#[must_use]
pub fn cursor_position(x: i32, y: i32) -> String {
    format!("\x1b[{y};{x}H")
}

/// Move the cursor `n` lines down, or up when `n` is negative.
#[must_use]
pub fn move_lines(n: i32) -> String {
    if n < 0 {
        format!("\x1b[{}A", n.unsigned_abs())
    } else {
        format!("\x1b[{n}B")
    }
}
