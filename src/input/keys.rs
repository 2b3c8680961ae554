//! Display names for control keys.
//!
//! In raw mode Ctrl+letter arrives as the C0 control byte for that letter
//! (Ctrl-A = 0x01 ... Ctrl-Z = 0x1a). A few of those collide with dedicated
//! keys, which win: 0x08 is Backspace, 0x09 Tab, 0x0d Return and 0x1b Esc.

pub const CTRL_SPACE: char = '\x00';
pub const BACKSPACE: char = '\x08';
pub const TAB: char = '\x09';
pub const RETURN: char = '\x0d';
pub const ESC: char = '\x1b';
pub const CTRL_BACKSLASH: char = '\x1c';
pub const CTRL_RIGHT_SQ: char = '\x1d';
pub const CTRL_CARAT: char = '\x1e';
pub const CTRL_UNDERSCORE: char = '\x1f';

const CTRL_LETTERS: [&str; 26] = [
    "Ctrl-A", "Ctrl-B", "Ctrl-C", "Ctrl-D", "Ctrl-E", "Ctrl-F", "Ctrl-G", "Ctrl-H", "Ctrl-I",
    "Ctrl-J", "Ctrl-K", "Ctrl-L", "Ctrl-M", "Ctrl-N", "Ctrl-O", "Ctrl-P", "Ctrl-Q", "Ctrl-R",
    "Ctrl-S", "Ctrl-T", "Ctrl-U", "Ctrl-V", "Ctrl-W", "Ctrl-X", "Ctrl-Y", "Ctrl-Z",
];

/// Name of a control key, or `None` for printable keys.
///
/// Non-mouse control sequences (arrows, function keys) are delivered with
/// key `'\0'`, the same byte as Ctrl-Space. Check
/// [`Event::control_sequence`](super::Event::control_sequence) first, or use
/// [`Event::key_name`](super::Event::key_name), which does.
#[must_use]
pub fn key_name(key: char) -> Option<&'static str> {
    match key {
        RETURN => Some("Return"),
        BACKSPACE => Some("Backspace"),
        TAB => Some("Tab"),
        ESC => Some("Esc"),
        CTRL_SPACE => Some("Ctrl-Space"),
        CTRL_BACKSLASH => Some("Ctrl-\\"),
        CTRL_RIGHT_SQ => Some("Ctrl-]"),
        CTRL_CARAT => Some("Ctrl-^"),
        CTRL_UNDERSCORE => Some("Ctrl-_"),
        '\x01'..='\x1a' => Some(CTRL_LETTERS[key as usize - 1]),
        _ => None,
    }
}

/// Control byte produced by Ctrl+`letter` (case-insensitive).
#[must_use]
pub fn ctrl(letter: char) -> Option<char> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| char::from(upper as u8 - b'A' + 1))
}
