//! Byte-level framing of the terminal input stream.
//!
//! Decides how many bytes the next input unit occupies without interpreting
//! it: either a control sequence (`ESC [` ... final byte) or one UTF-8 encoded
//! key. Partial units at the end of the available bytes are reported as
//! incomplete so the caller can wait for the rest.

use super::{CSI, ESC};

/// Replacement for undecodable key bytes.
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Outcome of scanning for the end of a control sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceEnd {
    /// Terminated by a final byte; `len` includes introducer and terminator.
    Complete(usize),
    /// No final byte yet; more input needed.
    Incomplete,
    /// A byte that cannot belong to a control sequence appeared before any
    /// final byte. `len` covers the bytes before it.
    Interrupted(usize),
}

/// The next unit in the input stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framed {
    /// More bytes are needed before anything can be decoded.
    Incomplete,
    /// A complete control sequence of `len` bytes.
    ControlSequence { len: usize },
    /// A control sequence cut short by a foreign byte.
    Broken { len: usize },
    /// A single key occupying `len` bytes.
    Key { key: char, len: usize },
}

impl Framed {
    /// Bytes consumed by this unit (0 when incomplete).
    #[must_use]
    pub const fn len(&self) -> usize {
        match *self {
            Self::Incomplete => 0,
            Self::ControlSequence { len } | Self::Broken { len } | Self::Key { len, .. } => len,
        }
    }

    /// Whether a decodable unit was found.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !matches!(self, Self::Incomplete)
    }
}

/// Frame the next unit at the start of `data`.
#[must_use]
pub fn frame_next(data: &[u8]) -> Framed {
    if data.is_empty() {
        return Framed::Incomplete;
    }
    if data.starts_with(CSI) {
        return match find_end_of_control_sequence(data) {
            SequenceEnd::Complete(len) => Framed::ControlSequence { len },
            SequenceEnd::Incomplete => Framed::Incomplete,
            SequenceEnd::Interrupted(len) => Framed::Broken { len },
        };
    }
    if data == [ESC] {
        // Could still become `ESC [`.
        return Framed::Incomplete;
    }
    match decode_key(data) {
        Some((key, len)) => Framed::Key { key, len },
        None => Framed::Incomplete,
    }
}

/// Scan a buffer starting with `ESC [` for its final byte.
///
/// Parameter bytes are `0x30..=0x3f`, intermediate bytes `0x20..=0x2f` and the
/// final byte `0x40..=0x7e`.
#[must_use]
pub fn find_end_of_control_sequence(data: &[u8]) -> SequenceEnd {
    debug_assert!(data.starts_with(CSI));
    for (i, &b) in data.iter().enumerate().skip(CSI.len()) {
        match b {
            0x40..=0x7e => return SequenceEnd::Complete(i + 1),
            0x20..=0x3f => {}
            _ => return SequenceEnd::Interrupted(i),
        }
    }
    SequenceEnd::Incomplete
}

/// Decode one UTF-8 code point at the start of `data`.
///
/// Returns `None` when `data` ends partway through an otherwise valid
/// encoding. Invalid bytes decode to [`REPLACEMENT`] with length 1 so a
/// scanner always advances.
#[must_use]
pub fn decode_key(data: &[u8]) -> Option<(char, usize)> {
    let first = *data.first()?;
    let width = utf8_width(first);
    if width == 0 {
        return Some((REPLACEMENT, 1));
    }
    let avail = &data[..width.min(data.len())];
    match std::str::from_utf8(avail) {
        Ok(s) => s.chars().next().map(|c| (c, c.len_utf8())),
        Err(e) if e.error_len().is_none() => None,
        Err(_) => Some((REPLACEMENT, 1)),
    }
}

/// Encoded width announced by a UTF-8 lead byte, or 0 if it cannot lead.
#[must_use]
pub const fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}
