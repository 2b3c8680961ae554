//! Turns a captured byte buffer into an ordered list of events.
//!
//! The parser is stateless: everything it cannot decode yet is handed back
//! as a leftover slice, which the caller prepends to the next batch of input.
//! No input, however malformed, makes it fail or stop early; a unit that
//! cannot be decoded is reported through the log callback and skipped.

use super::ESC;
use super::event::Event;
use super::framing::{Framed, REPLACEMENT, frame_next};
use super::mouse::decode_sgr_sequence;
use crate::event::{LogLevel, emit_log};
use std::fmt;
use std::time::Instant;

/// Buffers longer than this that end in a lone `ESC` keep it as leftover.
///
/// A burst of input that ends on `ESC` is almost always a control sequence
/// whose tail has not been read yet.
pub const LIVELOCK_THRESHOLD: usize = 12;

/// Why a single framed unit could not become an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeFault {
    /// A control sequence was cut short by a byte that cannot belong to it.
    Interrupted { len: usize },
}

impl DecodeFault {
    /// Bytes to skip before resuming.
    #[must_use]
    pub const fn skip(&self) -> usize {
        match *self {
            Self::Interrupted { len } => if len == 0 { 1 } else { len },
        }
    }
}

impl fmt::Display for DecodeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted { len } => {
                write!(f, "control sequence interrupted after {len} bytes")
            }
        }
    }
}

/// Stateless event parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventParser {
    idle: bool,
}

impl EventParser {
    /// Create a parser for a buffer that may still be growing.
    #[must_use]
    pub const fn new() -> Self {
        Self { idle: false }
    }

    /// Mark the input as quiet: nothing new arrived since the last pass.
    ///
    /// A quiet buffer that ends in a lone `ESC` delivers it as the Escape key,
    /// and a truncated UTF-8 tail decodes to U+FFFD. An unterminated `ESC [`
    /// sequence is still kept as leftover.
    #[must_use]
    pub const fn idle(mut self, idle: bool) -> Self {
        self.idle = idle;
        self
    }

    /// Parse `data` into events stamped with `now`.
    ///
    /// Returns the events in arrival order and the unconsumed tail.
    pub fn parse<'a>(&self, data: &'a [u8], now: Instant) -> (Vec<Event<'a>>, &'a [u8]) {
        let mut events = Vec::new();
        let consumed = self.parse_into(data, now, &mut events);
        (events, &data[consumed..])
    }

    /// Parse `data`, appending events to `out`. Returns the bytes consumed.
    pub fn parse_into<'a>(&self, data: &'a [u8], now: Instant, out: &mut Vec<Event<'a>>) -> usize {
        let initial = data.len();
        let mut pos = 0;

        while pos < initial {
            let rest = &data[pos..];
            if initial > LIVELOCK_THRESHOLD && rest == [ESC] {
                break;
            }

            let mut framed = frame_next(rest);
            if !framed.is_complete() && self.idle {
                framed = flush_stalled(rest);
            }

            match framed {
                Framed::Incomplete => break,
                Framed::Key { key, len } => {
                    out.push(Event::key(key, &rest[..len], now));
                    pos += len;
                }
                Framed::ControlSequence { len } => {
                    out.push(control_event(&rest[..len], now));
                    pos += len;
                }
                Framed::Broken { len } => {
                    let fault = DecodeFault::Interrupted { len };
                    emit_log(
                        LogLevel::Warn,
                        &format!("input decode fault: {fault}; raw={:02x?}", &rest[..len]),
                    );
                    pos += fault.skip();
                }
            }
        }

        pos.min(initial)
    }
}

/// Parse `data` as a buffer that may still be growing.
pub fn parse_events(data: &[u8], now: Instant) -> (Vec<Event<'_>>, &[u8]) {
    EventParser::new().parse(data, now)
}

/// Event for a complete control sequence: a mouse report or a bare key.
fn control_event(sequence: &[u8], now: Instant) -> Event<'_> {
    match decode_sgr_sequence(sequence) {
        Some(mouse) => Event::mouse(mouse, sequence, now),
        None => Event::key('\0', sequence, now),
    }
}

/// Resolve an incomplete tail once input has gone quiet.
fn flush_stalled(rest: &[u8]) -> Framed {
    if rest == [ESC] {
        return Framed::Key { key: '\x1b', len: 1 };
    }
    if rest.starts_with(super::CSI) {
        return Framed::Incomplete;
    }
    Framed::Key {
        key: REPLACEMENT,
        len: 1,
    }
}
