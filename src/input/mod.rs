//! Input decoding for terminal events.
//!
//! Raw bytes from the terminal are framed into units ([`framing`]), SGR mouse
//! reports are decoded ([`mouse`]) and whole buffers are turned into ordered
//! event lists with a leftover tail ([`parser`]).

mod event;
pub mod framing;
pub mod keys;
pub mod mouse;
mod parser;

pub use event::{Event, EventKind, MouseAction, MouseButton, MouseEvent};
pub use framing::{Framed, SequenceEnd, decode_key, find_end_of_control_sequence, frame_next};
pub use keys::key_name;
pub use mouse::{ButtonCode, decode_sgr, decode_sgr_sequence, encode_sgr, is_sgr_mouse};
pub use parser::{DecodeFault, EventParser, LIVELOCK_THRESHOLD, parse_events};

/// Escape byte.
pub const ESC: u8 = 0x1b;

/// Control sequence introducer, `ESC [`.
pub const CSI: &[u8] = b"\x1b[";
