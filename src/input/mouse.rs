//! SGR (1006) mouse report decoding.
//!
//! Reports have the form `ESC [ < Cb ; Cx ; Cy M` for press/motion/wheel and
//! `... m` for release. `Cb` packs the button and modifier state:
//!
//! ```text
//! bit  6      5       4     3    2      1..0
//!      wheel  motion  ctrl  alt  shift  button index / wheel direction
//! ```

use super::event::{MouseAction, MouseButton, MouseEvent};
use crate::geometry::Point;
use bitflags::bitflags;

bitflags! {
    /// Bit layout of the SGR `Cb` field.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct ButtonCode: u32 {
        /// Button index, or wheel direction when `WHEEL` is set.
        const BUTTON_MASK = 0b0000_0011;
        const SHIFT       = 1 << 2;
        const ALT         = 1 << 3;
        const CTRL        = 1 << 4;
        const MOTION      = 1 << 5;
        const WHEEL       = 1 << 6;
    }
}

impl ButtonCode {
    /// The two low bits.
    #[must_use]
    pub const fn low_bits(self) -> u32 {
        self.bits() & Self::BUTTON_MASK.bits()
    }

    /// Encode the button/modifier state of a decoded event.
    #[must_use]
    pub fn from_event(event: &MouseEvent) -> Self {
        let mut code = match event.action {
            MouseAction::WheelUp => Self::WHEEL,
            MouseAction::WheelDown => Self::WHEEL | Self::from_bits_retain(1),
            MouseAction::Motion => Self::MOTION | Self::from_bits_retain(event.button.index()),
            MouseAction::Press | MouseAction::Release => {
                Self::from_bits_retain(event.button.index())
            }
        };
        code.set(Self::SHIFT, event.shift);
        code.set(Self::ALT, event.alt);
        code.set(Self::CTRL, event.ctrl);
        code
    }
}

/// Whether a complete control sequence is an SGR mouse report.
#[must_use]
pub fn is_sgr_mouse(sequence: &[u8]) -> bool {
    sequence.len() > super::CSI.len() + 1
        && sequence.starts_with(super::CSI)
        && sequence[super::CSI.len()] == b'<'
        && matches!(sequence.last(), Some(b'M' | b'm'))
}

/// Decode an SGR mouse payload.
///
/// `payload` is the sequence without `ESC [` and without the terminator; a
/// leading `<` is accepted. `terminator` is `M` (press, motion, wheel) or `m`
/// (release). A payload without exactly three numeric fields yields an event
/// with every field zeroed.
#[must_use]
pub fn decode_sgr(payload: &[u8], terminator: u8) -> MouseEvent {
    let payload = payload.strip_prefix(b"<").unwrap_or(payload);
    let Some((code, column, row)) = parse_fields(payload) else {
        return MouseEvent::default();
    };
    decode_fields(ButtonCode::from_bits_retain(code), Point::new(column, row), terminator)
}

/// Decode a whole `ESC [ < Cb ; Cx ; Cy (M|m)` report.
///
/// Returns `None` when `sequence` is not an SGR mouse report at all.
#[must_use]
pub fn decode_sgr_sequence(sequence: &[u8]) -> Option<MouseEvent> {
    let body = sequence.strip_prefix(super::CSI)?.strip_prefix(b"<")?;
    match body.split_last()? {
        (&terminator @ (b'M' | b'm'), payload) => Some(decode_sgr(payload, terminator)),
        _ => None,
    }
}

/// Apply the `Cb` decoding rules to already-split fields.
#[must_use]
pub fn decode_fields(code: ButtonCode, position: Point, terminator: u8) -> MouseEvent {
    let (action, button) = if code.contains(ButtonCode::WHEEL) {
        let action = if code.bits() & 1 != 0 {
            MouseAction::WheelDown
        } else {
            MouseAction::WheelUp
        };
        (action, MouseButton::None)
    } else if code.contains(ButtonCode::MOTION) {
        let index = code.bits() - ButtonCode::MOTION.bits();
        (MouseAction::Motion, MouseButton::from_index(index))
    } else {
        let action = if terminator == b'm' {
            MouseAction::Release
        } else {
            MouseAction::Press
        };
        (action, MouseButton::from_index(code.low_bits()))
    };

    MouseEvent::new(action, position, button).with_modifiers(
        code.contains(ButtonCode::SHIFT),
        code.contains(ButtonCode::CTRL),
        code.contains(ButtonCode::ALT),
    )
}

fn parse_fields(payload: &[u8]) -> Option<(u32, i32, i32)> {
    let text = std::str::from_utf8(payload).ok()?;
    let mut parts = text.split(';');
    let code = parts.next()?.parse().ok()?;
    let column = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((code, column, row))
}

/// Encode a mouse event as the SGR report a terminal would send.
#[must_use]
pub fn encode_sgr(event: &MouseEvent) -> Vec<u8> {
    let code = ButtonCode::from_event(event);
    let terminator = if event.action == MouseAction::Release {
        'm'
    } else {
        'M'
    };
    format!(
        "\x1b[<{};{};{}{terminator}",
        code.bits(),
        event.position.x,
        event.position.y
    )
    .into_bytes()
}
