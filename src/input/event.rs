//! Terminal event types.

use crate::geometry::Point;
use std::fmt;
use std::time::Instant;

/// Mouse action reported by the SGR mouse protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// Button pressed.
    #[default]
    Press,
    /// All buttons released.
    ///
    /// The terminal sends a single release even when several buttons were
    /// down, and nothing further until every button is up, so one release
    /// always means "no buttons held".
    Release,
    /// Pointer moved (with or without a button held).
    Motion,
    /// Scroll wheel up.
    WheelUp,
    /// Scroll wheel down.
    WheelDown,
}

impl MouseAction {
    /// Whether this is a wheel action.
    #[must_use]
    pub const fn is_wheel(self) -> bool {
        matches!(self, Self::WheelUp | Self::WheelDown)
    }
}

impl fmt::Display for MouseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Press => "press",
            Self::Release => "release",
            Self::Motion => "motion",
            Self::WheelUp => "wheel_up",
            Self::WheelDown => "wheel_down",
        })
    }
}

/// Mouse button, in SGR button-index order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button (index 0).
    #[default]
    Primary,
    /// Middle button (index 1).
    Middle,
    /// Right button (index 2).
    Secondary,
    /// No button identity (index 3, and every wheel event).
    None,
}

impl MouseButton {
    /// Map the two low button-index bits to a button.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        match index & 0b11 {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::None,
        }
    }

    /// The two-bit button index.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Primary => 0,
            Self::Middle => 1,
            Self::Secondary => 2,
            Self::None => 3,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "left",
            Self::Middle => "middle",
            Self::Secondary => "right",
            Self::None => "no_button",
        })
    }
}

/// A decoded mouse report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub action: MouseAction,
    /// 1-based (column, row).
    pub position: Point,
    pub button: MouseButton,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl MouseEvent {
    /// Create a mouse event without modifiers.
    #[must_use]
    pub const fn new(action: MouseAction, position: Point, button: MouseButton) -> Self {
        Self {
            action,
            position,
            button,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    /// Set modifier keys.
    #[must_use]
    pub const fn with_modifiers(mut self, shift: bool, ctrl: bool, alt: bool) -> Self {
        self.shift = shift;
        self.ctrl = ctrl;
        self.alt = alt;
        self
    }
}

/// What an [`Event`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A single decoded code point.
    ///
    /// Control sequences that are not mouse reports (arrow keys, function
    /// keys) are delivered as `Keyboard { key: '\0' }`; inspect
    /// [`Event::control_sequence`] for their bytes.
    Keyboard { key: char },
    /// A mouse report.
    Mouse(MouseEvent),
}

/// One input occurrence.
///
/// `raw` borrows the tick's capture snapshot, so events are only valid for the
/// duration of the frame callback that receives them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event<'a> {
    pub kind: EventKind,
    /// Exact bytes that produced this event.
    pub raw: &'a [u8],
    /// When the event was parsed (not device time).
    pub timestamp: Instant,
}

impl<'a> Event<'a> {
    /// Create a keyboard event.
    #[must_use]
    pub const fn key(key: char, raw: &'a [u8], timestamp: Instant) -> Self {
        Self {
            kind: EventKind::Keyboard { key },
            raw,
            timestamp,
        }
    }

    /// Create a mouse event.
    #[must_use]
    pub const fn mouse(mouse: MouseEvent, raw: &'a [u8], timestamp: Instant) -> Self {
        Self {
            kind: EventKind::Mouse(mouse),
            raw,
            timestamp,
        }
    }

    /// Check if this is a keyboard event.
    #[must_use]
    pub fn is_keyboard(&self) -> bool {
        matches!(self.kind, EventKind::Keyboard { .. })
    }

    /// Check if this is a mouse event.
    #[must_use]
    pub fn is_mouse(&self) -> bool {
        matches!(self.kind, EventKind::Mouse(_))
    }

    /// Get the key if this is a keyboard event.
    #[must_use]
    pub fn key_char(&self) -> Option<char> {
        match self.kind {
            EventKind::Keyboard { key } => Some(key),
            EventKind::Mouse(_) => None,
        }
    }

    /// Get the mouse report if this is a mouse event.
    #[must_use]
    pub fn mouse_event(&self) -> Option<&MouseEvent> {
        match &self.kind {
            EventKind::Mouse(m) => Some(m),
            EventKind::Keyboard { .. } => None,
        }
    }

    /// Bytes of a non-mouse control sequence delivered as a keyboard event.
    #[must_use]
    pub fn control_sequence(&self) -> Option<&'a [u8]> {
        match self.kind {
            EventKind::Keyboard { .. } if self.raw.starts_with(super::CSI) => Some(self.raw),
            _ => None,
        }
    }

    /// Display name of a control key.
    ///
    /// `None` for printable keys, mouse events and control sequences, which
    /// carry key `'\0'` and would otherwise read as Ctrl-Space.
    #[must_use]
    pub fn key_name(&self) -> Option<&'static str> {
        if self.control_sequence().is_some() {
            return None;
        }
        self.key_char().and_then(super::keys::key_name)
    }

    /// Same event with its `raw` bytes copied into an owned buffer.
    #[must_use]
    pub fn to_owned_raw(&self) -> (EventKind, Vec<u8>) {
        (self.kind, self.raw.to_vec())
    }
}
