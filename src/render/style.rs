//! Text styling: attributes and 256-colour palette indices.
//!
//! # Examples
//!
//! ```
//! use termframe::render::{Attr, Style};
//!
//! let title = Style::new(15, 4).with_attrs(Attr::BOLD);
//! assert_eq!(title.sgr(), "\x1b[0;1;38;5;15;44m");
//! ```

use bitflags::bitflags;
use std::fmt::Write as _;

bitflags! {
    /// Text rendering attributes.
    ///
    /// Bit `n` of the low nine bits maps to SGR parameter `n + 1`.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Attr: u16 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const RAPID_BLINK   = 1 << 5;
        const INVERSE       = 1 << 6;
        const HIDDEN        = 1 << 7;
        const STRIKETHROUGH = 1 << 8;
        /// Leave the terminal's default foreground untouched.
        const DEFAULT_FG    = 1 << 14;
        /// Leave the terminal's default background untouched.
        const DEFAULT_BG    = 1 << 15;
    }
}

impl Attr {
    /// Attributes that map to SGR parameters.
    pub const SGR_MASK: Self = Self::from_bits_retain(0x01ff);
}

/// A complete span style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground palette index.
    pub fg: u8,
    /// Background palette index.
    pub bg: u8,
    pub attrs: Attr,
}

impl Style {
    /// Style using the terminal's default colours and no attributes.
    pub const PLAIN: Self = Self {
        fg: 0,
        bg: 0,
        attrs: Attr::DEFAULT_FG.union(Attr::DEFAULT_BG),
    };

    #[must_use]
    pub const fn new(fg: u8, bg: u8) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    #[must_use]
    pub const fn with_attrs(mut self, attrs: Attr) -> Self {
        self.attrs = self.attrs.union(attrs);
        self
    }

    /// The full SGR sequence for this style, starting from a reset.
    #[must_use]
    pub fn sgr(&self) -> String {
        let mut out = String::from("\x1b[0");
        for i in 0..9 {
            if self.attrs.bits() & (1 << i) != 0 {
                let _ = write!(out, ";{}", i + 1);
            }
        }
        if !self.attrs.contains(Attr::DEFAULT_FG) {
            push_color(&mut out, 3, self.fg);
        }
        if !self.attrs.contains(Attr::DEFAULT_BG) {
            push_color(&mut out, 4, self.bg);
        }
        out.push('m');
        out
    }
}

fn push_color(out: &mut String, base: u8, index: u8) {
    if index < 8 {
        let _ = write!(out, ";{base}{index}");
    } else {
        let _ = write!(out, ";{base}8;5;{index}");
    }
}
