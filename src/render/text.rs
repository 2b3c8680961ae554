//! Styled text model and width-aware trimming.

use super::style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A run of text with one style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    #[must_use]
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Span in the terminal's default style.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::PLAIN)
    }
}

/// One line of spans.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }
}

impl From<Span> for Line {
    fn from(span: Span) -> Self {
        Self { spans: vec![span] }
    }
}

/// Lines of styled text laid out top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledBlock {
    pub lines: Vec<Line>,
}

impl StyledBlock {
    #[must_use]
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<Line>) {
        self.lines.push(line.into());
    }
}

/// Result of [`trim_to_width`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trimmed<'a> {
    /// Leading part that fits.
    pub trimmed: &'a str,
    /// Rest of the input (empty when everything fit).
    pub tail: &'a str,
    /// Display width of `trimmed`.
    pub width: usize,
}

/// Cut `text` to at most `max_width` display columns on a grapheme boundary.
///
/// A wide grapheme that would straddle the limit goes to the tail.
#[must_use]
pub fn trim_to_width(text: &str, max_width: usize) -> Trimmed<'_> {
    let mut width = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let w = grapheme.width();
        if width + w > max_width {
            return Trimmed {
                trimmed: &text[..offset],
                tail: &text[offset..],
                width,
            };
        }
        width += w;
    }
    Trimmed {
        trimmed: text,
        tail: "",
        width,
    }
}

/// Escape sequences followed by the plain text up to the next escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSegment<'a> {
    pub control: &'a str,
    pub text: &'a str,
}

/// Split a line of raw (possibly ANSI-coloured) text into segments.
///
/// Control sequences occupy no columns and are always written; only the text
/// parts are subject to trimming.
#[must_use]
pub fn split_raw_segments(line: &str) -> Vec<RawSegment<'_>> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let control_start = pos;
        while pos < bytes.len() && bytes[pos] == 0x1b {
            pos += escape_len(&bytes[pos..]);
        }
        let text_start = pos;
        while pos < bytes.len() && bytes[pos] != 0x1b {
            pos += 1;
        }
        segments.push(RawSegment {
            control: &line[control_start..text_start],
            text: &line[text_start..pos],
        });
    }
    segments
}

/// Length of the escape sequence at the start of `bytes` (which begins with ESC).
fn escape_len(bytes: &[u8]) -> usize {
    match bytes.get(1) {
        Some(b'[') => bytes[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(bytes.len(), |i| i + 3),
        Some(b']') => {
            // OSC: terminated by BEL or ESC \
            let mut i = 2;
            while i < bytes.len() {
                match bytes[i] {
                    0x07 => return i + 1,
                    0x1b if bytes.get(i + 1) == Some(&b'\\') => return i + 2,
                    _ => i += 1,
                }
            }
            bytes.len()
        }
        Some(b) if b.is_ascii() => 2,
        _ => 1,
    }
}
