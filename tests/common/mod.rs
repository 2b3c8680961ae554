#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Not every test binary uses every helper

use std::time::Instant;

use termframe::input::{Event, EventKind, MouseAction, MouseButton, MouseEvent, encode_sgr};
use termframe::{LogLevel, Point, set_log_callback};
use tracing::Level;

/// Route test diagnostics and the crate's log callback through `tracing`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();

    set_log_callback(|level, message| match level {
        LogLevel::Debug => tracing::debug!(target: "termframe", "{message}"),
        LogLevel::Info => tracing::info!(target: "termframe", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "termframe", "{message}"),
        LogLevel::Error => tracing::error!(target: "termframe", "{message}"),
    });
}

/// Owned copy of an event, comparable across parses.
pub type OwnedEvent = (EventKind, Vec<u8>);

pub fn owned(events: &[Event<'_>]) -> Vec<OwnedEvent> {
    events.iter().map(Event::to_owned_raw).collect()
}

/// Feed `input` to an event parser in the given chunks, the way successive
/// ticks would. Returns the events and whatever is still pending.
pub fn parse_in_chunks(input: &[u8], cuts: &[usize]) -> (Vec<OwnedEvent>, Vec<u8>) {
    let now = Instant::now();
    let mut pending: Vec<u8> = Vec::new();
    let mut out = Vec::new();
    let mut start = 0;

    let mut bounds: Vec<usize> = cuts.iter().copied().filter(|&c| c <= input.len()).collect();
    bounds.sort_unstable();
    bounds.push(input.len());

    for end in bounds {
        if end < start {
            continue;
        }
        pending.extend_from_slice(&input[start..end]);
        start = end;
        let (events, leftover) = termframe::parse_events(&pending, now);
        out.extend(owned(&events));
        pending = leftover.to_vec();
    }

    (out, pending)
}

pub fn click(x: i32, y: i32) -> Vec<u8> {
    encode_sgr(&MouseEvent::new(
        MouseAction::Press,
        Point::new(x, y),
        MouseButton::Primary,
    ))
}

pub fn release(x: i32, y: i32) -> Vec<u8> {
    encode_sgr(&MouseEvent::new(
        MouseAction::Release,
        Point::new(x, y),
        MouseButton::Primary,
    ))
}
