//! Fuzz target for the terminal input parser.
//!
//! Input comes straight from the terminal device, so no byte sequence may
//! panic the parser or stall it.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::time::Instant;
use termframe::input::EventParser;

fuzz_target!(|data: &[u8]| {
    let now = Instant::now();

    // Feed the input in two ticks, split at a data-dependent point.
    let cut = data.first().map_or(0, |&b| usize::from(b) % (data.len() + 1));
    let (first, second) = data.split_at(cut);

    let (events, leftover) = EventParser::new().parse(first, now);
    let used: usize = events.iter().map(|e| e.raw.len()).sum();
    assert!(used + leftover.len() <= first.len());

    let mut pending = leftover.to_vec();
    pending.extend_from_slice(second);
    let (_, leftover) = EventParser::new().parse(&pending, now);
    assert!(pending.ends_with(leftover));

    // Once input goes quiet only an unterminated control sequence may stay.
    let (_, rest) = EventParser::new().idle(true).parse(leftover, now);
    assert!(rest.is_empty() || rest == b"\x1b" || rest.starts_with(b"\x1b["));
});
