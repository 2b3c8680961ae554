//! Decode faults are skipped and reported through the log callback.
//!
//! Lives in its own binary because the log callback is process-wide.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use termframe::{LogLevel, clear_log_callback, parse_events, set_log_callback};

#[test]
fn interrupted_sequence_logged_once_as_warning() {
    let seen: Arc<Mutex<Vec<(LogLevel, String)>>> = Arc::default();
    let sink = Arc::clone(&seen);
    set_log_callback(move |level, message| {
        sink.lock().unwrap().push((level, message.to_string()));
    });

    let (events, leftover) = parse_events(b"\x1b[12\nx", Instant::now());
    clear_log_callback();

    let keys: Vec<char> = events.iter().filter_map(|e| e.key_char()).collect();
    assert_eq!(keys, vec!['\n', 'x']);
    assert!(leftover.is_empty());

    let seen = seen.lock().unwrap();
    let warnings: Vec<&String> = seen
        .iter()
        .filter(|(level, _)| *level == LogLevel::Warn)
        .map(|(_, message)| message)
        .collect();
    assert_eq!(warnings.len(), 1, "{seen:?}");
    assert!(warnings[0].contains("interrupted"), "{}", warnings[0]);
}
