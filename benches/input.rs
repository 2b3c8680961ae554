//! Input parsing and frame loop benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Instant;
use termframe::input::{EventParser, decode_sgr, frame_next};
use termframe::{CaptureBuffer, FrameBuffer, FrameScheduler, LoopOptions, TerminalSize, parse_events};

/// Benchmark framing of single units.
fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");

    let units: &[(&[u8], &str)] = &[
        (b"a", "ascii"),
        ("é".as_bytes(), "two_byte_utf8"),
        ("🎉".as_bytes(), "four_byte_utf8"),
        (b"\x1b[A", "arrow_up"),
        (b"\x1b[1;5C", "ctrl_right"),
        (b"\x1b[15~", "f5"),
        (b"\x1b[<0;10;20M", "mouse_press"),
        (b"\x1b[<0;10;2", "incomplete_mouse"),
        (b"\x1b", "lone_escape"),
    ];

    for (unit, name) in units {
        group.bench_function(*name, |b| b.iter(|| frame_next(black_box(unit))));
    }

    group.finish();
}

/// Benchmark SGR payload decoding.
fn bench_mouse_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouse_decoding");

    let payloads: &[(&[u8], u8, &str)] = &[
        (b"<0;10;20", b'M', "button_press"),
        (b"<0;10;20", b'm', "button_release"),
        (b"<32;50;30", b'M', "mouse_move"),
        (b"<64;10;20", b'M', "scroll_up"),
        (b"<54;100;50", b'M', "drag_with_modifiers"),
        (b"<1;2", b'M', "malformed"),
    ];

    for (payload, terminator, name) in payloads {
        group.bench_function(*name, |b| {
            b.iter(|| decode_sgr(black_box(payload), *terminator))
        });
    }

    group.finish();
}

/// Benchmark parsing whole tick buffers.
fn bench_batch_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_parsing");
    let now = Instant::now();

    let keyboard_batch: Vec<u8> = (0..1000usize)
        .map(|i| b'a' + u8::try_from(i % 26).unwrap_or(0))
        .collect();
    group.throughput(Throughput::Bytes(keyboard_batch.len() as u64));
    group.bench_function("1000_chars", |b| {
        b.iter(|| parse_events(black_box(&keyboard_batch), now).0.len())
    });

    let mouse_batch: Vec<u8> = (0..200)
        .flat_map(|i| format!("\x1b[<32;{};10M", i % 200 + 1).into_bytes())
        .collect();
    group.throughput(Throughput::Bytes(mouse_batch.len() as u64));
    group.bench_function("200_mouse_moves", |b| {
        b.iter(|| parse_events(black_box(&mouse_batch), now).0.len())
    });

    let mut mixed: Vec<u8> = Vec::new();
    for _ in 0..100 {
        mixed.extend_from_slice(b"Hello\x1b[C\x1b[<0;4;4M\x1b[<0;4;4m");
        mixed.extend_from_slice("日本".as_bytes());
    }
    // Ends mid-sequence, like a tick that caught a report half-read.
    mixed.extend_from_slice(b"\x1b[<0;12");
    group.throughput(Throughput::Bytes(mixed.len() as u64));
    group.bench_function("mixed_with_leftover", |b| {
        b.iter(|| {
            let (events, leftover) = EventParser::new().parse(black_box(&mixed), now);
            (events.len(), leftover.len())
        })
    });

    group.finish();
}

/// Benchmark a full tick with unchanged output.
fn bench_tick(c: &mut Criterion) {
    let capture = CaptureBuffer::new();
    let Ok(scheduler) = FrameScheduler::new(Vec::new(), capture.clone(), &LoopOptions::default())
    else {
        return;
    };
    let mut scheduler = scheduler.with_size_probe(|| Ok(TerminalSize::new(120, 40)));
    let mut draw = |_: &[termframe::Event<'_>], frame: &mut FrameBuffer| {
        frame.render_raw_text(frame.screen(), "\x1b[1mtitle\x1b[0m\nbody line\nstatus");
    };
    let start = Instant::now();

    c.bench_function("tick_with_input_no_flush", |b| {
        b.iter(|| {
            capture.append(b"jk\x1b[<32;5;5M");
            scheduler.tick(start, &mut draw).map(|r| r.events)
        })
    });
}

criterion_group!(
    benches,
    bench_framing,
    bench_mouse_decoding,
    bench_batch_parsing,
    bench_tick
);
criterion_main!(benches);
