//! Fixed-rate frame loop.
//!
//! Each tick the [`FrameScheduler`]:
//!
//! 1. refreshes the terminal size,
//! 2. drains everything the capture thread buffered since the last tick,
//! 3. parses the drained bytes (plus any leftover from the previous tick)
//!    into events,
//! 4. resets the [`FrameBuffer`] and hands it to the frame callback together
//!    with the events,
//! 5. decides whether to flush,
//! 6. writes the frame to the terminal if so,
//! 7. keeps a copy of the frame for the next comparison.
//!
//! A frame is flushed when its bytes differ from the previous frame, when the
//! [`CorruptionSentinel`] saw a stray write to the redirected streams, or when
//! nothing has been written for longer than the force-flush interval.

use crate::capture::CaptureBuffer;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::geometry::TerminalSize;
use crate::input::{Event, EventParser};
use crate::render::FrameBuffer;
use crate::sentinel::{CorruptionSentinel, STDERR_BACKING, STDOUT_BACKING};
use crate::terminal::terminal_size;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Frames per second used when none is configured.
pub const DEFAULT_FPS: u32 = 60;
/// Highest accepted frames-per-second.
pub const MAX_FPS: u32 = 1000;
/// Longest time the terminal goes without a repaint.
pub const FORCE_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Event loop configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopOptions {
    /// Ticks per second.
    pub fps: u32,
    /// Repaint at least this often even if nothing changed.
    pub force_flush_interval: Duration,
    /// Backing file for the redirected standard output.
    pub stdout_path: PathBuf,
    /// Backing file for the redirected standard error.
    pub stderr_path: PathBuf,
    /// Use the alternate screen buffer.
    pub alt_screen: bool,
    /// Hide the cursor while running.
    pub hide_cursor: bool,
    /// Enable SGR mouse reporting.
    pub enable_mouse: bool,
    /// Put the input terminal in raw mode.
    pub raw_mode: bool,
    /// Refuse to start unless stdin and stdout are terminals.
    pub require_tty: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            force_flush_interval: FORCE_FLUSH_INTERVAL,
            stdout_path: PathBuf::from(STDOUT_BACKING),
            stderr_path: PathBuf::from(STDERR_BACKING),
            alt_screen: true,
            hide_cursor: true,
            enable_mouse: true,
            raw_mode: true,
            require_tty: false,
        }
    }
}

impl LoopOptions {
    /// Options with the given frame rate and everything else defaulted.
    #[must_use]
    pub fn with_fps(fps: u32) -> Self {
        Self {
            fps,
            ..Self::default()
        }
    }

    /// Reject a frame rate outside `1..=1000`.
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(Error::InvalidFps(self.fps));
        }
        Ok(())
    }

    /// Time between ticks, `1000 / fps` whole milliseconds.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(1000 / self.fps.max(1)))
    }
}

/// Why a frame was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlushReason {
    /// Nothing has been written yet.
    FirstFrame,
    /// The frame differs from the previous one.
    ContentChanged,
    /// Something wrote to the redirected output streams.
    ExternalWrite,
    /// The force-flush interval elapsed.
    ForceInterval,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstFrame => "first_frame",
            Self::ContentChanged => "content_changed",
            Self::ExternalWrite => "external_write",
            Self::ForceInterval => "force_interval",
        };
        f.write_str(name)
    }
}

/// Loop counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub flushes: u64,
    pub events: u64,
    /// Terminal writes that failed and were retried on a later tick.
    pub write_errors: u64,
    pub last_flush_reason: Option<FlushReason>,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Events handed to the frame callback.
    pub events: usize,
    /// Bytes kept back for the next tick.
    pub leftover: usize,
    /// Set when the frame was written to the terminal.
    pub flushed: Option<FlushReason>,
}

/// Asks a running loop to return after its current tick.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

type SizeProbe = Box<dyn FnMut() -> io::Result<TerminalSize> + Send>;

/// Drives the tick cycle against a terminal writer.
pub struct FrameScheduler<W: Write> {
    output: W,
    capture: CaptureBuffer,
    sentinel: Option<CorruptionSentinel>,
    size_probe: SizeProbe,
    size: TerminalSize,
    size_probe_failing: bool,
    tick_interval: Duration,
    force_flush_interval: Duration,
    /// Leftover from the previous tick followed by freshly drained bytes.
    snapshot: Vec<u8>,
    frame: FrameBuffer,
    prev_frame: Vec<u8>,
    last_flush: Option<Instant>,
    stop: StopHandle,
    stats: LoopStats,
}

impl<W: Write> FrameScheduler<W> {
    /// Create a scheduler writing frames to `output` and reading input from
    /// `capture`.
    pub fn new(output: W, capture: CaptureBuffer, options: &LoopOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            output,
            capture,
            sentinel: None,
            size_probe: Box::new(terminal_size),
            size: TerminalSize::default(),
            size_probe_failing: false,
            tick_interval: options.tick_interval(),
            force_flush_interval: options.force_flush_interval,
            snapshot: Vec::new(),
            frame: FrameBuffer::new(),
            prev_frame: Vec::new(),
            last_flush: None,
            stop: StopHandle::new(),
            stats: LoopStats::default(),
        })
    }

    /// Watch the redirected streams for stray writes.
    #[must_use]
    pub fn with_sentinel(mut self, sentinel: CorruptionSentinel) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Replace the terminal size query.
    #[must_use]
    pub fn with_size_probe<F>(mut self, probe: F) -> Self
    where
        F: FnMut() -> io::Result<TerminalSize> + Send + 'static,
    {
        self.size_probe = Box::new(probe);
        self
    }

    /// Handle that ends [`run`](Self::run) after the current tick.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[must_use]
    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Terminal size as of the last tick.
    #[must_use]
    pub const fn size(&self) -> TerminalSize {
        self.size
    }

    /// The terminal writer.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Run one tick at time `now`.
    ///
    /// Only a failed terminal write is reported; the frame is then retried on
    /// the next tick.
    pub fn tick<F>(&mut self, now: Instant, frame_fn: &mut F) -> io::Result<TickReport>
    where
        F: FnMut(&[Event<'_>], &mut FrameBuffer),
    {
        // Log only the first failure: log lines land in the watched stderr file.
        match (self.size_probe)() {
            Ok(size) => {
                self.size = size;
                self.size_probe_failing = false;
            }
            Err(e) => {
                if !self.size_probe_failing {
                    emit_log(LogLevel::Debug, &format!("terminal size unavailable: {e}"));
                }
                self.size_probe_failing = true;
            }
        }
        self.frame.set_size(self.size);

        let fresh = self.capture.drain_into(&mut self.snapshot);
        let parser = EventParser::new().idle(fresh == 0);

        let mut events = Vec::new();
        let consumed = parser.parse_into(&self.snapshot, now, &mut events);
        let event_count = events.len();

        self.frame.begin_frame();
        frame_fn(&events, &mut self.frame);
        drop(events);
        self.snapshot.drain(..consumed);

        self.stats.ticks += 1;
        self.stats.events += event_count as u64;

        let reason = self.flush_reason(now);
        if let Some(reason) = reason {
            if let Err(e) = self.write_frame() {
                self.prev_frame.clear();
                self.stats.write_errors += 1;
                return Err(e);
            }
            self.last_flush = Some(now);
            self.stats.flushes += 1;
            self.stats.last_flush_reason = Some(reason);
        }
        if let Some(sentinel) = &mut self.sentinel {
            sentinel.record();
        }

        self.prev_frame.clear();
        self.prev_frame.extend_from_slice(self.frame.as_bytes());

        Ok(TickReport {
            events: event_count,
            leftover: self.snapshot.len(),
            flushed: reason,
        })
    }

    fn flush_reason(&self, now: Instant) -> Option<FlushReason> {
        let Some(last) = self.last_flush else {
            return Some(FlushReason::FirstFrame);
        };
        if self.frame.as_bytes() != self.prev_frame.as_slice() {
            Some(FlushReason::ContentChanged)
        } else if self.sentinel.as_ref().is_some_and(CorruptionSentinel::check) {
            Some(FlushReason::ExternalWrite)
        } else if now.saturating_duration_since(last) > self.force_flush_interval {
            Some(FlushReason::ForceInterval)
        } else {
            None
        }
    }

    fn write_frame(&mut self) -> io::Result<()> {
        self.output.write_all(self.frame.as_bytes())?;
        self.output.flush()
    }

    /// Tick at the configured rate until the stop handle fires.
    ///
    /// Missed ticks are dropped rather than run back to back. A failed
    /// terminal write is logged and the loop keeps going; the next tick
    /// writes the frame again.
    pub fn run<F>(&mut self, mut frame_fn: F)
    where
        F: FnMut(&[Event<'_>], &mut FrameBuffer),
    {
        let mut deadline = Instant::now();
        while !self.stop.is_stopped() {
            if let Err(e) = self.tick(Instant::now(), &mut frame_fn) {
                emit_log(LogLevel::Warn, &format!("terminal write failed: {e}"));
            }

            deadline += self.tick_interval;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                deadline = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EventKind;

    fn scheduler(capture: &CaptureBuffer) -> FrameScheduler<Vec<u8>> {
        FrameScheduler::new(Vec::new(), capture.clone(), &LoopOptions::default())
            .unwrap()
            .with_size_probe(|| Ok(TerminalSize::new(80, 24)))
    }

    fn draw(text: &'static str) -> impl FnMut(&[Event<'_>], &mut FrameBuffer) {
        move |_, frame| frame.write_str(text)
    }

    // ============================================
    // Options
    // ============================================

    #[test]
    fn test_default_options() {
        let options = LoopOptions::default();
        assert_eq!(options.fps, 60);
        assert_eq!(options.force_flush_interval, Duration::from_secs(1));
        assert_eq!(options.stdout_path, PathBuf::from(".stdout"));
        assert_eq!(options.stderr_path, PathBuf::from(".stderr"));
        assert!(options.alt_screen && options.raw_mode && options.enable_mouse);
        assert!(!options.require_tty);
    }

    #[test]
    fn test_tick_interval_integer_division() {
        assert_eq!(LoopOptions::with_fps(60).tick_interval(), Duration::from_millis(16));
        assert_eq!(LoopOptions::with_fps(30).tick_interval(), Duration::from_millis(33));
        assert_eq!(LoopOptions::with_fps(1000).tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_validate_rejects_bad_fps() {
        assert!(matches!(
            LoopOptions::with_fps(0).validate(),
            Err(Error::InvalidFps(0))
        ));
        assert!(matches!(
            LoopOptions::with_fps(1001).validate(),
            Err(Error::InvalidFps(1001))
        ));
        assert!(LoopOptions::with_fps(1).validate().is_ok());

        let capture = CaptureBuffer::new();
        assert!(FrameScheduler::new(Vec::new(), capture, &LoopOptions::with_fps(0)).is_err());
    }

    // ============================================
    // Flush decisions
    // ============================================

    #[test]
    fn test_first_tick_always_flushes() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        let report = sched.tick(Instant::now(), &mut draw("hi")).unwrap();
        assert_eq!(report.flushed, Some(FlushReason::FirstFrame));
        assert_eq!(sched.output(), b"\x1b[2J\x1b[1;1Hhi");
    }

    #[test]
    fn test_identical_frames_not_rewritten() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        let start = Instant::now();
        let mut f = draw("same");
        sched.tick(start, &mut f).unwrap();
        let written = sched.output().len();

        for i in 1..=10 {
            let report = sched.tick(start + Duration::from_millis(16 * i), &mut f).unwrap();
            assert_eq!(report.flushed, None);
        }
        assert_eq!(sched.output().len(), written);
        assert_eq!(sched.stats().flushes, 1);
        assert_eq!(sched.stats().ticks, 11);
    }

    #[test]
    fn test_force_flush_after_interval() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        let start = Instant::now();
        let mut f = draw("same");
        sched.tick(start, &mut f).unwrap();

        let report = sched.tick(start + Duration::from_secs(1), &mut f).unwrap();
        assert_eq!(report.flushed, None, "interval must be exceeded, not just reached");

        let report = sched
            .tick(start + Duration::from_millis(1001), &mut f)
            .unwrap();
        assert_eq!(report.flushed, Some(FlushReason::ForceInterval));

        let report = sched
            .tick(start + Duration::from_millis(1017), &mut f)
            .unwrap();
        assert_eq!(report.flushed, None);
    }

    #[test]
    fn test_changed_content_flushes() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        let start = Instant::now();
        sched.tick(start, &mut draw("one")).unwrap();
        let report = sched
            .tick(start + Duration::from_millis(16), &mut draw("two"))
            .unwrap();
        assert_eq!(report.flushed, Some(FlushReason::ContentChanged));
        assert!(sched.output().ends_with(b"two"));
        assert_eq!(sched.stats().last_flush_reason, Some(FlushReason::ContentChanged));
    }

    #[test]
    fn test_failed_write_retried_next_tick() {
        struct Flaky {
            fail: bool,
            written: Vec<u8>,
        }
        impl Write for Flaky {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.fail {
                    return Err(io::Error::other("gone"));
                }
                self.written.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let capture = CaptureBuffer::new();
        let output = Flaky {
            fail: true,
            written: Vec::new(),
        };
        let mut sched = FrameScheduler::new(output, capture, &LoopOptions::default())
            .unwrap()
            .with_size_probe(|| Ok(TerminalSize::new(10, 5)));
        let start = Instant::now();
        let mut f = draw("x");
        assert!(sched.tick(start, &mut f).is_err());
        assert_eq!(sched.stats().write_errors, 1);

        sched.output.fail = false;
        let report = sched.tick(start + Duration::from_millis(16), &mut f).unwrap();
        assert!(report.flushed.is_some());
        assert!(sched.output().written.ends_with(b"x"));
    }

    #[test]
    fn test_run_keeps_ticking_after_would_block() {
        struct Busy {
            failures_left: usize,
            written: Vec<u8>,
        }
        impl Write for Busy {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.failures_left > 0 {
                    self.failures_left -= 1;
                    return Err(io::ErrorKind::WouldBlock.into());
                }
                self.written.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let output = Busy {
            failures_left: 1,
            written: Vec::new(),
        };
        let mut sched = FrameScheduler::new(output, CaptureBuffer::new(), &LoopOptions::with_fps(1000))
            .unwrap()
            .with_size_probe(|| Ok(TerminalSize::new(80, 24)));
        let stop = sched.stop_handle();
        let mut ticks = 0;
        sched.run(|_, frame| {
            ticks += 1;
            frame.write_str("frame");
            if ticks == 5 {
                stop.stop();
            }
        });

        let stats = sched.stats();
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.write_errors, 1);
        assert_eq!(stats.last_flush_reason, Some(FlushReason::FirstFrame));
        assert!(sched.output().written.ends_with(b"frame"));
    }

    // ============================================
    // Input flow
    // ============================================

    #[test]
    fn test_events_delivered_in_order() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        capture.append(b"ab\x1b[<0;3;4M");

        let mut seen = Vec::new();
        sched
            .tick(Instant::now(), &mut |events: &[Event<'_>], _: &mut FrameBuffer| {
                seen.extend(events.iter().map(|e| e.kind));
            })
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], EventKind::Keyboard { key: 'a' });
        assert_eq!(seen[1], EventKind::Keyboard { key: 'b' });
        assert!(matches!(seen[2], EventKind::Mouse(m) if m.position.x == 3 && m.position.y == 4));
        assert_eq!(sched.stats().events, 3);
    }

    #[test]
    fn test_sequence_split_across_ticks() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        let start = Instant::now();
        let mut raws: Vec<Vec<u8>> = Vec::new();
        let mut collect = |events: &[Event<'_>], _: &mut FrameBuffer| {
            raws.extend(events.iter().map(|e| e.raw.to_vec()));
        };

        capture.append(b"x\x1b[<0;1");
        let report = sched.tick(start, &mut collect).unwrap();
        assert_eq!(report.leftover, 6);

        capture.append(b"0;2Mz");
        let report = sched
            .tick(start + Duration::from_millis(16), &mut collect)
            .unwrap();
        assert_eq!(report.leftover, 0);

        assert_eq!(
            raws,
            vec![b"x".to_vec(), b"\x1b[<0;10;2M".to_vec(), b"z".to_vec()]
        );
    }

    #[test]
    fn test_lone_escape_delivered_when_input_goes_quiet() {
        let capture = CaptureBuffer::new();
        let mut sched = scheduler(&capture);
        let start = Instant::now();
        let mut keys = Vec::new();
        let mut collect = |events: &[Event<'_>], _: &mut FrameBuffer| {
            keys.extend(events.iter().filter_map(Event::key_char));
        };

        capture.append(b"\x1b");
        sched.tick(start, &mut collect).unwrap();
        sched
            .tick(start + Duration::from_millis(16), &mut collect)
            .unwrap();
        assert_eq!(keys, vec!['\x1b']);
    }

    #[test]
    fn test_size_probe_failure_keeps_last_size() {
        let capture = CaptureBuffer::new();
        let mut calls = 0;
        let mut sched = FrameScheduler::new(Vec::new(), capture, &LoopOptions::default())
            .unwrap()
            .with_size_probe(move || {
                calls += 1;
                if calls == 1 {
                    Ok(TerminalSize::new(100, 40))
                } else {
                    Err(io::Error::other("no tty"))
                }
            });
        let start = Instant::now();
        let mut sizes = Vec::new();
        let mut f = |_: &[Event<'_>], frame: &mut FrameBuffer| sizes.push(frame.size());
        sched.tick(start, &mut f).unwrap();
        sched.tick(start + Duration::from_millis(16), &mut f).unwrap();
        assert_eq!(sizes, vec![TerminalSize::new(100, 40); 2]);
    }

    #[test]
    fn test_size_probe_failure_state_tracks_transitions() {
        let capture = CaptureBuffer::new();
        let mut calls = 0;
        let mut sched = FrameScheduler::new(Vec::new(), capture, &LoopOptions::default())
            .unwrap()
            .with_size_probe(move || {
                calls += 1;
                if calls == 3 {
                    Ok(TerminalSize::new(20, 10))
                } else {
                    Err(io::Error::other("no tty"))
                }
            });
        let start = Instant::now();
        let mut f = draw("same");
        let mut failing = Vec::new();
        for i in 0..4u32 {
            sched.tick(start + Duration::from_millis(16) * i, &mut f).unwrap();
            failing.push(sched.size_probe_failing);
        }
        assert_eq!(failing, vec![true, true, false, true]);
        assert_eq!(sched.size(), TerminalSize::new(20, 10));
    }

    // ============================================
    // Stop handle
    // ============================================

    #[test]
    fn test_run_returns_after_stop() {
        let capture = CaptureBuffer::new();
        let mut sched = FrameScheduler::new(Vec::new(), capture, &LoopOptions::with_fps(1000))
            .unwrap()
            .with_size_probe(|| Ok(TerminalSize::new(80, 24)));
        let stop = sched.stop_handle();
        let mut ticks = 0;
        sched
            .run(|_, frame| {
                ticks += 1;
                frame.write_str("tick");
                if ticks == 3 {
                    stop.stop();
                }
            });
        assert_eq!(ticks, 3);
        assert_eq!(sched.stats().ticks, 3);
    }

    #[test]
    fn test_flush_reason_display() {
        assert_eq!(FlushReason::ExternalWrite.to_string(), "external_write");
        assert_eq!(FlushReason::FirstFrame.to_string(), "first_frame");
    }
}
