//! Taking over a real terminal for the lifetime of a frame loop.
//!
//! # Examples
//!
//! ```no_run
//! use termframe::{EventLoop, LoopOptions};
//!
//! let app = EventLoop::start(LoopOptions::default())?;
//! let stop = app.stop_handle();
//! app.run(move |events, frame| {
//!     for event in events {
//!         if event.key_char() == Some('q') {
//!             stop.stop();
//!         }
//!     }
//!     frame.write_str("press q to quit");
//! })?;
//! # Ok::<(), termframe::Error>(())
//! ```

use crate::capture::{CaptureBuffer, InputCapture};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::input::Event;
use crate::render::FrameBuffer;
use crate::scheduler::{FrameScheduler, LoopOptions, LoopStats, StopHandle};
use crate::sentinel::StreamRedirect;
use crate::terminal::{Terminal, is_tty};
use std::fs::File;
use std::io;

/// A running terminal session.
///
/// Setup order: stream redirect, terminal modes, input capture. Teardown runs
/// in reverse, either from [`run`](Self::run) or on drop.
pub struct EventLoop {
    // Field order is drop order.
    scheduler: FrameScheduler<File>,
    capture: Option<InputCapture>,
    terminal: Terminal<File>,
    redirect: StreamRedirect,
}

impl EventLoop {
    /// Redirect the standard streams, set up the terminal and start capturing
    /// input.
    pub fn start(options: LoopOptions) -> Result<Self> {
        options.validate()?;
        if options.require_tty && !(is_tty(&io::stdin()) && is_tty(&io::stdout())) {
            return Err(Error::NotATerminal);
        }

        let redirect = StreamRedirect::install(&options.stdout_path, &options.stderr_path)?;
        let mut terminal = Terminal::new(redirect.terminal()?);

        if options.raw_mode {
            if let Err(e) = terminal.enter_raw_mode() {
                if options.require_tty {
                    return Err(e.into());
                }
                emit_log(LogLevel::Warn, &format!("raw mode unavailable: {e}"));
            }
        }
        if options.alt_screen {
            terminal.enter_alt_screen()?;
        }
        if options.hide_cursor {
            terminal.hide_cursor()?;
        }
        if options.enable_mouse {
            terminal.enable_mouse()?;
        }
        terminal.flush()?;

        let buffer = CaptureBuffer::new();
        let capture = InputCapture::stdin(buffer.clone())?;
        let scheduler = FrameScheduler::new(redirect.terminal()?, buffer, &options)?
            .with_sentinel(redirect.sentinel()?);

        emit_log(
            LogLevel::Info,
            &format!(
                "event loop started: fps={} stdout={} stderr={}",
                options.fps,
                options.stdout_path.display(),
                options.stderr_path.display()
            ),
        );

        Ok(Self {
            scheduler,
            capture: Some(capture),
            terminal,
            redirect,
        })
    }

    /// Handle that makes [`run`](Self::run) return after the current tick.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.scheduler.stop_handle()
    }

    /// Run the frame loop until stopped, then restore the terminal and the
    /// standard streams.
    pub fn run<F>(mut self, frame_fn: F) -> Result<LoopStats>
    where
        F: FnMut(&[Event<'_>], &mut FrameBuffer),
    {
        self.scheduler.run(frame_fn);
        let stats = self.scheduler.stats().clone();
        self.teardown()?;

        emit_log(
            LogLevel::Info,
            &format!(
                "event loop stopped: ticks={} flushes={} events={} write_errors={}",
                stats.ticks, stats.flushes, stats.events, stats.write_errors
            ),
        );
        Ok(stats)
    }

    fn teardown(&mut self) -> Result<()> {
        if let Some(capture) = self.capture.take() {
            capture.shutdown();
        }
        self.terminal.cleanup()?;
        self.redirect.restore()?;
        Ok(())
    }
}

/// Take over the terminal and tick at `fps` until the stop handle passed to
/// `frame_fn` fires.
pub fn run_event_loop<F>(fps: u32, mut frame_fn: F) -> Result<LoopStats>
where
    F: FnMut(&[Event<'_>], &mut FrameBuffer, &StopHandle),
{
    let app = EventLoop::start(LoopOptions::with_fps(fps))?;
    let stop = app.stop_handle();
    app.run(move |events, frame| frame_fn(events, frame, &stop))
}
