//! Asynchronous capture of raw terminal input.
//!
//! [`InputCapture`] owns one background thread. The input descriptor is put
//! in non-blocking, signal-driven mode (`O_NONBLOCK | O_ASYNC`, owner = this
//! process) so the kernel raises `SIGIO` whenever bytes become readable. The
//! thread sleeps until that signal arrives, reads everything available and
//! appends it to a shared [`CaptureBuffer`]. Parsing happens elsewhere.
//!
//! The buffer has no upper bound: input is drained every tick and a terminal
//! cannot outpace that for long, so bounding it is intentionally not done.
//!
//! # Safety
//! This module uses unsafe code for `fcntl`, `getpid` and `read` FFI calls.

#![allow(unsafe_code)]

use crate::event::{LogLevel, emit_log};
use signal_hook::iterator::{Handle, Signals};
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Size of a single read from the input device.
pub const CHUNK_SIZE: usize = 4096;

/// Shared byte accumulator between the capture thread and the frame loop.
///
/// The producer only appends; the consumer drains everything at once. The
/// lock is held just long enough to copy bytes in or out.
#[derive(Clone, Debug, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A Vec<u8> stays usable even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append captured bytes.
    pub fn append(&self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.lock().extend_from_slice(bytes);
        }
    }

    /// Move all buffered bytes onto the end of `out`. Returns how many moved.
    ///
    /// The buffer keeps its allocation.
    pub fn drain_into(&self, out: &mut Vec<u8>) -> usize {
        let mut guard = self.lock();
        let n = guard.len();
        out.extend_from_slice(&guard);
        guard.clear();
        n
    }

    /// Put bytes back in front of anything captured since they were drained.
    pub fn requeue_front(&self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.lock().splice(0..0, bytes.iter().copied());
        }
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Background reader feeding a [`CaptureBuffer`].
///
/// Dropping it stops the thread and restores the descriptor's original flags.
pub struct InputCapture {
    buffer: CaptureBuffer,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl InputCapture {
    /// Start capturing from standard input.
    pub fn stdin(buffer: CaptureBuffer) -> io::Result<Self> {
        Self::spawn(io::stdin(), buffer)
    }

    /// Start capturing from `source`.
    ///
    /// The source is moved into the reader thread and kept open until the
    /// capture stops.
    pub fn spawn<S>(source: S, buffer: CaptureBuffer) -> io::Result<Self>
    where
        S: AsRawFd + Send + 'static,
    {
        // Register before enabling O_ASYNC: SIGIO's default action kills the process.
        let mut signals = Signals::new([libc::SIGIO]).map_err(io::Error::other)?;
        let handle = signals.handle();

        let fd = source.as_raw_fd();
        let original_flags = enable_async_io(fd)?;

        let sink = buffer.clone();
        let thread = thread::Builder::new()
            .name("termframe-input".to_string())
            .spawn(move || {
                let mut chunk = vec![0u8; CHUNK_SIZE];
                // Bytes that arrived before O_ASYNC was set raise no signal.
                read_logged(fd, &mut chunk, &sink);
                for _ in signals.forever() {
                    read_logged(fd, &mut chunk, &sink);
                }
                let _ = set_flags(fd, original_flags);
                drop(source);
            });

        let thread = match thread {
            Ok(thread) => thread,
            Err(e) => {
                handle.close();
                let _ = set_flags(fd, original_flags);
                return Err(e);
            }
        };

        Ok(Self {
            buffer,
            handle,
            thread: Some(thread),
        })
    }

    /// The buffer this capture appends to.
    #[must_use]
    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    /// Stop the reader thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_logged(fd: RawFd, chunk: &mut [u8], sink: &CaptureBuffer) {
    // A failing device just stops producing input.
    if let Err(e) = read_available(fd, chunk, sink) {
        emit_log(LogLevel::Debug, &format!("input read failed: {e}"));
    }
}

/// Read until the descriptor would block, appending each chunk to `sink`.
///
/// Returns the number of bytes read. End of file counts as "nothing more".
pub fn read_available(fd: RawFd, chunk: &mut [u8], sink: &CaptureBuffer) -> io::Result<usize> {
    let mut total = 0;
    loop {
        // SAFETY: chunk is a valid writable buffer of chunk.len() bytes.
        let n = unsafe { libc::read(fd, chunk.as_mut_ptr().cast(), chunk.len()) };
        if n > 0 {
            let n = n as usize;
            sink.append(&chunk[..n]);
            total += n;
            continue;
        }
        if n == 0 {
            return Ok(total);
        }
        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::WouldBlock => return Ok(total),
            io::ErrorKind::Interrupted => {}
            _ => return Err(err),
        }
    }
}

/// Switch `fd` to non-blocking, SIGIO-notified mode. Returns the old flags.
fn enable_async_io(fd: RawFd) -> io::Result<libc::c_int> {
    // SAFETY: F_GETFL takes no argument and only reads descriptor state.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: getpid cannot fail; F_SETOWN takes an int pid.
    let owner = unsafe { libc::fcntl(fd, libc::F_SETOWN, libc::getpid()) };
    if owner == -1 {
        return Err(io::Error::last_os_error());
    }
    set_flags(fd, flags | libc::O_NONBLOCK | libc::O_ASYNC)?;
    Ok(flags)
}

fn set_flags(fd: RawFd, flags: libc::c_int) -> io::Result<()> {
    // SAFETY: F_SETFL takes an int flag set.
    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags) };
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
