//! Protection against writes that bypass the frame buffer.
//!
//! While the loop runs, the process's standard output and standard error are
//! rebound to two backing files ([`StreamRedirect`]). Anything printed outside
//! the render path lands there instead of on the screen, and can be read with
//! `tail -f .stdout`. The real terminal is reached through a duplicate of the
//! original stdout descriptor.
//!
//! [`CorruptionSentinel`] watches the backing files. If either one was
//! modified since the last tick, something wrote to the streams and the
//! screen may already be damaged, so the next frame is flushed even if its
//! content did not change.
//!
//! # Safety
//! This module uses unsafe code for `dup`/`dup2` FFI calls.

#![allow(unsafe_code)]

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::path::Path;
use std::time::SystemTime;

/// Default backing file for standard output.
pub const STDOUT_BACKING: &str = ".stdout";
/// Default backing file for standard error.
pub const STDERR_BACKING: &str = ".stderr";

/// Observable modification state of a backing file.
///
/// The length is tracked next to the timestamp because file timestamps are
/// coarse: two appends within one clock tick share an mtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

fn stamp(file: &File) -> Option<Stamp> {
    let meta = file.metadata().ok()?;
    Some(Stamp {
        modified: meta.modified().ok()?,
        len: meta.len(),
    })
}

#[derive(Debug)]
struct Watched {
    file: File,
    last: Option<Stamp>,
}

impl Watched {
    fn changed(&self) -> bool {
        match stamp(&self.file) {
            Some(now) => self.last != Some(now),
            // Unreadable: nothing to compare against, say nothing.
            None => false,
        }
    }

    fn record(&mut self) {
        if let Some(now) = stamp(&self.file) {
            self.last = Some(now);
        }
    }
}

/// Detects external writes to the redirected streams.
#[derive(Debug)]
pub struct CorruptionSentinel {
    stdout: Watched,
    stderr: Watched,
}

impl CorruptionSentinel {
    /// Watch the given backing files.
    ///
    /// Nothing is recorded yet, so the first [`check`](Self::check) reports a
    /// change.
    #[must_use]
    pub fn new(stdout: File, stderr: File) -> Self {
        Self {
            stdout: Watched {
                file: stdout,
                last: None,
            },
            stderr: Watched {
                file: stderr,
                last: None,
            },
        }
    }

    /// Whether either backing file changed since the last [`record`](Self::record).
    #[must_use]
    pub fn check(&self) -> bool {
        self.stdout.changed() || self.stderr.changed()
    }

    /// Remember the current state of both files.
    ///
    /// Called after each flush decision. A write landing between the flush
    /// and this call goes unnoticed until the next forced flush.
    pub fn record(&mut self) {
        self.stdout.record();
        self.stderr.record();
    }
}

/// Standard output and error rebound to backing files.
///
/// [`restore`](Self::restore) (also run on drop) puts the original
/// descriptors back.
#[derive(Debug)]
pub struct StreamRedirect {
    saved_stdout: Option<OwnedFd>,
    saved_stderr: Option<OwnedFd>,
    stdout_file: File,
    stderr_file: File,
}

impl StreamRedirect {
    /// Create (truncating) the backing files and rebind fds 1 and 2 to them.
    pub fn install(stdout_path: &Path, stderr_path: &Path) -> Result<Self> {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        let stdout_file = File::create(stdout_path).map_err(|source| Error::Redirect {
            stream: "stdout",
            source,
        })?;
        let stderr_file = File::create(stderr_path).map_err(|source| Error::Redirect {
            stream: "stderr",
            source,
        })?;

        let saved_stdout = dup(libc::STDOUT_FILENO).map_err(|source| Error::Redirect {
            stream: "stdout",
            source,
        })?;
        let saved_stderr = dup(libc::STDERR_FILENO).map_err(|source| Error::Redirect {
            stream: "stderr",
            source,
        })?;

        dup2(stdout_file.as_raw_fd(), libc::STDOUT_FILENO).map_err(|source| Error::Redirect {
            stream: "stdout",
            source,
        })?;
        if let Err(source) = dup2(stderr_file.as_raw_fd(), libc::STDERR_FILENO) {
            let _ = dup2(saved_stdout.as_raw_fd(), libc::STDOUT_FILENO);
            return Err(Error::Redirect {
                stream: "stderr",
                source,
            });
        }

        Ok(Self {
            saved_stdout: Some(saved_stdout),
            saved_stderr: Some(saved_stderr),
            stdout_file,
            stderr_file,
        })
    }

    /// A writer for the real terminal (the original stdout).
    pub fn terminal(&self) -> io::Result<File> {
        let fd = self
            .saved_stdout
            .as_ref()
            .ok_or_else(|| io::Error::other("stream redirect already restored"))?;
        Ok(File::from(fd.try_clone()?))
    }

    /// A sentinel watching this redirect's backing files.
    pub fn sentinel(&self) -> io::Result<CorruptionSentinel> {
        Ok(CorruptionSentinel::new(
            self.stdout_file.try_clone()?,
            self.stderr_file.try_clone()?,
        ))
    }

    /// Rebind fds 1 and 2 to the original streams.
    pub fn restore(&mut self) -> io::Result<()> {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        if let Some(fd) = self.saved_stdout.take() {
            dup2(fd.as_raw_fd(), libc::STDOUT_FILENO)?;
        }
        if let Some(fd) = self.saved_stderr.take() {
            dup2(fd.as_raw_fd(), libc::STDERR_FILENO)?;
        }
        Ok(())
    }
}

impl Drop for StreamRedirect {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn dup(fd: RawFd) -> io::Result<OwnedFd> {
    // SAFETY: dup has no memory-safety preconditions.
    let new_fd = unsafe { libc::dup(fd) };
    if new_fd == -1 {
        Err(io::Error::last_os_error())
    } else {
        // SAFETY: dup returned a fresh descriptor that nothing else owns.
        Ok(unsafe { OwnedFd::from_raw_fd(new_fd) })
    }
}

fn dup2(src: RawFd, dst: RawFd) -> io::Result<()> {
    // SAFETY: dup2 has no memory-safety preconditions.
    if unsafe { libc::dup2(src, dst) } == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
