//! Raw mode terminal handling.
//!
//! Raw mode turns off line editing, echo and signal keys so every byte the
//! user types reaches the input decoder unchanged.
//!
//! # Safety
//! This module uses unsafe code for FFI calls to libc termios and ioctl
//! functions.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use crate::geometry::TerminalSize;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Saved terminal state, restored on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Put the terminal behind `fd` into raw mode.
    pub fn new<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let original = get_termios(fd)?;
        set_termios(fd, &make_raw(original))?;
        Ok(Self { fd, original })
    }

    /// Restore the saved state now.
    pub fn restore(&self) -> io::Result<()> {
        set_termios(self.fd, &self.original)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Raw-mode flags applied on top of `termios`, as `cfmakeraw` does.
#[must_use]
pub fn make_raw(mut t: libc::termios) -> libc::termios {
    t.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    t.c_cflag &= !(libc::CSIZE | libc::PARENB);
    t.c_cflag |= libc::CS8;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
    t
}

/// Enter raw mode for stdin.
pub fn enable_raw_mode() -> io::Result<RawModeGuard> {
    RawModeGuard::new(&io::stdin())
}

/// Check if the given file descriptor is a TTY.
#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty is safe to call with any fd
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Size of the terminal behind `fd`.
pub fn terminal_size_of(fd: RawFd) -> io::Result<TerminalSize> {
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };

    // SAFETY: ioctl with TIOCGWINSZ is safe when passed a valid winsize struct
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(TerminalSize::new(
            i32::from(size.ws_col),
            i32::from(size.ws_row),
        ))
    }
}

/// Size of the controlling terminal, queried through stdin.
///
/// Stdin is used because stdout is rebound to a file while the loop runs.
pub fn terminal_size() -> io::Result<TerminalSize> {
    terminal_size_of(libc::STDIN_FILENO)
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: tcgetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(termios)
    }
}

fn set_termios(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: tcsetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
