//! `termframe` - terminal input/output core for full-screen programs.
//!
//! Raw bytes from the terminal are captured on a background thread, parsed
//! into keyboard and SGR mouse events once per tick, and handed to a frame
//! callback that draws into a byte frame buffer. Frames are only written when
//! they change, when something wrote around the renderer, or once a second.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (termios, fcntl, dup2 FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow input::InputCapture etc
#![allow(clippy::struct_excessive_bools)] // Terminal state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests

pub mod ansi;
pub mod app;
pub mod capture;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod render;
pub mod scheduler;
pub mod sentinel;
pub mod terminal;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{LogLevel, clear_log_callback, emit_log, set_log_callback};
pub use geometry::{Point, Rect, Size, TerminalSize};

// Re-export input types
pub use input::{Event, EventKind, EventParser, MouseAction, MouseButton, MouseEvent, parse_events};

// Re-export commonly used types
pub use app::{EventLoop, run_event_loop};
pub use capture::{CaptureBuffer, InputCapture};
pub use render::{FrameBuffer, Style, StyledBlock};
pub use scheduler::{FlushReason, FrameScheduler, LoopOptions, LoopStats, StopHandle};
pub use sentinel::{CorruptionSentinel, StreamRedirect};
pub use terminal::{RawModeGuard, Terminal, enable_raw_mode, is_tty, terminal_size};
