//! Error taxonomy for the window manager engine.
//!
//! Handlers in the event loop never propagate these outward (spec §7: log
//! and continue); `WmError` exists so the engine's internal operations stay
//! `?`-friendly and unit-testable rather than logging-and-swallowing at
//! every call site.

use std::fmt;

#[derive(Debug)]
pub enum WmError {
    /// Cannot open a connection to the X display.
    NoDisplay,
    /// Another window manager already holds `SubstructureRedirect` on root.
    AnotherWmRunning,
    /// A checked X request came back with a protocol error.
    Protocol { request: &'static str, detail: String },
    /// A window id does not correspond to a window this process still owns
    /// a registered client record for.
    UnknownWindow(u64),
    /// A property fetch or decode failed in a way the caller must notice
    /// (distinct from the silent "default" fallbacks used for titles and
    /// size hints, which are not errors per spec §7.4).
    PropertyDecode { atom: &'static str },
    /// The CLI was invoked with unsupported arguments.
    Usage(String),
}

impl fmt::Display for WmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WmError::NoDisplay => write!(f, "cannot open display"),
            WmError::AnotherWmRunning => {
                write!(f, "another window manager is already running")
            }
            WmError::Protocol { request, detail } => {
                write!(f, "request {} failed: {}", request, detail)
            }
            WmError::UnknownWindow(w) => write!(f, "no managed client for window {}", w),
            WmError::PropertyDecode { atom } => {
                write!(f, "failed to decode property {}", atom)
            }
            WmError::Usage(msg) => write!(f, "usage error: {}", msg),
        }
    }
}

impl std::error::Error for WmError {}

pub type Result<T> = std::result::Result<T, WmError>;
