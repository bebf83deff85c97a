//! Diagnostic model. Rust port of debug.h's `hope`/`fail`/`warn`/`inform` macros.
//!
//! The original distinguishes three kinds of failure (see pzx2txt.cpp, tzx.cpp,
//! csw.cpp throughout): contract violations (`hope`), which abort only in debug
//! builds; input-format errors, which either `warn` and skip or `fail` and exit;
//! and I/O errors, which are always fatal. We keep the same shape: `warn!`
//! prints to stderr and continues, `fail!` prints and terminates the process,
//! and [`Fatal`] is the `anyhow`-compatible error type CLI binaries bubble up
//! to `main` for I/O and other non-recoverable failures.

use std::fmt;

/// An unrecoverable error surfaced to a binary's `main`. Distinct from the
/// `warn!`/`fail!` macros below, which handle the common case of a renderer
/// deciding inline whether a malformed block is recoverable.
#[derive(Debug)]
pub struct Fatal(pub String);

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Fatal {}

impl Fatal {
    pub fn new(msg: impl Into<String>) -> Self {
        Fatal(msg.into())
    }
}

/// Print a warning to stderr. Equivalent to debug.h's `warn(f, ...)`. Warnings
/// are never suppressed and never abort — the caller decides how to recover.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!("warning: {}", format!($($arg)*));
    };
}

/// Print an informational message to stderr. Equivalent to debug.h's `inform`.
#[macro_export]
macro_rules! inform {
    ($($arg:tt)*) => {
        eprintln!("info: {}", format!($($arg)*));
    };
}

/// Print an error to stderr and terminate the process immediately with
/// `EXIT_FAILURE`. Equivalent to debug.h's `fail(f, ...)`. Used for
/// conditions the original treats as immediately fatal (malformed headers,
/// write failures) rather than recoverable per-block errors.
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {{
        eprintln!("error: {}", format!($($arg)*));
        std::process::exit(1);
    }};
}

/// Debug-only contract assertion. Equivalent to debug.h's `hope(c)`: a no-op
/// in release builds, a panic in debug builds. Used for invariants the caller
/// is expected to uphold (non-null buffers, open-before-use), not for
/// recoverable input errors.
#[macro_export]
macro_rules! hope {
    ($cond:expr) => {
        debug_assert!($cond);
    };
    ($cond:expr, $($arg:tt)*) => {
        debug_assert!($cond, $($arg)*);
    };
}
