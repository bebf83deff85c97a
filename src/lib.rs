//! pzxtools — ZX Spectrum tape format converters, Rust port of raxoft/pzxtools.
//!
//! PZX is a lossless pulse-level tape container; this crate's six binaries
//! convert the older TZX, CSW and TAP formats (and a human-readable text
//! dump) to and from it, and render PZX to WAV for playback.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod csw;
pub mod error;
pub mod pzx;
pub mod tap;
pub mod text;
pub mod tzx;
pub mod wav;

pub use error::Fatal;
