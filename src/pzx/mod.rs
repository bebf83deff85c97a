//! The PZX writer, packer, reader and wire-format constants. Rust port of
//! pzx.h / pzx.cpp (raxoft/pzxtools).

pub mod format;
pub mod packer;
pub mod reader;
pub mod writer;

pub use packer::pack;
pub use reader::{Block, BlockReader};
pub use writer::Writer;
