//! PZX block tags and wire-format constants. Rust port of the `TAG_NAME`
//! constants in pzx.h. Tags are stored in a PZX file as the four ASCII
//! characters in file order (see endian.h's `TAG_NAME` commentary: on a
//! little-endian host, constructing the tag integer and writing it via
//! "native" order happens to produce literal ASCII order) — so here we skip
//! the integer round-trip entirely and just use the four bytes directly.

/// PZX header block. Must be the first block in any PZX file.
pub const TAG_HEADER: &[u8; 4] = b"PZXT";
/// Pulse-run block.
pub const TAG_PULSES: &[u8; 4] = b"PULS";
/// Data (packed-pulses) block.
pub const TAG_DATA: &[u8; 4] = b"DATA";
/// Pause block.
pub const TAG_PAUSE: &[u8; 4] = b"PAUS";
/// Stop-the-tape block.
pub const TAG_STOP: &[u8; 4] = b"STOP";
/// Browse/info block.
pub const TAG_BROWSE: &[u8; 4] = b"BRWS";
