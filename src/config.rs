// config.rs — Rust port of tap.h and the version/timing constants scattered
// across pzx.h, tzx.h and csw.cpp (raxoft/pzxtools).

/// PZX container version this writer emits. pzx.h lines 14-15.
pub const PZX_MAJOR: u8 = 1;
pub const PZX_MINOR: u8 = 0;

/// Highest TZX version this renderer understands. tzx.h lines 14-15.
pub const TZX_MAJOR: u8 = 1;
pub const TZX_MINOR: u8 = 20;

/// Reference clock all pulse durations are expressed in. tap.h line 17.
pub const REFERENCE_CLOCK_HZ: u64 = 3_500_000;

/// One millisecond expressed in T cycles. tap.h line 24.
pub const MILLISECOND_CYCLES: u32 = 3500;

/// Standard ROM loader timing constants, tap.h lines 18-23.
pub const LEADER_CYCLES: u16 = 2168;
pub const SHORT_LEADER_COUNT: u32 = 3223;
pub const LONG_LEADER_COUNT: u32 = 8063;
pub const SYNC_1_CYCLES: u16 = 667;
pub const SYNC_2_CYCLES: u16 = 735;
pub const BIT_0_CYCLES: u16 = 855;
pub const BIT_1_CYCLES: u16 = 1710;
pub const TAIL_CYCLES: u16 = 945;

/// Default WAV sample rate used by pzx2wav when `-s` is not given. pzx2wav.cpp line 112.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Initial capacity for a freshly created [`crate::buffer::Buffer`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Initial capacity used by the text-dump readers, which read the whole
/// input in one shot. txt2pzx.cpp line 855.
pub const TEXT_BUFFER_CAPACITY: usize = 256 * 1024;

/// Soft cap on the writer's pending pulse buffer before it is flushed as an
/// independent PULSES block, bounding memory use for very long tapes.
/// §5 "Ordering guarantees" (d).
pub const PULSE_BUFFER_SOFT_CAP: usize = 1024 * 1024;

/// Maximum single-pulse duration before `out` must split it into chunks.
pub const MAX_PULSE_DURATION: u32 = 0x7FFF_FFFF;

/// Maximum recursion depth for nested TZX loop/call blocks. §4.4.
pub const MAX_TZX_RECURSION_DEPTH: u32 = 10;
