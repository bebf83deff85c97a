//! TAP renderer: the plain 2-byte-length-prefixed tape block format. Rust
//! port of tap2pzx.cpp's `main` body.

use std::io::{self, Write};

use crate::config::{
    BIT_0_CYCLES, BIT_1_CYCLES, LEADER_CYCLES, LONG_LEADER_COUNT, SHORT_LEADER_COUNT, SYNC_1_CYCLES, SYNC_2_CYCLES,
    TAIL_CYCLES,
};
use crate::pzx::Writer;
use crate::{fail, hope};

/// Render every length-prefixed block in `tape` to `writer` as a standard ROM
/// loader pilot+sync+data sequence, separating blocks by `pause_cycles` of
/// silence (0 = no pause). tap2pzx.cpp's block loop.
pub fn render<W: Write>(writer: &mut Writer<W>, tape: &[u8], pause_cycles: u32) -> io::Result<()> {
    let mut offset = 0usize;

    while offset < tape.len() {
        if tape.len() - offset < 2 {
            fail!("error reading block header");
        }
        let size = u16::from_le_bytes([tape[offset], tape[offset + 1]]) as usize;
        offset += 2;

        if size == 0 {
            continue;
        }
        if tape.len() - offset < size {
            fail!("error reading block data");
        }

        let data = &tape[offset..offset + size];
        offset += size;

        hope!(!data.is_empty());
        let leader_count = if data[0] < 128 { LONG_LEADER_COUNT } else { SHORT_LEADER_COUNT };

        writer.store(leader_count, LEADER_CYCLES as u32)?;
        writer.store(1, SYNC_1_CYCLES as u32)?;
        writer.store(1, SYNC_2_CYCLES as u32)?;

        let seq0 = [BIT_0_CYCLES, BIT_0_CYCLES];
        let seq1 = [BIT_1_CYCLES, BIT_1_CYCLES];
        writer.data(data, 8 * size as u32, true, &seq0, &seq1, TAIL_CYCLES)?;

        if pause_cycles > 0 {
            writer.pause(pause_cycles, false)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_emits_pilot_and_data() {
        let mut w = Writer::open(Vec::new());
        // 2-byte length prefix then 1 data byte (flag 0x00 => long leader).
        let tape = [1, 0, 0x00];
        render(&mut w, &tape, 0).unwrap();
        let out = w.close().unwrap();
        assert!(out.windows(4).any(|w| w == b"DATA"));
    }

    #[test]
    fn zero_length_block_is_skipped() {
        let mut w = Writer::open(Vec::new());
        let tape = [0, 0, 1, 0, 0xFF];
        render(&mut w, &tape, 0).unwrap();
        let out = w.close().unwrap();
        assert!(out.windows(4).any(|w| w == b"DATA"));
    }
}
