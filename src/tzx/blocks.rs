//! TZX block ID constants and the header/data size table. Rust port of
//! tzx.h's `TZX_*` constants and tzx.cpp's `tzx_get_header_size` /
//! `tzx_get_data_size` (lines 30-87).

use crate::buffer::{Cursor, Truncated};

pub const NORMAL_BLOCK: u8 = 0x10;
pub const TURBO_BLOCK: u8 = 0x11;
pub const PURE_TONE: u8 = 0x12;
pub const PULSE_SEQUENCE: u8 = 0x13;
pub const DATA_BLOCK: u8 = 0x14;
pub const SAMPLES: u8 = 0x15;
pub const CSW: u8 = 0x18;
pub const GDB: u8 = 0x19;
pub const PAUSE: u8 = 0x20;
pub const GROUP_BEGIN: u8 = 0x21;
pub const GROUP_END: u8 = 0x22;
pub const JUMP: u8 = 0x23;
pub const LOOP_BEGIN: u8 = 0x24;
pub const LOOP_END: u8 = 0x25;
pub const CALL_SEQUENCE: u8 = 0x26;
pub const RETURN: u8 = 0x27;
pub const SELECT_BLOCK: u8 = 0x28;
pub const STOP_IF_48K: u8 = 0x2A;
pub const SET_LEVEL: u8 = 0x2B;
pub const TEXT_INFO: u8 = 0x30;
pub const MESSAGE: u8 = 0x31;
pub const ARCHIVE_INFO: u8 = 0x32;
pub const HARDWARE_INFO: u8 = 0x33;
pub const CUSTOM_INFO: u8 = 0x35;
pub const GLUE: u8 = 0x5A;

/// Size of the mandatory header, including the leading ID byte.
/// tzx.cpp's `tzx_get_header_size`.
pub fn header_size(id: u8) -> usize {
    1 + match id {
        NORMAL_BLOCK => 0x04,
        TURBO_BLOCK => 0x12,
        PURE_TONE => 0x04,
        PULSE_SEQUENCE => 0x01,
        DATA_BLOCK => 0x0A,
        SAMPLES => 0x08,
        PAUSE => 0x02,
        GROUP_BEGIN => 0x01,
        GROUP_END => 0x00,
        JUMP => 0x02,
        LOOP_BEGIN => 0x02,
        LOOP_END => 0x00,
        CALL_SEQUENCE => 0x02,
        RETURN => 0x00,
        SELECT_BLOCK => 0x02,
        TEXT_INFO => 0x01,
        MESSAGE => 0x02,
        ARCHIVE_INFO => 0x02,
        HARDWARE_INFO => 0x01,
        CUSTOM_INFO => 0x14,
        GLUE => 0x09,
        _ => 0x04,
    }
}

/// Size of the variable-length data following the header. `block` starts at
/// the ID byte. tzx.cpp's `tzx_get_data_size`.
pub fn data_size(block: &[u8]) -> Result<u32, Truncated> {
    let id = *block.first().ok_or(Truncated)?;
    let after = Cursor::new(&block[1..]);
    Ok(match id {
        NORMAL_BLOCK => after.peek_u16_le(0x02)? as u32,
        TURBO_BLOCK => after.peek_u24_le(0x0F)?,
        PURE_TONE => 0,
        PULSE_SEQUENCE => after.peek_u8(0x00)? as u32 * 2,
        DATA_BLOCK => after.peek_u24_le(0x07)?,
        SAMPLES => after.peek_u24_le(0x05)?,
        PAUSE => 0,
        GROUP_BEGIN => after.peek_u8(0x00)? as u32,
        GROUP_END => 0,
        JUMP => 0,
        LOOP_BEGIN => 0,
        LOOP_END => 0,
        CALL_SEQUENCE => after.peek_u16_le(0x00)? as u32 * 2,
        RETURN => 0,
        SELECT_BLOCK => after.peek_u16_le(0x00)? as u32,
        TEXT_INFO => after.peek_u8(0x00)? as u32,
        MESSAGE => after.peek_u8(0x01)? as u32,
        ARCHIVE_INFO => after.peek_u16_le(0x00)? as u32,
        HARDWARE_INFO => after.peek_u8(0x00)? as u32 * 3,
        CUSTOM_INFO => after.peek_u32_le(0x10)?,
        GLUE => 0,
        _ => after.peek_u32_le(0)?,
    })
}

/// Split `tape` into the byte ranges of its successive blocks, stopping (with
/// a warning) at the first block whose header or data size would run past
/// the end of the tape. tzx.cpp's `tzx_get_next_block`, adapted to collect
/// all block starts up front the way `tzx_render` does.
pub fn scan_blocks(tape: &[u8]) -> Vec<&[u8]> {
    let mut blocks = Vec::new();
    let mut offset = 0usize;

    while offset < tape.len() {
        let block = &tape[offset..];
        let hsize = header_size(block[0]);
        if hsize > block.len() {
            crate::warn!("TZX block header size exceeds file size");
            break;
        }
        let dsize = match data_size(block) {
            Ok(n) => n as usize,
            Err(_) => {
                crate::warn!("TZX block header size exceeds file size");
                break;
            }
        };
        if dsize > block.len() - hsize {
            crate::warn!("TZX block data size exceeds file size");
            break;
        }
        let total = hsize + dsize;
        blocks.push(&block[..total]);
        offset += total;
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_tone_header_size_is_five() {
        assert_eq!(header_size(PURE_TONE), 5);
    }

    #[test]
    fn normal_block_data_size_reads_length_field() {
        let mut block = vec![NORMAL_BLOCK, 0, 0, 0x34, 0x12];
        block.resize(5, 0);
        assert_eq!(data_size(&block).unwrap(), 0x1234);
    }

    #[test]
    fn scan_blocks_splits_two_pure_tone_blocks() {
        let tape = [PURE_TONE, 1, 2, 3, 4, PURE_TONE, 5, 6, 7, 8];
        let blocks = scan_blocks(&tape);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], &tape[0..5]);
        assert_eq!(blocks[1], &tape[5..10]);
    }
}
