//! The TZX interpreter. Rust port of tzx.cpp's `tzx_render_*` family and
//! `tzx_process_block`/`tzx_process_blocks`/`tzx_render` (lines 127-1028).
//!
//! Pulse level is threaded through every call as `&mut bool`, exactly as the
//! original threads its `bool & level` reference — there is no implicit
//! global state here, only this one accumulator.

use std::io::{self, Write};

use crate::config::{
    BIT_0_CYCLES, BIT_1_CYCLES, LEADER_CYCLES, LONG_LEADER_COUNT, MAX_TZX_RECURSION_DEPTH, MILLISECOND_CYCLES,
    SHORT_LEADER_COUNT, SYNC_1_CYCLES, SYNC_2_CYCLES, TAIL_CYCLES, TZX_MAJOR, TZX_MINOR,
};
use crate::csw;
use crate::pzx::{self, Writer};
use crate::tzx::blocks::{self, *};
use crate::warn;

fn render_pulse<W: Write>(writer: &mut Writer<W>, level: &mut bool, duration: u32) -> io::Result<()> {
    writer.out(duration, *level)?;
    *level = !*level;
    Ok(())
}

fn render_pulses<W: Write>(writer: &mut Writer<W>, level: &mut bool, count: u32, duration: u32) -> io::Result<()> {
    for _ in 0..count {
        render_pulse(writer, level, duration)?;
    }
    Ok(())
}

fn render_pilot<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    leader_count: u32,
    leader_cycles: u32,
    sync_1_cycles: u32,
    sync_2_cycles: u32,
) -> io::Result<()> {
    render_pulses(writer, level, leader_count, leader_cycles)?;
    render_pulse(writer, level, sync_1_cycles)?;
    render_pulse(writer, level, sync_2_cycles)
}

/// tzx.cpp's first `tzx_render_data` overload (explicit bit count and pulse
/// sequences).
#[allow(clippy::too_many_arguments)]
fn render_data_bits<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    initial_level: bool,
    final_level_0: bool,
    final_level_1: bool,
    data: &[u8],
    bit_count: u32,
    seq0: &[u16],
    seq1: &[u16],
    tail_cycles: u16,
    pause_length: u32,
) -> io::Result<()> {
    if bit_count > 0 {
        writer.data(data, bit_count, initial_level, seq0, seq1, if pause_length > 0 { tail_cycles } else { 0 })?;

        let bit_index = bit_count - 1;
        let bit_mask = 0x80u8 >> (bit_index & 7);
        let last_byte = data[(bit_index / 8) as usize];
        *level = if (last_byte & bit_mask) != 0 { final_level_1 } else { final_level_0 };
    }

    if pause_length > 0 {
        *level = false;
        if pause_length > 1 || tail_cycles == 0 || bit_count == 0 {
            writer.pause(pause_length * MILLISECOND_CYCLES, *level)?;
        }
    }

    Ok(())
}

/// tzx.cpp's second `tzx_render_data` overload (byte count + bits-in-last-byte).
#[allow(clippy::too_many_arguments)]
fn render_data_bytes<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    initial_level: bool,
    final_level_0: bool,
    final_level_1: bool,
    data: &[u8],
    data_size: u32,
    bits_in_last_byte: u32,
    bit_0_cycles_1: u16,
    bit_0_cycles_2: u16,
    bit_1_cycles_1: u16,
    bit_1_cycles_2: u16,
    tail_cycles: u16,
    pause_length: u32,
) -> io::Result<()> {
    let mut bit_count = 8 * data_size;
    if bits_in_last_byte <= 8 && bit_count >= 8 {
        bit_count -= 8;
        bit_count += bits_in_last_byte;
    }

    let s0 = [bit_0_cycles_1, bit_0_cycles_2];
    let s1 = [bit_1_cycles_1, bit_1_cycles_2];

    render_data_bits(
        writer,
        level,
        initial_level,
        final_level_0,
        final_level_1,
        data,
        bit_count,
        &s0,
        &s1,
        tail_cycles,
        pause_length,
    )
}

/// tzx.cpp's third `tzx_render_data` overload (single cycle per bit value,
/// level unchanged at the start and end of the block).
#[allow(clippy::too_many_arguments)]
fn render_data<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    data: &[u8],
    data_size: u32,
    bits_in_last_byte: u32,
    bit_0_cycles: u16,
    bit_1_cycles: u16,
    tail_cycles: u16,
    pause_length: u32,
) -> io::Result<()> {
    let lv = *level;
    render_data_bytes(
        writer,
        level,
        lv,
        lv,
        lv,
        data,
        data_size,
        bits_in_last_byte,
        bit_0_cycles,
        bit_0_cycles,
        bit_1_cycles,
        bit_1_cycles,
        tail_cycles,
        pause_length,
    )
}

fn render_pause<W: Write>(writer: &mut Writer<W>, level: &mut bool, duration_ms: u32) -> io::Result<()> {
    if duration_ms == 0 {
        return Ok(());
    }
    if *level {
        render_pulse(writer, level, MILLISECOND_CYCLES)?;
    }
    writer.pause(duration_ms * MILLISECOND_CYCLES, *level)?;
    *level = false;
    Ok(())
}

fn render_gdb_pulses<W: Write>(
    writer: &mut Writer<W>,
    initial_level: bool,
    buffer: &mut Vec<u16>,
    sequence_limit: u32,
    sequence_order: u32,
    tail_cycles: u16,
) -> io::Result<()> {
    let packed = pzx::pack(writer, buffer, initial_level, sequence_limit, sequence_order, tail_cycles)?;
    if !packed {
        writer.pulses(buffer, initial_level, tail_cycles as u32)?;
    }
    buffer.clear();
    Ok(())
}

/// `sequence` is one symbol's table record: one level-control byte followed
/// by up to `pulse_limit` little-endian pulse durations (0 terminates early).
fn render_gdb_symbol(level: &mut bool, buffer: &mut Vec<u16>, sequence: &[u8], pulse_limit: u32) {
    match sequence[0] {
        0 => {}
        1 => {
            buffer.push(0);
            *level = !*level;
        }
        2 => {
            if *level {
                buffer.push(0);
            }
            *level = false;
        }
        3 => {
            if !*level {
                buffer.push(0);
            }
            *level = true;
        }
        other => warn!("invalid GDB pulse sequence level bits 0x{:02x}", other),
    }

    let mut idx = 1;
    for _ in 0..pulse_limit {
        let duration = u16::from_le_bytes([sequence[idx], sequence[idx + 1]]);
        idx += 2;
        if duration == 0 {
            break;
        }
        buffer.push(duration);
        *level = !*level;
    }
}

#[allow(clippy::too_many_arguments)]
fn render_gdb_pilot<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    buffer: &mut Vec<u16>,
    data: &[u8],
    count: u32,
    table: &[u8],
    symbol_count: u32,
    symbol_pulses: u32,
) -> io::Result<()> {
    let initial_level = *level;
    let stride = (2 * symbol_pulses + 1) as usize;
    let mut p = 0usize;

    for _ in 0..count {
        let symbol = data[p] as u32;
        p += 1;

        if symbol >= symbol_count {
            warn!("pilot symbol {} is out of range <0,{}>", symbol, symbol_count - 1);
            continue;
        }

        let sequence = &table[symbol as usize * stride..symbol as usize * stride + stride];

        let mut repeat_count = u16::from_le_bytes([data[p], data[p + 1]]) as u32;
        p += 2;

        while repeat_count > 0 {
            render_gdb_symbol(level, buffer, sequence, symbol_pulses);
            repeat_count -= 1;
        }
    }

    render_gdb_pulses(writer, initial_level, buffer, 0, 0, 0)
}

#[allow(clippy::too_many_arguments)]
fn render_gdb_data<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    buffer: &mut Vec<u16>,
    data: &[u8],
    count: u32,
    bit_count: u32,
    table: &[u8],
    symbol_count: u32,
    symbol_pulses: u32,
    pause_length: u32,
) -> io::Result<()> {
    let initial_level = *level;

    let first_byte = if count > 0 { data[0] as u32 } else { 0 };
    let sequence_order = (first_byte >> 7) & 1;

    let stride = (2 * symbol_pulses + 1) as usize;
    let mut mask: u32 = 0x80;
    let mut p = 0usize;

    for _ in 0..count {
        let mut symbol = 0u32;
        for _ in 0..bit_count {
            symbol <<= 1;
            if (data[p] as u32 & mask) != 0 {
                symbol |= 1;
            }
            mask >>= 1;
            if mask == 0 {
                mask = 0x80;
                p += 1;
            }
        }

        if symbol >= symbol_count {
            warn!("data symbol {} is out of range <0,{}>", symbol, symbol_count - 1);
            continue;
        }

        let sequence = &table[symbol as usize * stride..symbol as usize * stride + stride];
        render_gdb_symbol(level, buffer, sequence, symbol_pulses);
    }

    let tail_cycles = if pause_length > 0 { MILLISECOND_CYCLES as u16 } else { 0 };
    render_gdb_pulses(writer, initial_level, buffer, symbol_pulses + 1, sequence_order, tail_cycles)?;

    if pause_length > 0 {
        *level = false;
        writer.pause(pause_length * MILLISECOND_CYCLES, *level)?;
    }

    Ok(())
}

/// `after` is the block with the leading ID byte already stripped.
fn render_gdb<W: Write>(writer: &mut Writer<W>, level: &mut bool, after: &[u8], block_size: u32) -> io::Result<()> {
    if (block_size as usize) < 0x12 {
        warn!("TZX GDB block is too small");
        return Ok(());
    }

    let block_end = 4 + block_size as usize;

    let pause_length = u16::from_le_bytes([after[0x04], after[0x05]]) as u32;

    let pilot_symbols = u32::from_le_bytes([after[0x06], after[0x07], after[0x08], after[0x09]]);
    let pilot_symbol_pulses = after[0x0A] as u32;
    let pilot_symbol_count = if after[0x0B] != 0 { after[0x0B] as u32 } else { 256 };

    let data_symbols = u32::from_le_bytes([after[0x0C], after[0x0D], after[0x0E], after[0x0F]]);
    let data_symbol_pulses = after[0x10] as u32;
    let data_symbol_count = if after[0x11] != 0 { after[0x11] as u32 } else { 256 };

    let mut data_symbol_bits = 1u32;
    while data_symbol_count > (1u32 << data_symbol_bits) {
        data_symbol_bits += 1;
    }

    let pilot_table_size = if pilot_symbols > 0 { pilot_symbol_count as usize * (pilot_symbol_pulses as usize * 2 + 1) } else { 0 };
    let pilot_stream_size = pilot_symbols as usize * 3;
    let data_table_size = if data_symbols > 0 { data_symbol_count as usize * (data_symbol_pulses as usize * 2 + 1) } else { 0 };
    let data_stream_size = ((data_symbols as usize * data_symbol_bits as usize) + 7) / 8;

    let pilot_table_start = 0x12usize;
    let pilot_stream_start = pilot_table_start + pilot_table_size;
    let data_table_start = pilot_stream_start + pilot_stream_size;
    let data_stream_start = data_table_start + data_table_size;
    let end = data_stream_start + data_stream_size;

    if !(pilot_stream_start <= data_table_start
        && data_table_start <= data_stream_start
        && data_stream_start <= end
        && end <= block_end)
    {
        warn!("TZX GDB block has invalid size");
        return Ok(());
    }
    if end != block_end {
        warn!("TZX GDB block contains unused data");
    }

    let pilot_table = &after[pilot_table_start..pilot_stream_start];
    let pilot_stream = &after[pilot_stream_start..data_table_start];
    let data_table = &after[data_table_start..data_stream_start];
    let data_stream = &after[data_stream_start..end];

    let mut buffer: Vec<u16> = Vec::new();
    render_gdb_pilot(writer, level, &mut buffer, pilot_stream, pilot_symbols, pilot_table, pilot_symbol_count, pilot_symbol_pulses)?;
    render_gdb_data(
        writer,
        level,
        &mut buffer,
        data_stream,
        data_symbols,
        data_symbol_bits,
        data_table,
        data_symbol_count,
        data_symbol_pulses,
        pause_length,
    )
}

fn render_csw<W: Write>(writer: &mut Writer<W>, level: &mut bool, after: &[u8], block_size: u32) -> io::Result<()> {
    if (block_size as usize) < 0x0E {
        warn!("TZX CSW block is too small");
        return Ok(());
    }

    let pause_length = u16::from_le_bytes([after[0x04], after[0x05]]) as u32;
    let sample_rate = u32::from_le_bytes([after[0x06], after[0x07], after[0x08], 0]);
    let compression = after[0x09] as u32;
    let expected_pulse_count = u32::from_le_bytes([after[0x0A], after[0x0B], after[0x0C], after[0x0D]]);

    let block_end = 4 + block_size as usize;
    let data = &after[0x0E..block_end];

    if sample_rate == 0 {
        warn!("TZX CSW sample rate {} is invalid", sample_rate);
        return Ok(());
    }

    let pulse_count = csw::render_block(writer, level, compression, sample_rate, data)?;

    if pulse_count != expected_pulse_count {
        warn!(
            "TZX CSW block actual pulse count {} differs from expected pulse count {}",
            pulse_count, expected_pulse_count
        );
    }

    if pulse_count > 0 {
        *level = !*level;
    }

    render_pause(writer, level, pause_length)
}

fn info_name(kind: u8) -> &'static str {
    match kind {
        0x00 => "Title",
        0x01 => "Publisher",
        0x02 => "Author",
        0x03 => "Year",
        0x04 => "Language",
        0x05 => "Type",
        0x06 => "Price",
        0x07 => "Protection",
        0x08 => "Origin",
        0xFF => "Comment",
        _ => "Info",
    }
}

/// Convert archive-info strings to BRWS-style info strings. tzx.cpp's
/// `tzx_convert_info`.
fn convert_info<W: Write>(writer: &mut Writer<W>, info: &[u8], title_only: bool) -> io::Result<()> {
    let count = match info.first() {
        Some(&c) => c,
        None => return Ok(()),
    };

    let mut p = 1usize;
    for _ in 0..count {
        if p + 2 > info.len() {
            break;
        }
        let kind = info[p];
        let length = info[p + 1] as usize;
        p += 2;
        let string_start = p;
        p += length;
        if p > info.len() {
            break;
        }
        let string = &info[string_start..p];

        if title_only {
            if kind == 0x00 {
                writer.info(string);
                return Ok(());
            }
            continue;
        } else if kind == 0x00 {
            continue;
        }

        writer.info(info_name(kind).as_bytes());
        writer.info(string);
    }

    if title_only {
        writer.info(b"Some tape");
    }
    Ok(())
}

/// Adjust `block_index` by a relative `offset` from `next_index`, failing if
/// that would land outside `[0, block_count)`. tzx.cpp's `tzx_set_block_index`.
fn set_block_index(block_index: &mut usize, next_index: usize, offset: i32, block_count: usize) -> bool {
    *block_index = next_index - 1;

    let limit: i64 = if offset < 0 { *block_index as i64 } else { (block_count - next_index) as i64 };
    let distance = offset.unsigned_abs() as i64;

    if distance > limit {
        *block_index = next_index;
        return false;
    }

    *block_index = (next_index as i64 - 1 + offset as i64) as usize;
    true
}

/// End-of-region sentinel a nested `process_blocks` call is looking for.
#[derive(Clone, Copy, PartialEq, Eq)]
enum EndType {
    TopLevel,
    LoopEnd,
    Return,
}

#[allow(clippy::too_many_arguments)]
fn process_block<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    block_index: &mut usize,
    blocks: &[&[u8]],
    end_type: EndType,
    nesting_level: u32,
    jump_count: &mut u32,
) -> io::Result<bool> {
    let block = blocks[*block_index];
    *block_index += 1;

    let id = block[0];
    let after = &block[1..];
    let data_size = blocks::data_size(block).unwrap_or(0);
    let block_count = blocks.len();

    match id {
        NORMAL_BLOCK => {
            let leader_count = if after[0x04] < 128 { LONG_LEADER_COUNT } else { SHORT_LEADER_COUNT };
            render_pilot(writer, level, leader_count, LEADER_CYCLES as u32, SYNC_1_CYCLES as u32, SYNC_2_CYCLES as u32)?;
            let pause = u16::from_le_bytes([after[0], after[1]]) as u32;
            render_data(writer, level, &after[0x04..], data_size, 8, BIT_0_CYCLES, BIT_1_CYCLES, TAIL_CYCLES, pause)?;
        }
        TURBO_BLOCK => {
            let leader_cycles = u16::from_le_bytes([after[0], after[1]]) as u32;
            let sync_1 = u16::from_le_bytes([after[2], after[3]]) as u32;
            let sync_2 = u16::from_le_bytes([after[4], after[5]]) as u32;
            let leader_count = u16::from_le_bytes([after[0x0A], after[0x0B]]) as u32;
            render_pilot(writer, level, leader_count, leader_cycles, sync_1, sync_2)?;
            let bit_0 = u16::from_le_bytes([after[0x06], after[0x07]]);
            let bit_1 = u16::from_le_bytes([after[0x08], after[0x09]]);
            let bits_in_last_byte = after[0x0C] as u32;
            let pause = u16::from_le_bytes([after[0x0D], after[0x0E]]) as u32;
            render_data(writer, level, &after[0x12..], data_size, bits_in_last_byte, bit_0, bit_1, TAIL_CYCLES, pause)?;
        }
        PURE_TONE => {
            let duration = u16::from_le_bytes([after[0], after[1]]) as u32;
            let count = u16::from_le_bytes([after[2], after[3]]) as u32;
            render_pulses(writer, level, count, duration)?;
        }
        PULSE_SEQUENCE => {
            let count = after[0] as usize;
            let mut idx = 1;
            for _ in 0..count {
                let duration = u16::from_le_bytes([after[idx], after[idx + 1]]) as u32;
                idx += 2;
                render_pulse(writer, level, duration)?;
            }
        }
        DATA_BLOCK => {
            let bit_0 = u16::from_le_bytes([after[0], after[1]]);
            let bit_1 = u16::from_le_bytes([after[2], after[3]]);
            let bits_in_last_byte = after[0x04] as u32;
            let pause = u16::from_le_bytes([after[0x05], after[0x06]]) as u32;
            render_data(writer, level, &after[0x0A..], data_size, bits_in_last_byte, bit_0, bit_1, TAIL_CYCLES, pause)?;
        }
        SAMPLES => {
            let duration = u16::from_le_bytes([after[0], after[1]]);
            let bits_in_last_byte = after[0x04] as u32;
            let pause = u16::from_le_bytes([after[0x02], after[0x03]]) as u32;
            render_data_bits(
                writer,
                level,
                false,
                false,
                true,
                &after[0x08..],
                {
                    let mut bit_count = 8 * data_size;
                    if bits_in_last_byte <= 8 && bit_count >= 8 {
                        bit_count -= 8;
                        bit_count += bits_in_last_byte;
                    }
                    bit_count
                },
                &[duration, 0],
                &[0, duration],
                MILLISECOND_CYCLES as u16,
                pause,
            )?;
        }
        CSW => render_csw(writer, level, after, data_size)?,
        GDB => render_gdb(writer, level, after, data_size)?,
        SET_LEVEL => {
            *level = after[0x04] != 0;
        }
        PAUSE => {
            let duration = u16::from_le_bytes([after[0], after[1]]) as u32;
            if duration > 0 {
                render_pause(writer, level, duration)?;
            } else {
                writer.stop(0)?;
            }
        }
        STOP_IF_48K => {
            writer.stop(1)?;
        }
        GROUP_BEGIN => {
            let len = after[0] as usize;
            writer.browse(&after[1..1 + len])?;
        }
        GROUP_END => {}
        JUMP => {
            *jump_count += 1;
            let offset = i16::from_le_bytes([after[0], after[1]]) as i32;
            let current = *block_index;
            set_block_index(block_index, current, offset, block_count);
        }
        LOOP_BEGIN => {
            let count = u16::from_le_bytes([after[0], after[1]]) as u32;
            let next_index = *block_index;
            for _ in 0..count {
                *block_index = next_index;
                process_blocks(writer, level, block_index, blocks, EndType::LoopEnd, nesting_level)?;
            }
        }
        LOOP_END => {
            if end_type == EndType::LoopEnd {
                return Ok(false);
            }
            warn!("unexpected loop end block encountered");
        }
        CALL_SEQUENCE => {
            let count = u16::from_le_bytes([after[0], after[1]]) as u32;
            let next_index = *block_index;
            for i in 0..count {
                let offset = i16::from_le_bytes([after[2 + 2 * i as usize], after[3 + 2 * i as usize]]) as i32;
                if !set_block_index(block_index, next_index, offset, block_count) {
                    break;
                }
                process_blocks(writer, level, block_index, blocks, EndType::Return, nesting_level)?;
            }
            *block_index = next_index;
        }
        RETURN => {
            if end_type == EndType::Return {
                return Ok(false);
            }
            warn!("unexpected return block encountered");
        }
        SELECT_BLOCK => warn!("select block was ignored"),
        TEXT_INFO => {
            let len = after[0] as usize;
            writer.browse(&after[1..1 + len])?;
        }
        MESSAGE => warn!("message block was ignored"),
        ARCHIVE_INFO => {
            let info = &after[2..2 + data_size as usize];
            convert_info(writer, info, true)?;
            convert_info(writer, info, false)?;
        }
        HARDWARE_INFO => warn!("hardware info block was ignored"),
        CUSTOM_INFO => warn!("custom info block was ignored"),
        GLUE => {
            let major = after[0x07];
            let minor = after[0x08];
            if major != TZX_MAJOR {
                warn!("unsupported TZX major version {}.{} encountered - stopping", major, minor);
                return Ok(false);
            }
            if minor > TZX_MINOR {
                warn!("unsupported TZX minor revision {}.{} encountered - proceeding", major, minor);
            }
        }
        other => warn!("unrecognized TZX block 0x{:02x} was ignored", other),
    }

    Ok(true)
}

fn process_blocks<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    block_index: &mut usize,
    blocks: &[&[u8]],
    end_type: EndType,
    nesting_level: u32,
) -> io::Result<()> {
    if nesting_level > MAX_TZX_RECURSION_DEPTH {
        warn!("too deep nesting detected - returning");
        return Ok(());
    }

    let mut jump_count = 0u32;
    let block_count = blocks.len() as u32;

    while *block_index < blocks.len() {
        if !process_block(writer, level, block_index, blocks, end_type, nesting_level + 1, &mut jump_count)? {
            break;
        }
        if jump_count > block_count {
            warn!("too many jumps detected - stopping");
            break;
        }
    }

    Ok(())
}

/// Render a complete TZX tape body (everything past the 10-byte
/// "ZXTape!\x1A" file signature and version bytes) to `writer`. tzx.cpp's
/// `tzx_render`.
pub fn render<W: Write>(writer: &mut Writer<W>, tape: &[u8]) -> io::Result<()> {
    let blocks = blocks::scan_blocks(tape);
    let mut level = false;
    let mut block_index = 0usize;
    process_blocks(writer, &mut level, &mut block_index, &blocks, EndType::TopLevel, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_tone_block_renders_requested_pulse_count() {
        let mut w = Writer::open(Vec::new());
        // PURE_TONE: duration=2168 (0x0878), count=3223 (0x0C97).
        let tape = [PURE_TONE, 0x78, 0x08, 0x97, 0x0C];
        render(&mut w, &tape).unwrap();
        let out = w.close().unwrap();
        assert!(out.windows(4).any(|w| w == b"PULS"));
    }

    #[test]
    fn pause_block_with_zero_duration_emits_stop() {
        let mut w = Writer::open(Vec::new());
        let tape = [PAUSE, 0x00, 0x00];
        render(&mut w, &tape).unwrap();
        let out = w.close().unwrap();
        assert!(out.windows(4).any(|w| w == b"STOP"));
    }

    #[test]
    fn unknown_block_is_skipped_without_panicking() {
        let mut w = Writer::open(Vec::new());
        let tape = [0x99, 2, 0, 0, 0, 0xAA, 0xBB];
        render(&mut w, &tape).unwrap();
        w.close().unwrap();
    }

    /// spec scenario: standard block, jump +1, standard block, jump -1.
    /// The renderer must land jump +1 on the second standard block (not
    /// skip past it) and keep alternating with jump -1 until the jump
    /// counter safeguard stops it, visiting both standard blocks rather
    /// than spinning on the jump block itself.
    #[test]
    fn jump_blocks_visit_both_standard_blocks_until_the_safeguard_stops() {
        fn standard_block(flag: u8) -> Vec<u8> {
            // NORMAL_BLOCK header: pause u16 (0), data size u16 (1), then
            // one data byte (the flag byte read back as after[0x04]).
            vec![NORMAL_BLOCK, 0x00, 0x00, 0x01, 0x00, flag]
        }
        fn jump_block(offset: i16) -> Vec<u8> {
            let b = offset.to_le_bytes();
            vec![JUMP, b[0], b[1]]
        }

        let mut tape = Vec::new();
        tape.extend(standard_block(0xFF)); // block 0: standard (short leader)
        tape.extend(jump_block(1)); // block 1: jump +1
        tape.extend(standard_block(0xFF)); // block 2: standard
        tape.extend(jump_block(-1)); // block 3: jump -1

        let mut w = Writer::open(Vec::new());
        render(&mut w, &tape).unwrap();
        let out = w.close().unwrap();

        let mut reader = pzx::BlockReader::open(out.as_slice());
        let data_blocks = std::iter::from_fn(|| reader.next_block())
            .filter(|b| &b.tag == pzx::format::TAG_DATA)
            .count();

        // Both standard blocks must be rendered at least once apiece (the
        // off-by-one regression this guards against makes jump +1 skip the
        // second standard block on its first pass), and the safeguard must
        // eventually stop the tape rather than loop forever.
        assert!(data_blocks >= 2, "expected both standard blocks to render at least once, got {data_blocks}");
    }
}
