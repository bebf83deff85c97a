//! The pulse packer. Rust port of pzx.cpp's three `pzx_pack` overloads plus
//! `pzx_matches`. Given a run of u16 pulse durations, tries every two-symbol
//! partition of the stream and, on success, emits it as a packed DATA block
//! through the [`Writer`] rather than as raw unpacked pulses.

use std::io::{self, Write};

use crate::buffer::Buffer;
use crate::pzx::writer::Writer;

fn matches(pulses: &[u16], sequence: &[u16]) -> bool {
    if sequence.is_empty() || sequence.len() > pulses.len() {
        return false;
    }
    pulses[..sequence.len()] == *sequence
}

/// Try to encode `pulses` as a DATA block using exactly the two given
/// sequences. pzx.cpp's two-sequence `pzx_pack` overload.
fn pack_with_sequences<W: Write>(
    writer: &mut Writer<W>,
    pulses: &[u16],
    initial_level: bool,
    seq0: &[u16],
    seq1: &[u16],
    tail_cycles: u16,
) -> io::Result<bool> {
    let mut pack_buffer = Buffer::new();
    let mut data = pulses;
    let mut value: u8 = 0;
    let mut bit_count: u32 = 0;

    while !data.is_empty() {
        if matches(data, seq0) {
            value <<= 1;
            data = &data[seq0.len()..];
        } else if matches(data, seq1) {
            value <<= 1;
            value |= 1;
            data = &data[seq1.len()..];
        } else {
            return Ok(false);
        }

        bit_count += 1;
        if bit_count >= 0x8000_0000 {
            return Ok(false);
        }
        if bit_count & 7 == 0 {
            pack_buffer.append_u8(value);
        }
    }

    let extra_bits = bit_count & 7;
    if extra_bits > 0 {
        value <<= 8 - extra_bits;
        pack_buffer.append_u8(value);
    }

    writer.data_raw(pack_buffer.data(), bit_count, initial_level, seq0, seq1, tail_cycles)?;
    Ok(true)
}

/// Try to encode `pulses` given the two candidate sequences, resolving
/// `sequence_order` (0, 1, or 2 = auto) first. pzx.cpp's second `pzx_pack`
/// overload.
#[allow(clippy::too_many_arguments)]
fn pack_with_order<W: std::io::Write>(
    writer: &mut Writer<W>,
    pulses: &[u16],
    initial_level: bool,
    seq0: &[u16],
    seq1: &[u16],
    sequence_order: u32,
    tail_cycles: u16,
) -> io::Result<bool> {
    let order = if sequence_order > 1 {
        let duration_0: u32 = seq0.iter().map(|&d| d as u32).sum();
        let duration_1: u32 = seq1.iter().map(|&d| d as u32).sum();
        if duration_0 == 0 || duration_1 == 0 || duration_0 <= duration_1 {
            0
        } else {
            1
        }
    } else {
        sequence_order
    };

    if order == 0 {
        pack_with_sequences(writer, pulses, initial_level, seq0, seq1, tail_cycles)
    } else {
        pack_with_sequences(writer, pulses, initial_level, seq1, seq0, tail_cycles)
    }
}

/// Try every 2-sequence partition of `pulses`, sequence 0 always starting at
/// offset 0, lengths from `sequence_limit` (capped at 255 and at
/// `pulses.len()`) down to 1. Returns `true` and has already written the
/// DATA block on success; returns `false` (and writes nothing) if no
/// partition works. pzx.cpp's top-level `pzx_pack` overload, §4.3.
pub fn pack<W: std::io::Write>(
    writer: &mut Writer<W>,
    pulses: &[u16],
    initial_level: bool,
    sequence_limit: u32,
    sequence_order: u32,
    tail_cycles: u16,
) -> io::Result<bool> {
    if pulses.is_empty() {
        return Ok(false);
    }

    let limit = sequence_limit.min(pulses.len() as u32).min(255) as usize;

    for len0 in (1..=limit).rev() {
        let seq0 = &pulses[..len0];

        let mut rest = pulses;
        while matches(rest, seq0) {
            rest = &rest[len0..];
        }

        if rest.is_empty() {
            return pack_with_order(writer, pulses, initial_level, seq0, &[], sequence_order, tail_cycles);
        }

        for len1 in (1..=limit).rev() {
            if rest.len() < len1 {
                continue;
            }
            let seq1 = &rest[..len1];
            if pack_with_order(writer, pulses, initial_level, seq0, seq1, sequence_order, tail_cycles)? {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sequence_stream_packs() {
        let mut w = Writer::open(Vec::new());
        let pulses = [855u16, 855, 855, 855];
        let ok = pack(&mut w, &pulses, true, 2, 2, 0).unwrap();
        assert!(ok);
    }

    #[test]
    fn two_sequence_stream_packs() {
        let mut w = Writer::open(Vec::new());
        // bit0 = [855,855], bit1 = [1710,1710]; data 0xAA = 10101010.
        let mut pulses = Vec::new();
        for bit in [1u16, 0, 1, 0, 1, 0, 1, 0] {
            if bit == 0 {
                pulses.extend_from_slice(&[855, 855]);
            } else {
                pulses.extend_from_slice(&[1710, 1710]);
            }
        }
        let ok = pack(&mut w, &pulses, true, 2, 2, 945).unwrap();
        assert!(ok);
    }

    #[test]
    fn irregular_stream_fails_to_pack() {
        let mut w = Writer::open(Vec::new());
        let pulses = [1u16, 2, 3, 5, 7, 11, 13];
        let ok = pack(&mut w, &pulses, false, 2, 2, 0).unwrap();
        assert!(!ok);
    }
}
