//! PZX to human-readable text dump. Rust port of pzx2txt.cpp.

use std::io::{self, Read, Write};

use crate::buffer::Cursor;
use crate::config::{PZX_MAJOR, PZX_MINOR};
use crate::fail;
use crate::pzx::format::{TAG_BROWSE, TAG_DATA, TAG_HEADER, TAG_PAUSE, TAG_PULSES, TAG_STOP};
use crate::pzx::BlockReader;
use crate::warn;

/// Command-line flags that steer how block contents are rendered.
#[derive(Default, Clone, Copy)]
pub struct Options {
    pub dump_pulses: bool,
    pub dump_ascii: bool,
    pub dump_headers: bool,
    pub skip_data: bool,
    pub expand_pulses: bool,
    pub annotate_pulses: bool,
}

fn dump_string<W: Write>(out: &mut W, prefix: &str, data: &[u8]) -> io::Result<()> {
    write!(out, "{} \"", prefix)?;
    for &b in data {
        match b {
            b'\\' | b'"' => write!(out, "\\{}", b as char)?,
            b'\n' => write!(out, "\\n")?,
            b'\r' => write!(out, "\\r")?,
            b'\t' => write!(out, "\\t")?,
            _ if b < 32 => write!(out, "\\x{:02X}", b)?,
            _ => out.write_all(&[b])?,
        }
    }
    writeln!(out, "\"")
}

fn dump_strings<W: Write>(out: &mut W, prefix: &str, data: &[u8]) -> io::Result<()> {
    let mut start = 0usize;
    while start < data.len() {
        let end = data[start..].iter().position(|&b| b == 0).map_or(data.len(), |p| start + p);
        dump_string(out, prefix, &data[start..end])?;
        start = end + 1;
    }
    Ok(())
}

fn dump_data_line<W: Write>(out: &mut W, data: &[u8], dump_ascii: bool) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write!(out, "BODY ")?;
    for &b in data {
        if dump_ascii && b > 32 && b < 127 {
            write!(out, ".{}", b as char)?;
        } else {
            write!(out, "{:02X}", b)?;
        }
    }
    writeln!(out)
}

fn dump_data<W: Write>(out: &mut W, data: &[u8], dump_ascii: bool, options: &Options) -> io::Result<()> {
    if options.skip_data {
        return Ok(());
    }
    const LIMIT: usize = 32;
    let mut rest = data;
    while rest.len() > LIMIT {
        dump_data_line(out, &rest[..LIMIT], dump_ascii)?;
        rest = &rest[LIMIT..];
    }
    dump_data_line(out, rest, dump_ascii)
}

fn dump_pulses<W: Write>(out: &mut W, level: &mut bool, duration: u32, count: u32, options: &Options) -> io::Result<()> {
    if options.expand_pulses {
        for _ in 0..count {
            if options.annotate_pulses {
                writeln!(out, "PULSE{} {}", *level as u32, duration)?;
            } else {
                writeln!(out, "PULSE {}", duration)?;
            }
            *level = !*level;
        }
        return Ok(());
    }

    if options.annotate_pulses {
        write!(out, "PULSE{} {}", *level as u32, duration)?;
    } else {
        write!(out, "PULSE {}", duration)?;
    }
    if count > 1 {
        write!(out, " {}", count)?;
    }
    writeln!(out)?;
    if count & 1 != 0 {
        *level = !*level;
    }
    Ok(())
}

/// `sequence_0`/`sequence_1` hold `pulse_count_0`/`pulse_count_1` little-endian
/// u16 durations each.
fn dump_bits<W: Write>(
    out: &mut W,
    level: &mut bool,
    bit_count: u32,
    mut bits: u8,
    sequence_0: &[u16],
    sequence_1: &[u16],
    options: &Options,
) -> io::Result<()> {
    for _ in 0..bit_count {
        let sequence = if bits & 0x80 == 0 { sequence_0 } else { sequence_1 };
        bits <<= 1;
        for &duration in sequence {
            dump_pulses(out, level, duration as u32, 1, options)?;
        }
    }
    Ok(())
}

fn dump_bit_sequence<W: Write>(out: &mut W, index: u32, sequence: &[u16]) -> io::Result<()> {
    write!(out, "BIT{}", index)?;
    for &duration in sequence {
        write!(out, " {}", duration)?;
    }
    writeln!(out)
}

fn dump_data_block<W: Write>(out: &mut W, data: &[u8], options: &Options) -> io::Result<()> {
    let mut c = Cursor::new(data);

    let raw_bit_count = c.take_u32_le().unwrap_or_else(|_| fail!("incomplete block detected"));
    let tail_cycles = c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected")) as u32;
    let pulse_count_0 = c.take_u8().unwrap_or_else(|_| fail!("incomplete block detected")) as usize;
    let pulse_count_1 = c.take_u8().unwrap_or_else(|_| fail!("incomplete block detected")) as usize;

    let mut level = (raw_bit_count >> 31) != 0;
    let bit_count = raw_bit_count & 0x7FFF_FFFF;

    let mut sequence_0 = Vec::with_capacity(pulse_count_0);
    for _ in 0..pulse_count_0 {
        sequence_0.push(c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected")));
    }
    let mut sequence_1 = Vec::with_capacity(pulse_count_1);
    for _ in 0..pulse_count_1 {
        sequence_1.push(c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected")));
    }

    let body = c.rest();
    if body.len() != ((bit_count + 7) / 8) as usize {
        fail!("bit count {} does not match the actual data size {}", bit_count, body.len());
    }

    if options.dump_pulses {
        writeln!(out, "PULSES")?;

        if level {
            level = false;
            dump_pulses(out, &mut level, 0, 1, options)?;
        }

        let mut remaining = bit_count;
        let mut idx = 0usize;
        while remaining > 8 {
            dump_bits(out, &mut level, 8, body[idx], &sequence_0, &sequence_1, options)?;
            idx += 1;
            remaining -= 8;
        }
        dump_bits(out, &mut level, remaining, body[idx], &sequence_0, &sequence_1, options)?;

        if tail_cycles > 0 {
            dump_pulses(out, &mut level, tail_cycles, 1, options)?;
        }

        return Ok(());
    }

    writeln!(out, "DATA {}", level as u32)?;
    writeln!(out, "SIZE {}", bit_count / 8)?;
    if bit_count & 7 != 0 {
        writeln!(out, "BITS {}", bit_count & 7)?;
    }
    writeln!(out, "TAIL {}", tail_cycles)?;

    dump_bit_sequence(out, 0, &sequence_0)?;
    dump_bit_sequence(out, 1, &sequence_1)?;

    if options.dump_headers && body.len() == 19 {
        let leader = body[0];
        let kind = body[1];
        writeln!(out, "BYTE {} {}", leader, kind)?;

        dump_data_line(out, &body[2..12], true)?;

        let c2 = Cursor::new(&body[12..]);
        let size = c2.peek_u16_le(0).unwrap_or(0);
        let start = c2.peek_u16_le(2).unwrap_or(0);
        let extra = c2.peek_u16_le(4).unwrap_or(0);
        writeln!(out, "WORD {} {} {}", size, start, extra)?;

        let checksum = body[18];
        writeln!(out, "BYTE {}", checksum)?;
        return Ok(());
    }

    dump_data(out, body, options.dump_ascii, options)
}

fn dump_pulse_block<W: Write>(out: &mut W, data: &[u8], options: &Options) -> io::Result<()> {
    writeln!(out, "PULSES")?;

    let mut c = Cursor::new(data);
    let mut level = false;

    while !c.is_empty() {
        let mut count = 1u32;
        let mut duration = c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected")) as u32;

        if duration > 0x8000 {
            count = duration & 0x7FFF;
            duration = c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected")) as u32;
        }
        if duration >= 0x8000 {
            duration &= 0x7FFF;
            duration <<= 16;
            duration |= c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected")) as u32;
        }

        dump_pulses(out, &mut level, duration, count, options)?;
    }

    Ok(())
}

fn dump_block<W: Write>(out: &mut W, tag: &[u8; 4], data: &[u8], options: &Options) -> io::Result<()> {
    if tag == TAG_HEADER {
        let mut c = Cursor::new(data);
        let major = c.take_u8().unwrap_or_else(|_| fail!("incomplete block detected"));
        let minor = c.take_u8().unwrap_or_else(|_| fail!("incomplete block detected"));
        if major != PZX_MAJOR {
            fail!("unsupported PZX major version {}.{} - stopping", major, minor);
        }
        if minor > PZX_MINOR {
            warn!("unsupported PZX minor version {}.{} - proceeding", major, minor);
        }
        writeln!(out, "PZX {}.{}", major, minor)?;
        return dump_strings(out, "INFO", c.rest());
    }
    if tag == TAG_PULSES {
        return dump_pulse_block(out, data, options);
    }
    if tag == TAG_DATA {
        return dump_data_block(out, data, options);
    }
    if tag == TAG_PAUSE {
        let mut c = Cursor::new(data);
        let duration = c.take_u32_le().unwrap_or_else(|_| fail!("incomplete block detected"));
        return writeln!(out, "PAUSE {} {}", duration & 0x7FFF_FFFF, duration >> 31);
    }
    if tag == TAG_STOP {
        let mut c = Cursor::new(data);
        let flags = c.take_u16_le().unwrap_or_else(|_| fail!("incomplete block detected"));
        return writeln!(out, "STOP {}", flags);
    }
    if tag == TAG_BROWSE {
        return dump_string(out, "BROWSE", data);
    }

    write!(out, "TAG ")?;
    out.write_all(tag)?;
    writeln!(out)?;
    writeln!(out, "SIZE {}", data.len())?;
    dump_data(out, data, options.dump_ascii, options)
}

/// Convert a complete PZX byte stream to its text-dump representation.
/// pzx2txt.cpp's block loop in `main`.
pub fn write<R: Read, W: Write>(input: R, out: &mut W, options: &Options) -> io::Result<()> {
    let mut reader = BlockReader::open(input);
    let mut first = true;

    while let Some(block) = reader.next_block() {
        if !first {
            writeln!(out)?;
        }
        first = false;
        dump_block(out, &block.tag, &block.data, options)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pzx::Writer;

    #[test]
    fn header_and_pulses_round_trip_to_text() {
        let mut w = Writer::open(Vec::new());
        w.info(b"Some tape");
        w.out(100, true).unwrap();
        let bytes = w.close().unwrap();

        let mut out = Vec::new();
        write(bytes.as_slice(), &mut out, &Options::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("PZX 1.0\n"));
        assert!(text.contains("INFO \"Some tape\"\n"));
        assert!(text.contains("PULSES\n"));
    }
}
