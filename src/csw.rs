//! CSW ("Compressed Square Wave") rendering. Rust port of csw.cpp/csw.h.
//!
//! CSW encodes a pulse train as one byte per pulse (a sample count at the
//! file's sample rate), falling back to a 4-byte little-endian count when the
//! single byte would be zero. `render_block` renders such a stream straight
//! to a [`Writer`]; `render` additionally parses the CSW v1/v2 file header
//! around it.

use std::io::{self, Write};

use crate::buffer::Cursor;
use crate::config::REFERENCE_CLOCK_HZ;
use crate::pzx::Writer;
use crate::{fail, hope, warn};

const MAGIC: &[u8] = b"Compressed Square Wave\x1a";

/// Render a raw (uncompressed) CSW pulse stream to `writer`, flipping `level`
/// after every pulse. Returns the number of pulses rendered. csw.cpp's first
/// `csw_render_block` overload.
pub fn render_raw_block<W: Write>(writer: &mut Writer<W>, level: &mut bool, sample_rate: u32, data: &[u8]) -> io::Result<u32> {
    hope!(sample_rate > 0);

    let mut p = 0usize;
    let mut pulse_count = 0u32;

    while p < data.len() {
        let mut sample_count = data[p] as u64;
        p += 1;

        if sample_count == 0 {
            if data.len() - p < 4 {
                warn!("premature end of CSW data detected");
                break;
            }
            sample_count = u32::from_le_bytes([data[p], data[p + 1], data[p + 2], data[p + 3]]) as u64;
            p += 4;
        }

        let mut duration = (REFERENCE_CLOCK_HZ * sample_count) / sample_rate as u64;
        const LIMIT: u64 = 0xFFFF_FFFF;

        while duration > LIMIT {
            writer.out(LIMIT as u32, *level)?;
            duration -= LIMIT;
        }
        writer.out(duration as u32, *level)?;

        *level = !*level;
        pulse_count += 1;
    }

    Ok(pulse_count)
}

/// Inflate a CSW "Z-RLE" (zlib-wrapped DEFLATE) compressed block.
fn unpack_block(data: &[u8]) -> Vec<u8> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(data);
    if let Err(e) = decoder.read_to_end(&mut out) {
        warn!("error while decompressing CSW block: {}", e);
    }
    out
}

/// Render a CSW pulse block under the given compression scheme (1 = raw,
/// 2 = Z-RLE/DEFLATE). csw.cpp's second `csw_render_block` overload.
pub fn render_block<W: Write>(
    writer: &mut Writer<W>,
    level: &mut bool,
    compression: u32,
    sample_rate: u32,
    data: &[u8],
) -> io::Result<u32> {
    match compression {
        1 => render_raw_block(writer, level, sample_rate, data),
        2 => {
            let unpacked = unpack_block(data);
            render_raw_block(writer, level, sample_rate, &unpacked)
        }
        other => {
            warn!("unsupported CSW compression 0x{:02x} scheme", other);
            Ok(0)
        }
    }
}

/// Render a complete CSW file (header + pulse data) to `writer`. csw.cpp's
/// `csw_render`.
pub fn render<W: Write>(writer: &mut Writer<W>, data: &[u8]) -> io::Result<()> {
    hope!(data.len() >= 0x20);

    if data.len() < 32 || &data[..23] != MAGIC {
        fail!("input is not a CSW file");
    }

    let major = data[0x17] as u32;
    let minor = data[0x18] as u32;

    let (supported_minor, mut header_size) = match major {
        1 => (1, 0x20usize),
        2 => (0, 0x34usize),
        _ => fail!("unsupported CSW major version {}.{:02}", major, minor),
    };

    if header_size > data.len() {
        fail!("CSW header is incomplete");
    }

    if minor > supported_minor {
        warn!("unsupported CSW minor version {}.{:02} - proceeding", major, minor);
    }

    let c = Cursor::new(data);
    let (sample_rate, compression, flags) = match major {
        1 => {
            let sample_rate = c.peek_u16_le(0x19).unwrap_or(0) as u32;
            let compression = data[0x1B] as u32;
            let flags = data[0x1C] as u32;
            (sample_rate, compression, flags)
        }
        2 => {
            let sample_rate = c.peek_u32_le(0x19).unwrap_or(0);
            let compression = data[0x21] as u32;
            let flags = data[0x22] as u32;
            header_size += data[0x23] as usize;
            (sample_rate, compression, flags)
        }
        _ => unreachable!(),
    };

    if sample_rate == 0 {
        fail!("invalid CSW sample rate {}", sample_rate);
    }

    if header_size > data.len() {
        fail!("CSW file is incomplete");
    }

    let block = &data[header_size..];
    let mut level = (flags & 1) != 0;

    let pulse_count = render_block(writer, &mut level, compression, sample_rate, block)?;

    if major == 2 {
        let expected = c.peek_u32_le(0x1D).unwrap_or(0);
        if pulse_count != expected {
            warn!(
                "real CSW pulse count {} doesn't match the advertised pulse count {}",
                pulse_count, expected
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_block_splits_zero_marker_into_four_byte_count() {
        let mut w = Writer::open(Vec::new());
        let mut level = false;
        let data = [0u8, 10, 0, 0, 0];
        let count = render_raw_block(&mut w, &mut level, 44100, &data).unwrap();
        assert_eq!(count, 1);
        assert!(level);
    }

    #[test]
    fn single_byte_sample_counts_accumulate_pulses() {
        let mut w = Writer::open(Vec::new());
        let mut level = false;
        let data = [5u8, 10, 15];
        let count = render_raw_block(&mut w, &mut level, 44100, &data).unwrap();
        assert_eq!(count, 3);
        assert!(!level);
    }

    #[test]
    fn unsupported_compression_warns_and_renders_nothing() {
        let mut w = Writer::open(Vec::new());
        let mut level = false;
        let count = render_block(&mut w, &mut level, 9, 44100, &[1, 2, 3]).unwrap();
        assert_eq!(count, 0);
    }
}
