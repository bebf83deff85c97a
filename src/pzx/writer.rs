//! The PZX pulse-stream writer. Rust port of pzx.cpp's free functions
//! (`pzx_open`/`pzx_header`/`pzx_info`/`pzx_store`/`pzx_pulse`/`pzx_out`/
//! `pzx_flush`/`pzx_data`/`pzx_pause`/`pzx_stop`/`pzx_browse`/`pzx_close`).
//!
//! The original keeps all of this as module-level globals in an anonymous
//! namespace (`output_file`, `header_buffer`, `pulse_buffer`, ...). Per §9
//! "Design Notes" these become fields of an explicit, owned [`Writer`] value
//! so that nothing persists across conversions and two writers never share
//! state.

use std::io::{self, Write};

use crate::buffer::{Buffer, Order};
use crate::config::{MAX_PULSE_DURATION, PULSE_BUFFER_SOFT_CAP, PZX_MAJOR, PZX_MINOR};
use crate::hope;
use crate::pzx::format::{TAG_BROWSE, TAG_DATA, TAG_HEADER, TAG_PAUSE, TAG_PULSES, TAG_STOP};

/// Owns the pending pulse state machine and the three buffers described in
/// §3 "Data model" (header, pulses, data/scratch), plus the output sink.
pub struct Writer<W: Write> {
    sink: W,
    header: Buffer,
    pulses: Buffer,
    scratch: Buffer,
    last_level: bool,
    last_duration: u32,
    pulse_count: u32,
    pulse_duration: u32,
}

impl<W: Write> Writer<W> {
    /// Bind a fresh writer to `sink`. Primes the header buffer with the two
    /// version bytes. pzx.cpp's `pzx_open` + `pzx_header(NULL, 0)`.
    pub fn open(sink: W) -> Self {
        let mut header = Buffer::new();
        header.append_u8(PZX_MAJOR);
        header.append_u8(PZX_MINOR);
        Writer {
            sink,
            header,
            pulses: Buffer::new(),
            scratch: Buffer::new(),
            last_level: false,
            last_duration: 0,
            pulse_count: 0,
            pulse_duration: 0,
        }
    }

    /// Append raw bytes to the pending header block. pzx.cpp's `pzx_header`.
    pub fn header_append(&mut self, bytes: &[u8]) {
        self.header.append(bytes);
    }

    /// Append a UTF-8 info string. Subsequent infos are separated by a
    /// single zero byte once the header already carries user data past the
    /// two version bytes. pzx.cpp's `pzx_info`.
    pub fn info(&mut self, bytes: &[u8]) {
        if self.header.len() > 2 {
            self.header.append_u8(0);
        }
        self.header_append(bytes);
    }

    /// Commit a (count, duration) run to the pulse buffer using the
    /// short/long encoding from §6.1, auto-flushing the run as an
    /// independent PULSES block if the soft cap is exceeded (§5 ordering
    /// guarantee (d)). pzx.cpp's `pzx_store`.
    pub fn store(&mut self, count: u32, duration: u32) -> io::Result<()> {
        hope!(count < 0x8000);
        hope!(duration < 0x8000_0000);

        if count == 0 {
            return Ok(());
        }

        if count > 1 || duration > 0xFFFF {
            self.pulses.append_u16(0x8000 | count as u16, Order::Little);
        }

        if duration < 0x8000 {
            self.pulses.append_u16(duration as u16, Order::Little);
        } else {
            self.pulses
                .append_u16(0x8000 | (duration >> 16) as u16, Order::Little);
            self.pulses.append_u16((duration & 0xFFFF) as u16, Order::Little);
        }

        if self.pulses.len() > PULSE_BUFFER_SOFT_CAP {
            self.write_buffer_pulses()?;
        }
        Ok(())
    }

    /// Append a raw repeat-able pulse to the pulse run, merging it into the
    /// pending repeat if it matches. pzx.cpp's `pzx_pulse`.
    pub fn pulse(&mut self, duration: u32) -> io::Result<()> {
        hope!(duration < 0x8000_0000);

        if self.pulse_count > 0 {
            if self.pulse_duration == duration && self.pulse_count < 0x7FFF {
                self.pulse_count += 1;
                return Ok(());
            }
            self.store(self.pulse_count, self.pulse_duration)?;
        }

        self.pulse_duration = duration;
        self.pulse_count = 1;
        Ok(())
    }

    /// Append a pulse of given level, merging same-level contributions and
    /// splitting durations over the 31-bit limit. pzx.cpp's `pzx_out`.
    pub fn out(&mut self, duration: u32, level: bool) -> io::Result<()> {
        if duration == 0 {
            return Ok(());
        }

        if duration > MAX_PULSE_DURATION {
            self.out(MAX_PULSE_DURATION, level)?;
            return self.out(duration - MAX_PULSE_DURATION, level);
        }

        if self.last_level != level {
            self.pulse(self.last_duration)?;
            self.last_duration = 0;
            self.last_level = level;
        }

        self.last_duration += duration;

        if self.last_duration > MAX_PULSE_DURATION {
            self.pulse(MAX_PULSE_DURATION)?;
            self.pulse(0)?;
            self.last_duration -= MAX_PULSE_DURATION;
        }

        Ok(())
    }

    /// Unpacked fallback: emit each pulse with alternating level, then an
    /// optional tail pulse. pzx.cpp's `pzx_pulses`.
    pub fn pulses(&mut self, pulses: &[u16], initial_level: bool, tail_cycles: u32) -> io::Result<()> {
        let mut level = initial_level;
        for &d in pulses {
            self.out(d as u32, level)?;
            level = !level;
        }
        self.out(tail_cycles, level)
    }

    /// Commit any pending header, then pending `last` pulse, then pending
    /// `repeat` run, then emit the PULSES block if non-empty. The sole exit
    /// path for pending state — pzx.cpp's `pzx_flush`.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.header.is_empty() {
            self.write_block_from_buffer(TAG_HEADER, BufferSlot::Header)?;
        }

        if self.last_duration > 0 {
            self.pulse(self.last_duration)?;
            self.last_duration = 0;
            self.last_level = false;
        }

        if self.pulse_count > 0 {
            self.store(self.pulse_count, self.pulse_duration)?;
            self.pulse_count = 0;
        }

        if !self.pulses.is_empty() {
            self.write_buffer_pulses()?;
        }

        Ok(())
    }

    /// Emit a DATA block: flushes pending pulse state first, then writes the
    /// header fields and bit stream described in §3. pzx.cpp's `pzx_data`.
    #[allow(clippy::too_many_arguments)]
    pub fn data(
        &mut self,
        bits: &[u8],
        bit_count: u32,
        initial_level: bool,
        seq0: &[u16],
        seq1: &[u16],
        tail_cycles: u16,
    ) -> io::Result<()> {
        hope!(seq0.len() <= 0xFF);
        hope!(seq1.len() <= 0xFF);

        self.flush()?;

        self.scratch.clear();
        self.scratch
            .append_u32(((initial_level as u32) << 31) | bit_count, Order::Little);
        self.scratch.append_u16(tail_cycles, Order::Little);
        self.scratch.append_u8(seq0.len() as u8);
        self.scratch.append_u8(seq1.len() as u8);
        for &p in seq0 {
            self.scratch.append_u16(p, Order::Little);
        }
        for &p in seq1 {
            self.scratch.append_u16(p, Order::Little);
        }
        self.scratch.append(&bits[..((bit_count as usize + 7) / 8)]);

        self.write_block_from_buffer(TAG_DATA, BufferSlot::Scratch)
    }

    /// Emit a PAUS block. `duration` must fit 31 bits; `level` is folded
    /// into the high bit. pzx.cpp's `pzx_pause`.
    pub fn pause(&mut self, duration: u32, level: bool) -> io::Result<()> {
        hope!(duration < 0x8000_0000);

        self.flush()?;
        self.scratch.clear();
        self.scratch
            .append_u32(((level as u32) << 31) | duration, Order::Little);
        self.write_block_from_buffer(TAG_PAUSE, BufferSlot::Scratch)
    }

    /// Emit a STOP block (flags 0 = always, 1 = 48K only). pzx.cpp's `pzx_stop`.
    pub fn stop(&mut self, flags: u16) -> io::Result<()> {
        self.flush()?;
        self.scratch.clear();
        self.scratch.append_u16(flags, Order::Little);
        self.write_block_from_buffer(TAG_STOP, BufferSlot::Scratch)
    }

    /// Emit a BRWS block verbatim. pzx.cpp's `pzx_browse`.
    pub fn browse(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.flush()?;
        self.write_raw_block(TAG_BROWSE, bytes)
    }

    /// Write a raw, unrecognized block verbatim — used by the text-dump
    /// reader to round-trip unknown tags (§4.6).
    pub fn write_unknown_block(&mut self, tag: [u8; 4], bytes: &[u8]) -> io::Result<()> {
        self.flush()?;
        self.write_raw_block(&tag, bytes)
    }

    /// Flush and unbind. pzx.cpp's `pzx_close`.
    pub fn close(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    /// Packer hook used by [`crate::pzx::packer`] to emit its own DATA block
    /// once a packing attempt succeeds, and to reuse the pending-pulse
    /// machinery for the unpacked fallback.
    pub(crate) fn data_raw(
        &mut self,
        bits: &[u8],
        bit_count: u32,
        initial_level: bool,
        seq0: &[u16],
        seq1: &[u16],
        tail_cycles: u16,
    ) -> io::Result<()> {
        self.data(bits, bit_count, initial_level, seq0, seq1, tail_cycles)
    }

    fn write_raw_block(&mut self, tag: &[u8; 4], bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(tag)?;
        self.sink.write_all(&(bytes.len() as u32).to_le_bytes())?;
        self.sink.write_all(bytes)
    }

    fn write_block_from_buffer(&mut self, tag: &[u8; 4], slot: BufferSlot) -> io::Result<()> {
        let buf = match slot {
            BufferSlot::Header => &mut self.header,
            BufferSlot::Scratch => &mut self.scratch,
        };
        let len = buf.len() as u32;
        self.sink.write_all(tag)?;
        self.sink.write_all(&len.to_le_bytes())?;
        self.sink.write_all(buf.data())?;
        buf.clear();
        Ok(())
    }

    fn write_buffer_pulses(&mut self) -> io::Result<()> {
        let len = self.pulses.len() as u32;
        self.sink.write_all(TAG_PULSES)?;
        self.sink.write_all(&len.to_le_bytes())?;
        self.sink.write_all(self.pulses.data())?;
        self.pulses.clear();
        Ok(())
    }
}

enum BufferSlot {
    Header,
    Scratch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_conversion_emits_minimal_header() {
        let mut w = Writer::open(Vec::new());
        let out = w.close().unwrap();
        assert_eq!(out, vec![0x50, 0x5A, 0x58, 0x54, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn single_pulse_at_high_level() {
        let mut w = Writer::open(Vec::new());
        w.out(100, true).unwrap();
        let out = w.close().unwrap();
        let expected: &[u8] = &[
            0x50, 0x5A, 0x58, 0x54, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x50, 0x55, 0x4C, 0x53,
            0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x64, 0x00,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn run_of_identical_pulses_collapses_to_one_encoding() {
        let mut w = Writer::open(Vec::new());
        for _ in 0..5 {
            w.pulse(2168).unwrap();
        }
        w.flush().unwrap();
        let out = w.close().unwrap();
        // header (10 bytes) + PULS tag+size (8 bytes) + payload.
        let payload = &out[18..];
        assert_eq!(payload, &[0x05, 0x80, 0x78, 0x08]);
    }

    #[test]
    fn duration_over_limit_splits_into_two_pulses_same_level() {
        let mut w = Writer::open(Vec::new());
        w.out(0x8000_0000, true).unwrap();
        w.flush().unwrap();
        assert_eq!(w.last_duration, 0);
    }

    #[test]
    fn flush_drains_both_pending_states() {
        let mut w = Writer::open(Vec::new());
        w.out(10, true).unwrap();
        w.out(20, false).unwrap();
        w.flush().unwrap();
        assert_eq!(w.pulse_count, 0);
        assert_eq!(w.last_duration, 0);
    }
}
