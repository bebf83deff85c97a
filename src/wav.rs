//! WAV sink: accumulates pulses at a given sample rate into 8-bit unsigned
//! PCM samples and writes a RIFF/WAVE file. Rust port of wav.cpp/wav.h.
//!
//! The original keeps `sample_buffer`/`sample_value`/`sample_duration` as
//! file-scoped globals bound by `wav_open`; here they are fields of an owned
//! [`WavWriter`], matching the approach already taken for [`crate::pzx::Writer`].

use std::io::{self, Write};

use crate::buffer::{Buffer, Order};

const WAV_HEADER: &[u8; 4] = b"RIFF";
const WAV_WAVE: &[u8; 4] = b"WAVE";
const WAV_FORMAT: &[u8; 4] = b"fmt ";
const WAV_DATA: &[u8; 4] = b"data";

/// Resamples a pulse stream at a given `numerator`/`denominator` (typically
/// sample rate / 3,500,000 T cycles per second) into 8-bit unsigned PCM
/// samples and writes the result as a WAV file on [`close`](Self::close).
pub struct WavWriter<W: Write> {
    sink: W,
    numerator: u32,
    denominator: u32,
    samples: Buffer,
    sample_value: u32,
    sample_duration: u32,
}

impl<W: Write> WavWriter<W> {
    /// Bind a fresh sink. `numerator` is the desired sample rate in Hz;
    /// `denominator` is the clock all incoming durations are expressed in
    /// (the T-cycle rate, 3,500,000). wav.cpp's `wav_open`.
    pub fn open(sink: W, numerator: u32, denominator: u32) -> Self {
        debug_assert!(numerator > 0);
        debug_assert!(denominator > 0);
        WavWriter {
            sink,
            numerator,
            denominator,
            samples: Buffer::new(),
            sample_value: 0,
            sample_duration: 0,
        }
    }

    /// Append a pulse of given duration and level. wav.cpp's `wav_out`.
    pub fn out(&mut self, duration: u32, level: bool) {
        let mut time_passed = u64::from(duration) * u64::from(self.numerator);
        let time_left = self.denominator - self.sample_duration;

        if time_passed >= u64::from(time_left) {
            time_passed -= u64::from(time_left);
            if level {
                self.sample_value += time_left;
            }
            self.samples.append_u8(sample_level(self.sample_value, self.denominator));
            self.sample_value = 0;
            self.sample_duration = 0;
        }

        while time_passed >= u64::from(self.denominator) {
            self.samples.append_u8(if level { 255 } else { 0 });
            time_passed -= u64::from(self.denominator);
        }

        self.sample_duration += time_passed as u32;
        if level {
            self.sample_value += time_passed as u32;
        }
    }

    fn flush_partial_sample(&mut self) {
        if self.sample_duration > 0 {
            self.samples.append_u8(sample_level(self.sample_value, self.denominator));
            self.sample_value = 0;
            self.sample_duration = 0;
        }
    }

    /// Flush any partial sample, write the RIFF/WAVE/fmt/data chunks, and
    /// return the underlying sink. wav.cpp's `wav_close`.
    pub fn close(mut self) -> io::Result<W> {
        self.flush_partial_sample();

        if self.samples.len() % 2 != 0 {
            self.samples.append_u8(0);
        }
        let size = self.samples.len() as u32;

        let mut header = Buffer::new();
        header.append(WAV_HEADER);
        header.append_u32(4 + (8 + 16) + (8 + size), Order::Little);
        header.append(WAV_WAVE);

        header.append(WAV_FORMAT);
        header.append_u32(16, Order::Little);
        header.append_u16(1, Order::Little); // PCM
        header.append_u16(1, Order::Little); // mono
        header.append_u32(self.numerator, Order::Little); // sample rate
        header.append_u32(self.numerator, Order::Little); // byte rate (1 byte/sample)
        header.append_u16(1, Order::Little); // block align
        header.append_u16(8, Order::Little); // bits per sample

        header.append(WAV_DATA);
        header.append_u32(size, Order::Little);

        self.sink.write_all(header.data())?;
        self.sink.write_all(self.samples.data())?;

        Ok(self.sink)
    }
}

fn sample_level(value: u32, denominator: u32) -> u8 {
    (255u64 * u64::from(value) / u64::from(denominator)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_high_pulse_fills_full_sample() {
        let mut w = WavWriter::open(Vec::new(), 44100, 3_500_000);
        w.out(3_500_000 / 44100, true);
        let out = w.close().unwrap();
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(&out[8..12], b"WAVE");
    }

    #[test]
    fn odd_sample_count_is_padded_even() {
        let mut w = WavWriter::open(Vec::new(), 44100, 3_500_000);
        w.out(3_500_000 / 44100, true);
        let out = w.close().unwrap();
        let data_size = u32::from_le_bytes([out[40], out[41], out[42], out[43]]) as usize;
        assert_eq!(data_size % 2, 0);
        assert_eq!(out.len(), 44 + data_size);
    }
}
