//! PZX->WAV convertor. Rust port of pzx2wav.cpp's `main` and block renderers.

use pzx::buffer::Cursor;
use pzx::cli::io::{open_input, open_output, parse_common_args};
use pzx::config::{DEFAULT_SAMPLE_RATE, PZX_MAJOR, PZX_MINOR, REFERENCE_CLOCK_HZ};
use pzx::fail;
use pzx::pzx::format::{TAG_DATA, TAG_HEADER, TAG_PAUSE, TAG_PULSES};
use pzx::pzx::BlockReader;
use pzx::wav::WavWriter;
use pzx::warn;

fn usage() -> ! {
    eprintln!("usage: pzx2wav [-s n] [-o output_file] [input_file]");
    eprintln!("-o f   write output to given file instead of standard output");
    eprintln!("-s n   use given sample rate instead of default {}Hz", DEFAULT_SAMPLE_RATE);
    std::process::exit(1);
}

fn render_bits(
    level: &mut bool,
    wav: &mut WavWriter<Box<dyn std::io::Write>>,
    bit_count: u32,
    mut bits: u8,
    sequence_0: &[u16],
    sequence_1: &[u16],
) {
    for _ in 0..bit_count {
        let sequence = if bits & 0x80 == 0 { sequence_0 } else { sequence_1 };
        bits <<= 1;
        for &duration in sequence {
            wav.out(duration as u32, *level);
            *level = !*level;
        }
    }
}

fn render_data_block(wav: &mut WavWriter<Box<dyn std::io::Write>>, data: &[u8]) {
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

    let mut remaining = bit_count;
    let mut idx = 0usize;
    while remaining > 8 {
        render_bits(&mut level, wav, 8, body[idx], &sequence_0, &sequence_1);
        idx += 1;
        remaining -= 8;
    }
    render_bits(&mut level, wav, remaining, body[idx], &sequence_0, &sequence_1);

    wav.out(tail_cycles, level);
}

fn render_pulse_block(wav: &mut WavWriter<Box<dyn std::io::Write>>, data: &[u8]) {
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

        for _ in 0..count {
            wav.out(duration, level);
            level = !level;
        }
    }
}

fn render_block(wav: &mut WavWriter<Box<dyn std::io::Write>>, tag: &[u8; 4], data: &[u8]) {
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
        return;
    }
    if tag == TAG_PULSES {
        return render_pulse_block(wav, data);
    }
    if tag == TAG_DATA {
        return render_data_block(wav, data);
    }
    if tag == TAG_PAUSE {
        let mut c = Cursor::new(data);
        let duration = c.take_u32_le().unwrap_or_else(|_| fail!("incomplete block detected"));
        wav.out(duration & 0x7FFF_FFFF, (duration >> 31) != 0);
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut sample_rate = 0u32;

    let (input_name, output_name) = parse_common_args(
        &args,
        |flag, i, args| {
            if flag.as_bytes().get(1) != Some(&b's') {
                return None;
            }
            sample_rate = args.get(i + 1)?.parse().ok()?;
            Some(1)
        },
        usage,
    );

    let input = open_input(input_name);
    let mut reader = BlockReader::open(input);

    let sample_rate = if sample_rate > 0 { sample_rate } else { DEFAULT_SAMPLE_RATE };

    let output = open_output(output_name);
    let mut wav = WavWriter::open(output, sample_rate, REFERENCE_CLOCK_HZ as u32);

    while let Some(block) = reader.next_block() {
        render_block(&mut wav, &block.tag, &block.data);
    }

    wav.close()?;

    Ok(())
}
