//! TAP->PZX convertor. Rust port of tap2pzx.cpp's `main`.

use std::io::Read;

use pzx::cli::io::{open_input, open_output, parse_common_args};
use pzx::config::MILLISECOND_CYCLES;
use pzx::pzx::Writer;
use pzx::{fail, tap};

fn usage() -> ! {
    eprintln!("usage: tap2pzx [-p n] [-o output_file] [input_file]");
    eprintln!("-o f   write output to given file instead of standard output");
    eprintln!("-p n   separate TAP blocks with pause of given duration (in ms)");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut pause_ms: u32 = 0;

    let (input_name, output_name) = parse_common_args(
        &args,
        |flag, i, args| {
            if flag.as_bytes().get(1) != Some(&b'p') {
                return None;
            }
            let value: u32 = args.get(i + 1)?.parse().ok()?;
            if value > 10 * 60 * 1000 {
                fail!("pause duration {}ms is out of range", value);
            }
            pause_ms = value;
            Some(1)
        },
        usage,
    );

    let mut input = open_input(input_name);
    let mut tape = Vec::new();
    input.read_to_end(&mut tape)?;

    let output = open_output(output_name);
    let mut writer = Writer::open(output);
    tap::render(&mut writer, &tape, pause_ms * MILLISECOND_CYCLES)?;
    writer.close()?;

    Ok(())
}
