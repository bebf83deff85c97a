//! CSW->PZX convertor. Rust port of csw2pzx.cpp's `main`.

use std::io::Read;

use pzx::cli::io::{open_input, open_output, parse_common_args};
use pzx::csw;
use pzx::pzx::Writer;

fn usage() -> ! {
    eprintln!("usage: csw2pzx [-o output_file] [input_file]");
    eprintln!("-o f   write output to given file instead of standard output");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (input_name, output_name) = parse_common_args(&args, |_, _, _| None, usage);

    let mut input = open_input(input_name);
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;

    let output = open_output(output_name);
    let mut writer = Writer::open(output);
    csw::render(&mut writer, &data)?;
    writer.close()?;

    Ok(())
}
