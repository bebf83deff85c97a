//! Text dump->PZX convertor. Rust port of txt2pzx.cpp's `main`.

use pzx::cli::io::{open_input, open_output, parse_common_args};
use pzx::pzx::Writer;
use pzx::text::read::read;

fn usage() -> ! {
    eprintln!("usage: txt2pzx [-p] [-o output_file] [input_file]");
    eprintln!("-o f   write output to given file instead of standard output");
    eprintln!("-p     store pulse sequences exactly as specified");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut preserve_pulses = false;

    let (input_name, output_name) = parse_common_args(
        &args,
        |flag, _, _| {
            if flag.as_bytes().get(1) == Some(&b'p') {
                preserve_pulses = true;
                Some(0)
            } else {
                None
            }
        },
        usage,
    );

    let input = open_input(input_name);
    let output = open_output(output_name);

    let mut writer = Writer::open(output);
    read(input, &mut writer, preserve_pulses)?;
    writer.close()?;

    Ok(())
}
