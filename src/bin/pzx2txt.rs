//! PZX->text dump convertor. Rust port of pzx2txt.cpp's `main`.

use pzx::cli::io::{open_input, open_output, parse_common_args};
use pzx::text::write::{write, Options};

fn usage() -> ! {
    eprintln!("usage: pzx2txt [-p|-a|-x|-d|-e] [-o output_file] [input_file]");
    eprintln!("-o f   write output to given file instead of standard output");
    eprintln!("-p     dump bytes in data blocks as pulses");
    eprintln!("-a     dump bytes in data blocks as ASCII characters when possible");
    eprintln!("-x     dump bytes in data blocks as headers when possible");
    eprintln!("-d     don't dump content of data blocks");
    eprintln!("-e     expand pulses, dumping each one on separate line");
    eprintln!("-l     print initial level of each pulse dumped");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut options = Options::default();

    let (input_name, output_name) = parse_common_args(
        &args,
        |flag, _, _| match flag.as_bytes().get(1) {
            Some(b'p') => {
                options.dump_pulses = true;
                Some(0)
            }
            Some(b'a') => {
                options.dump_ascii = true;
                Some(0)
            }
            Some(b'x') => {
                options.dump_headers = true;
                Some(0)
            }
            Some(b'd') => {
                options.skip_data = true;
                Some(0)
            }
            Some(b'e') => {
                options.expand_pulses = true;
                Some(0)
            }
            Some(b'l') => {
                options.annotate_pulses = true;
                Some(0)
            }
            _ => None,
        },
        usage,
    );

    let input = open_input(input_name);
    let mut output = open_output(output_name);
    write(input, &mut output, &options)?;

    Ok(())
}
