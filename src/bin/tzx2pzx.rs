//! TZX->PZX convertor. Same trivial option set as csw2pzx/tap2pzx; the TZX
//! interpreter itself lives in [`pzx::tzx::render`].

use std::io::Read;

use pzx::cli::io::{open_input, open_output, parse_common_args};
use pzx::config::TZX_MAJOR;
use pzx::pzx::Writer;
use pzx::{fail, tzx, warn};

const SIGNATURE: &[u8; 8] = b"ZXTape!\x1A";

fn usage() -> ! {
    eprintln!("usage: tzx2pzx [-o output_file] [input_file]");
    eprintln!("-o f   write output to given file instead of standard output");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (input_name, output_name) = parse_common_args(&args, |_, _, _| None, usage);

    let mut input = open_input(input_name);
    let mut file = Vec::new();
    input.read_to_end(&mut file)?;

    if file.len() < 10 || &file[0..8] != SIGNATURE {
        fail!("input is not a TZX file");
    }
    let major = file[8];
    let minor = file[9];
    if major != TZX_MAJOR {
        fail!("unsupported TZX major version {}.{} - stopping", major, minor);
    }
    if minor > pzx::config::TZX_MINOR {
        warn!("unsupported TZX minor version {}.{} - proceeding", major, minor);
    }

    let output = open_output(output_name);
    let mut writer = Writer::open(output);
    tzx::render(&mut writer, &file[10..])?;
    writer.close()?;

    Ok(())
}
