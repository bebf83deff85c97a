//! Input/output file opening shared by all six conversion binaries.
//!
//! Every tool in pzxtools accepts an optional positional input file name
//! (falling back to standard input) and an optional `-o` output file name
//! (falling back to standard output). This mirrors the repeated opening
//! idiom in e.g. csw2pzx.cpp's `main`.

use std::fs::File;
use std::io::{self, Read, Write};

use crate::fail;

/// Open the named input file, or standard input if `name` is `None`.
pub fn open_input(name: Option<&str>) -> Box<dyn Read> {
    match name {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(f),
            Err(_) => fail!("unable to open input file"),
        },
        None => Box::new(io::stdin()),
    }
}

/// Open the named output file for writing (truncating), or standard output
/// if `name` is `None`.
pub fn open_output(name: Option<&str>) -> Box<dyn Write> {
    match name {
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(f),
            Err(_) => fail!("unable to open output file"),
        },
        None => Box::new(io::stdout()),
    }
}

/// Minimal argv scanner shared by every binary's option loop: walks `args`,
/// handing plain tokens to `input_name` (fails if called twice — "multiple
/// input file names specified") and `-o <path>` to `output_name`, while
/// letting the caller's `extra` closure handle tool-specific flags.
///
/// `extra` is called with the current flag and the full `args` slice plus the
/// flag's index; it returns `Some(n)` (the flag plus `n` further positional
/// arguments it consumed, e.g. 1 for `-p <ms>`) on success, or `None` to
/// trigger the usage diagnostic via `usage`.
pub fn parse_common_args<'a>(
    args: &'a [String],
    mut extra: impl FnMut(&str, usize, &'a [String]) -> Option<usize>,
    usage: impl Fn() -> !,
) -> (Option<&'a str>, Option<&'a str>) {
    let mut input_name: Option<&str> = None;
    let mut output_name: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if !arg.starts_with('-') || arg == "-" {
            if input_name.is_some() {
                fail!("multiple input file names specified");
            }
            input_name = Some(arg);
            i += 1;
            continue;
        }
        match arg.as_bytes().get(1).copied() {
            Some(b'o') => {
                i += 1;
                if output_name.is_some() {
                    fail!("multiple output file names specified");
                }
                output_name = args.get(i).map(|s| s.as_str());
                i += 1;
            }
            Some(b'h') => usage(),
            _ => match extra(arg, i, args) {
                Some(consumed) => i += 1 + consumed,
                None => usage(),
            },
        }
    }

    (input_name, output_name)
}
