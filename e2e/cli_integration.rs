// e2e/cli_integration.rs — black-box CLI tests for the six conversion
// binaries, run as separate processes via std::process::Command.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn bin(name: &str) -> PathBuf {
    if let Ok(p) = std::env::var(format!("CARGO_BIN_EXE_{name}")) {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push(name);
    p
}

/// One TAP block: 2-byte length prefix, one data byte with the high bit
/// clear (selects the long/header leader).
fn minimal_tap() -> Vec<u8> {
    vec![1, 0, 0x00]
}

#[test]
fn tap2pzx_produces_pzx_header() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.tap");
    let output = dir.path().join("out.pzx");
    fs::write(&input, minimal_tap()).unwrap();

    let status = Command::new(bin("tap2pzx"))
        .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .expect("failed to run tap2pzx");
    assert!(status.success(), "tap2pzx should exit 0");

    let out = fs::read(&output).unwrap();
    assert_eq!(&out[0..4], b"PZXT", "output must open with a PZXT header block");
}

#[test]
fn tap2pzx_rejects_out_of_range_pause() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.tap");
    fs::write(&input, minimal_tap()).unwrap();

    let status = Command::new(bin("tap2pzx"))
        .args(["-p", "99999999", input.to_str().unwrap()])
        .status()
        .expect("failed to run tap2pzx");
    assert!(!status.success(), "an out-of-range -p value must fail");
}

#[test]
fn tap2pzx_rejects_truncated_block_header() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.tap");
    fs::write(&input, [0x42]).unwrap(); // a single byte is not a full length prefix

    let status = Command::new(bin("tap2pzx"))
        .args([input.to_str().unwrap()])
        .status()
        .expect("failed to run tap2pzx");
    assert!(!status.success(), "a truncated TAP block header must fail");
}

#[test]
fn csw2pzx_rejects_nonexistent_input() {
    let status = Command::new(bin("csw2pzx"))
        .args(["/nonexistent_path_pzxtools_test.csw"])
        .status()
        .expect("failed to run csw2pzx");
    assert!(!status.success(), "a missing input file must fail");
}

#[test]
fn tzx2pzx_rejects_bad_signature() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.tzx");
    fs::write(&input, b"not a tzx file at all").unwrap();

    let status = Command::new(bin("tzx2pzx"))
        .args([input.to_str().unwrap()])
        .status()
        .expect("failed to run tzx2pzx");
    assert!(!status.success(), "a bad TZX signature must be rejected");
}

#[test]
fn tzx2pzx_accepts_empty_tape_body() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.tzx");
    let output = dir.path().join("out.pzx");
    let mut tzx = b"ZXTape!\x1a".to_vec();
    tzx.push(1); // major
    tzx.push(20); // minor
    fs::write(&input, &tzx).unwrap();

    let status = Command::new(bin("tzx2pzx"))
        .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .expect("failed to run tzx2pzx");
    assert!(status.success(), "a well-formed empty TZX tape should convert cleanly");

    let out = fs::read(&output).unwrap();
    assert_eq!(&out[0..4], b"PZXT");
}

#[test]
fn tzx2pzx_terminates_on_a_jump_loop_tape() {
    // Standard block, jump +1, standard block, jump -1: exercises the
    // JUMP control-flow blocks end to end through the compiled binary and
    // checks the process actually terminates rather than looping forever.
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.tzx");
    let output = dir.path().join("out.pzx");

    let mut tzx = b"ZXTape!\x1a".to_vec();
    tzx.push(1); // major
    tzx.push(20); // minor
    let standard = |flag: u8| vec![0x10u8, 0x00, 0x00, 0x01, 0x00, flag];
    let jump = |offset: i16| {
        let b = offset.to_le_bytes();
        vec![0x23u8, b[0], b[1]]
    };
    tzx.extend(standard(0xFF));
    tzx.extend(jump(1));
    tzx.extend(standard(0xFF));
    tzx.extend(jump(-1));
    fs::write(&input, &tzx).unwrap();

    let status = Command::new(bin("tzx2pzx"))
        .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .expect("failed to run tzx2pzx on a jump-loop tape");
    assert!(status.success(), "a jump-loop tape must convert and terminate, not hang");

    let out = fs::read(&output).unwrap();
    assert_eq!(&out[0..4], b"PZXT");
}

#[test]
fn pzx2txt_and_txt2pzx_round_trip_a_tap_conversion() {
    let dir = TempDir::new().unwrap();
    let tap_input = dir.path().join("in.tap");
    let pzx = dir.path().join("mid.pzx");
    let txt = dir.path().join("mid.txt");
    let pzx2 = dir.path().join("out.pzx");
    fs::write(&tap_input, minimal_tap()).unwrap();

    assert!(Command::new(bin("tap2pzx"))
        .args([tap_input.to_str().unwrap(), "-o", pzx.to_str().unwrap()])
        .status()
        .unwrap()
        .success());

    assert!(Command::new(bin("pzx2txt"))
        .args([pzx.to_str().unwrap(), "-o", txt.to_str().unwrap()])
        .status()
        .unwrap()
        .success());

    let dumped = fs::read_to_string(&txt).unwrap();
    assert!(dumped.contains("PZX "), "text dump should open with a PZX header line");

    assert!(Command::new(bin("txt2pzx"))
        .args([txt.to_str().unwrap(), "-o", pzx2.to_str().unwrap()])
        .status()
        .unwrap()
        .success());

    let regenerated = fs::read(&pzx2).unwrap();
    assert_eq!(&regenerated[0..4], b"PZXT");
}

#[test]
fn pzx2wav_renders_riff_header() {
    let dir = TempDir::new().unwrap();
    let tap_input = dir.path().join("in.tap");
    let pzx = dir.path().join("mid.pzx");
    let wav = dir.path().join("out.wav");
    fs::write(&tap_input, minimal_tap()).unwrap();

    assert!(Command::new(bin("tap2pzx"))
        .args([tap_input.to_str().unwrap(), "-o", pzx.to_str().unwrap()])
        .status()
        .unwrap()
        .success());

    let status = Command::new(bin("pzx2wav"))
        .args(["-s", "22050", pzx.to_str().unwrap(), "-o", wav.to_str().unwrap()])
        .status()
        .expect("failed to run pzx2wav");
    assert!(status.success(), "pzx2wav should exit 0");

    let out = fs::read(&wav).unwrap();
    assert_eq!(&out[0..4], b"RIFF");
    assert_eq!(&out[8..12], b"WAVE");
}

#[test]
fn help_flag_prints_usage_to_stderr() {
    let output = Command::new(bin("pzx2txt"))
        .arg("-h")
        .output()
        .expect("failed to run pzx2txt -h");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.to_lowercase().contains("usage"),
        "-h output should contain 'usage'; got: {stderr}"
    );
}
