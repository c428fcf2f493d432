use std::process::Command;

use sharp_ir::{
    kuro::{Recording, FRAME_LENGTH},
    modem::{create_codec, CodecType},
    sharp::{decode_recording, encode_state, ControlState},
};

// -p 1 -t 24 -m 0 -v 0, captured from the reference generator
const GOLDEN: &str = "ffffffff7f00003ef800e0830f007cf800c0070f007cf001800f1f00f800c0870f007cf001c007003e00f001800f1f7c00e003000f3e78f0c103001f7cf8e003001f007800e0830f1f7cf8e003001f3ef8f001800f3e7cf0e1830f1f7cf8e0c3071f3ef8f0c1870f3e7cf0c1830f1e00f8e0c3071f3ef8f0c1070f3e78f001800f1f7cf8e0c3071f3cf8e0c1070f3e00f001800f003c00f001800f3e7cf0e1830f003cf800000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

fn encode_hex(state: &ControlState) -> String {
    let recording = encode_state(state).unwrap();
    create_codec(CodecType::Hex).encode(&recording).unwrap()
}

#[test]
fn test_golden_frame() {
    let state = ControlState::from_raw(1, 24, 0, 0, None).unwrap();
    let encoded = encode_hex(&state);
    assert_eq!(encoded.len(), FRAME_LENGTH * 2);
    assert_eq!(encoded, GOLDEN);
}

#[test]
fn test_idempotent() {
    let state = ControlState::from_raw(0, 27, 2, 3, Some(1)).unwrap();
    assert_eq!(encode_hex(&state), encode_hex(&state));
    assert_eq!(encode_state(&state).unwrap(), encode_state(&state).unwrap());
}

#[test]
fn test_never_truncated() {
    let mut count = 0;
    for power in 0..2 {
        for full_power in [None, Some(0), Some(1)] {
            for temperature in 18..=32 {
                for mode in 0..4 {
                    for volume in 0..4 {
                        let state =
                            ControlState::from_raw(power, temperature, mode, volume, full_power)
                                .unwrap();
                        let recording = encode_state(&state).unwrap();
                        assert!(!recording.is_truncated(), "{:?}", state);
                        assert!(recording.len() < recording.samples().len());
                        count += 1;
                    }
                }
            }
        }
    }
    assert_eq!(count, 1440);
}

#[test]
fn test_decode_golden() {
    let recording = create_codec(CodecType::Hex).decode(GOLDEN).unwrap();
    let state = decode_recording(&recording).unwrap();
    assert_eq!(state, ControlState::from_raw(1, 24, 0, 0, None).unwrap());
}

#[test]
fn test_decode_rejects_idle_frame() {
    let recording = Recording::new();
    assert!(decode_recording(&recording).is_err());
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sharp-ir"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_cli_golden() {
    let output = run(&["-p", "1", "-t", "24", "-m", "0", "-v", "0"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), GOLDEN);
}

#[test]
fn test_cli_rejects_invalid_parameters() {
    let cases: [&[&str]; 6] = [
        &["-p", "1", "-t", "17", "-m", "0", "-v", "0"],
        &["-p", "1", "-t", "33", "-m", "0", "-v", "0"],
        &["-p", "1", "-t", "24", "-m", "4", "-v", "0"],
        &["-p", "1", "-t", "24", "-m", "0", "-v", "4"],
        &["-p", "2", "-t", "24", "-m", "0", "-v", "0"],
        &["-p", "1", "-t", "24", "-m", "0"],
    ];

    for args in cases {
        let output = run(args);
        assert!(!output.status.success(), "{:?}", args);
        assert!(output.stdout.is_empty(), "{:?}", args);
        assert!(
            String::from_utf8_lossy(&output.stderr).contains("Usage"),
            "{:?}",
            args
        );
    }
}
