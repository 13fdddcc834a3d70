//! Integration tests that run the taglight binary

mod common;

use common::{GREET, create_temp_package, stream_request};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use taglight_core::TagKind;
use taglight_proto::{LengthPrefix, decode_records, read_frame};

fn taglight_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_taglight"))
}

#[test]
fn test_stream_round_trip() {
    let (dir, active) = create_temp_package();
    let mut child = taglight_bin()
        .arg("taglight-go")
        .arg("0")
        .arg(&active)
        .arg(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run taglight");

    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(&stream_request(GREET.as_bytes())).unwrap();
    stdin.write_all(&stream_request(b"package greet\n")).unwrap();
    drop(stdin);

    let mut stdout = Vec::new();
    child.stdout.take().unwrap().read_to_end(&mut stdout).unwrap();
    let status = child.wait().unwrap();
    assert!(status.success(), "closing stdin should end the process cleanly");

    let mut reader = std::io::Cursor::new(stdout);
    let first = read_frame(&mut reader, LengthPrefix::Decimal).unwrap().unwrap();
    let records = decode_records(&first).unwrap();
    assert!(
        records
            .iter()
            .any(|r| r.name == "Hello" && r.kind == TagKind::Function)
    );

    let second = read_frame(&mut reader, LengthPrefix::Decimal).unwrap().unwrap();
    assert!(second.is_empty());
    assert!(read_frame(&mut reader, LengthPrefix::Decimal).unwrap().is_none());
}

#[test]
fn test_project_root_argument() {
    let (dir, active) = create_temp_package();
    let output = taglight_bin()
        .arg("taglight-go")
        .arg("0")
        .arg(&active)
        .arg(dir.path())
        .arg(dir.path())
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run taglight");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_wrong_argument_count_exits_one() {
    for args in [
        &["taglight-go", "0", "a.go"][..],
        &["taglight-go", "0", "a.go", ".", "1", "2", "3", "4"][..],
    ] {
        let output = taglight_bin()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run taglight");
        assert_eq!(output.status.code(), Some(1), "args: {args:?}");
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn test_debug_log_is_written() {
    let (dir, active) = create_temp_package();
    let log = dir.path().join("debug.log");
    std::fs::write(
        dir.path().join("taglight.toml"),
        format!("log_file = {:?}\n", log.display().to_string()),
    )
    .unwrap();

    let output = taglight_bin()
        .arg("taglight-go")
        .arg("1")
        .arg(&active)
        .arg(dir.path())
        .env_remove("TAGLIGHT_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run taglight");
    assert!(output.status.success());

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("starting for"), "log was: {text}");
}

#[test]
fn test_unreachable_socket_is_fatal() {
    let (dir, active) = create_temp_package();
    let output = taglight_bin()
        .arg("taglight-go")
        .arg("0")
        .arg(&active)
        .arg(dir.path())
        .arg(dir.path().join("nobody.sock"))
        .arg(dir.path().join("ours.sock"))
        .output()
        .expect("Failed to run taglight");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open transport"), "stderr: {stderr}");
}
