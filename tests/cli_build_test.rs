//! Integration tests for board, build and maintenance commands.

#![cfg(unix)]

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;

#[test]
fn test_compile_with_spaces_in_paths() {
    let env = TestEnv::new();

    env.ardcli()
        .args([
            "compile",
            "-b",
            "arduino:avr:uno",
            "--output-dir",
            "/tmp/my build",
            "My Sketch",
        ])
        .assert()
        .success();

    assert_eq!(
        env.recorded_args().unwrap(),
        vec![
            "compile",
            "--output-dir",
            "/tmp/my build",
            "-b",
            "arduino:avr:uno",
            "My Sketch"
        ]
    );
}

#[test]
fn test_compile_verify_requires_upload() {
    let env = TestEnv::new();

    env.ardcli()
        .args(["compile", "-t", "-b", "arduino:avr:uno"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("-t can only be used together with -u"));

    assert!(env.recorded_args().is_none());
}

#[test]
fn test_upload_input_conflict() {
    let env = TestEnv::new();

    env.ardcli()
        .args(["upload", "-i", "a.hex", "--input-dir", "build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Conflicting arguments"));

    assert!(env.recorded_args().is_none());
}

#[test]
fn test_board_attach_requires_board_or_port() {
    let env = TestEnv::new();

    env.ardcli()
        .args(["board", "attach"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing arguments"));

    assert!(env.recorded_args().is_none());
}

#[test]
fn test_board_attach_protocol_uses_dash_l() {
    let env = TestEnv::new();

    env.ardcli()
        .args(["board", "attach", "-p", "/dev/ttyACM0", "-l", "serial"])
        .assert()
        .success();

    assert_eq!(
        env.recorded_args().unwrap(),
        vec!["board", "attach", "-p", "/dev/ttyACM0", "-l", "serial"]
    );
}

#[test]
fn test_monitor_config_repeated() {
    let env = TestEnv::new();

    env.ardcli()
        .args([
            "monitor",
            "-p",
            "/dev/ttyUSB0",
            "-c",
            "baudrate=115200",
            "-c",
            "parity=none",
        ])
        .assert()
        .success();

    assert_eq!(
        env.recorded_args().unwrap(),
        vec![
            "monitor",
            "-p",
            "/dev/ttyUSB0",
            "-c",
            "baudrate=115200",
            "-c",
            "parity=none"
        ]
    );
}

#[test]
fn test_completion_written_to_file() {
    let env = TestEnv::new();
    let out = env.path().join("ardcli.bash");

    env.ardcli()
        .args(["completion", "bash", "-o"])
        .arg(&out)
        .env("FAKE_ARDUINO_STDOUT", "complete -F _arduino arduino-cli")
        .assert()
        .success()
        .stdout("complete -F _arduino arduino-cli");

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "complete -F _arduino arduino-cli"
    );
    assert_eq!(env.recorded_args().unwrap(), vec!["completion", "bash"]);
}

#[test]
fn test_sketch_archive_with_destination() {
    let env = TestEnv::new();

    env.ardcli()
        .args(["sketch", "archive", "Blink", "Blink.zip", "--include-build-dir"])
        .assert()
        .success();

    assert_eq!(
        env.recorded_args().unwrap(),
        vec![
            "sketch",
            "archive",
            "Blink",
            "Blink.zip",
            "--include-build-dir"
        ]
    );
}

#[test]
fn test_version_flag_reports_build_metadata() {
    let env = TestEnv::new();

    env.ardcli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ardcli"));

    assert!(env.recorded_args().is_none());
}

#[test]
fn test_daemon_not_started_when_port_answers() {
    let env = TestEnv::new();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    env.ardcli()
        .args(["daemon", "--port", &port.to_string()])
        .assert()
        .success()
        .stderr(predicate::str::contains("already running"));

    assert!(env.recorded_args().is_none());
}

#[test]
fn test_daemon_exit_code_is_reported() {
    let env = TestEnv::new();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    env.ardcli()
        .args(["daemon", "--port", &port.to_string()])
        .env("FAKE_ARDUINO_EXIT", "3")
        .assert()
        .code(3);

    assert_eq!(
        env.recorded_args().unwrap(),
        vec!["daemon".to_string(), "--port".to_string(), port.to_string()]
    );
}
