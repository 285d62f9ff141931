//! Exercises the file-input CLI path end to end by spawning the built
//! binary against a temp file, per SPEC_FULL.md §10.5 ("`tempfile` is used
//! only where a test needs to exercise the file-input CLI path").

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn knight_bin() -> &'static str {
    env!("CARGO_BIN_EXE_knight")
}

#[test]
fn runs_a_source_file_and_exits_zero() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"OUTPUT + "hello, " "world""#).unwrap();

    let output = Command::new(knight_bin()).arg(file.path()).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello, world\n");
}

#[test]
fn expression_flag_bypasses_the_filesystem() {
    let output = Command::new(knight_bin())
        .arg("-e")
        .arg("OUTPUT + 1 2")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");
}

#[test]
fn quit_code_propagates_as_process_exit_status() {
    let output = Command::new(knight_bin()).arg("-e").arg("QUIT 7").output().unwrap();

    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn runtime_error_exits_nonzero_with_diagnostic_on_stderr() {
    let output = Command::new(knight_bin()).arg("-e").arg("/ 1 0").output().unwrap();

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn missing_file_reports_io_error() {
    let output = Command::new(knight_bin())
        .arg("/nonexistent/path/to/nowhere.kn")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}
