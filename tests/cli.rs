//! Tests for the `mdbatch` binary's exit codes and messages.

use std::process::Command;

fn mdbatch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mdbatch"))
}

#[test]
fn input_that_is_a_file_reports_not_a_folder() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, "x").unwrap();

    let out = mdbatch()
        .args(["--quiet", "convert", "--no-progress", "-i"])
        .arg(&file)
        .arg("-o")
        .arg(dir.path().join("out"))
        .output()
        .expect("run mdbatch");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Not a folder"), "stderr: {stderr}");
    assert!(!stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn missing_input_reports_folder_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let out = mdbatch()
        .args(["convert", "--no-progress", "-i"])
        .arg(dir.path().join("nope"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .output()
        .expect("run mdbatch");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Folder not found"), "stderr: {stderr}");
}

#[cfg(unix)]
#[test]
fn convert_prints_each_written_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("a.txt"), "alpha").unwrap();

    let out = mdbatch()
        .args(["convert", "--no-progress", "--converter", "cat", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .output()
        .expect("run mdbatch");

    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Converted: "), "stderr: {stderr}");
    assert!(stderr.contains("files converted successfully"), "stderr: {stderr}");
    assert_eq!(
        std::fs::read_to_string(output.path().join("a.md")).unwrap(),
        "alpha"
    );
}
