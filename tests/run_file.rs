mod common;

use common::{cargo_bin, programs_file};
use predicates::prelude::*;
use std::time::Duration;

#[test]
fn runs_each_line_and_separates_outputs() {
    let tf = programs_file("++.\n+++[-].\n++[>++<-]>.\n");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![2u8, b'\n', 0, b'\n', 4, b'\n'])
        .stderr(predicate::str::is_empty());
}

#[test]
fn skipped_loops_produce_nothing_and_terminate() {
    let tf = programs_file("[+]\n[[[+]]]+.\n");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![b'\n', 1, b'\n']);
}

#[test]
fn hello_world_with_comments() {
    let tf = programs_file(
        "print: ++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+. done\n",
    );
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn no_state_leaks_between_lines() {
    let tf = programs_file("+++++.\n.\n>.\n");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![5u8, b'\n', 0, b'\n', 0, b'\n']);
}

#[test]
fn unterminated_last_line_still_runs() {
    let tf = programs_file("+.\n++.");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![1u8, b'\n', 2, b'\n']);
}

#[test]
fn empty_file_prints_nothing() {
    let tf = programs_file("");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn buffered_mode_matches_stream_mode() {
    let content = "++++++++[>++++++++<-]>+.+.\n+[>+[>+<-]<-]>>.\n";
    let tf = programs_file(content);

    let streamed = cargo_bin().arg(tf.path()).assert().success();
    let streamed = streamed.get_output().stdout.clone();

    let buffered = cargo_bin().arg("--buffered").arg(tf.path()).assert().success();
    assert_eq!(buffered.get_output().stdout, streamed);
    assert_eq!(streamed, b"AB\n\x01\n");
}

#[test]
fn reads_programs_from_stdin() {
    cargo_bin()
        .arg("-")
        .write_stdin("++.\n+.")
        .assert()
        .success()
        .stdout(vec![2u8, b'\n', 1, b'\n']);
}

#[test]
fn debug_logging_goes_to_stderr() {
    let tf = programs_file("+.\n");
    cargo_bin()
        .env("RUST_LOG", "debug")
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![1u8, b'\n'])
        .stderr(predicate::str::contains("program 1"));
}

const MIXED_PROGRAMS: &str = "++++++++[>++++++++<-]>+.+.\n[[[+]]]+.\n+]\n\n+++[>+++[>++<-]<-]>>.";

fn file_path_output() -> Vec<u8> {
    let tf = programs_file(MIXED_PROGRAMS);
    let assert = cargo_bin().arg(tf.path()).assert().code(1);
    assert.get_output().stdout.clone()
}

#[test]
fn stdin_lines_match_file_path_output() {
    let expected = file_path_output();
    assert_eq!(expected, b"AB\n\x01\n\n\n\x12\n");

    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("-")
        .write_stdin(MIXED_PROGRAMS)
        .assert()
        .code(1)
        .stdout(expected)
        .stderr(predicate::str::contains("unmatched bracket ']'").and(predicate::str::contains("line 3")));
}

#[cfg(unix)]
#[test]
fn fifo_path_runs_line_by_line() {
    let expected = file_path_output();

    let dir = tempfile::tempdir().expect("tempdir");
    let fifo = dir.path().join("programs.fifo");
    let status = std::process::Command::new("mkfifo").arg(&fifo).status().expect("mkfifo");
    assert!(status.success());

    // Opening a FIFO for writing blocks until `bf` opens it for reading.
    let writer_path = fifo.clone();
    let writer = std::thread::spawn(move || std::fs::write(writer_path, MIXED_PROGRAMS));

    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg(&fifo)
        .assert()
        .code(1)
        .stdout(expected)
        .stderr(predicate::str::contains("Illegal seek").not());

    writer.join().unwrap().expect("write programs into fifo");
}
