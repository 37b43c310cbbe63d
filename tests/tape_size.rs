mod common;

use common::{cargo_bin, programs_file};
use predicates::prelude::*;
use std::io::Write;

// On a two-cell tape ">>" lands back on cell 0; on the default tape it does not.
const WRAP_PROBE: &str = "+>>.\n";

#[test]
fn default_tape_is_large() {
    let tf = programs_file(WRAP_PROBE);
    cargo_bin().arg(tf.path()).assert().success().stdout(vec![0u8, b'\n']);
}

#[test]
fn tape_size_flag() {
    let tf = programs_file(WRAP_PROBE);
    cargo_bin()
        .args(["--tape-size", "2"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![1u8, b'\n']);
}

#[test]
fn tape_size_from_env() {
    let tf = programs_file(WRAP_PROBE);
    cargo_bin()
        .env("BF_TAPE_SIZE", "2")
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![1u8, b'\n']);
}

#[test]
fn flag_overrides_env() {
    let tf = programs_file(WRAP_PROBE);
    cargo_bin()
        .env("BF_TAPE_SIZE", "2")
        .args(["-t", "3"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![0u8, b'\n']);
}

#[test]
fn tape_size_from_config_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[interpreter]\ntape_size = 2").unwrap();
    let tf = programs_file(WRAP_PROBE);
    cargo_bin()
        .env("BF_CONFIG", config.path())
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![1u8, b'\n']);
}

#[test]
fn invalid_env_tape_size_warns_and_uses_default() {
    let tf = programs_file(WRAP_PROBE);
    cargo_bin()
        .env("BF_TAPE_SIZE", "0")
        .arg(tf.path())
        .assert()
        .success()
        .stdout(vec![0u8, b'\n'])
        .stderr(predicate::str::contains("BF_TAPE_SIZE"));
}

#[test]
fn zero_tape_size_flag_is_a_usage_error() {
    let tf = programs_file(WRAP_PROBE);
    cargo_bin()
        .args(["--tape-size", "0"])
        .arg(tf.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}
