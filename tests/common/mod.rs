use assert_cmd::Command;
use std::io::Write;

/// `bf` with a clean environment: no user config, no env overrides, no logging.
pub fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf.toml")
        .env_remove("BF_TAPE_SIZE")
        .env_remove("BF_BUFFERED")
        .env_remove("RUST_LOG");
    cmd
}

pub fn programs_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}
