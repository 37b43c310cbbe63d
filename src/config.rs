use std::collections::HashMap;
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use cross_xdg::BaseDirs;

use crate::interpreter::DEFAULT_TAPE_SIZE;

/// Environment variable overriding the tape size.
pub const ENV_TAPE_SIZE: &str = "BF_TAPE_SIZE";
/// Environment variable selecting buffered input (`1`/`true`).
pub const ENV_BUFFERED: &str = "BF_BUFFERED";
/// Environment variable pointing at an alternative config file.
pub const ENV_CONFIG: &str = "BF_CONFIG";

/// Effective settings for a driver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub tape_size: NonZeroUsize,
    pub buffered: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            buffered: false,
        }
    }
}

/// Values found in the `[interpreter]` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub tape_size: Option<NonZeroUsize>,
    pub buffered: Option<bool>,
}

/// Resolve settings: flags -> env -> config file -> defaults.
pub fn resolve(tape_size_flag: Option<NonZeroUsize>, buffered_flag: bool) -> Settings {
    let file = load_from_toml().unwrap_or_default();
    resolve_with(
        tape_size_flag,
        buffered_flag,
        env::var(ENV_TAPE_SIZE).ok().as_deref(),
        env::var(ENV_BUFFERED).ok().as_deref(),
        &file,
    )
}

/// Layering logic behind [`resolve`], with the environment passed in.
pub fn resolve_with(
    tape_size_flag: Option<NonZeroUsize>,
    buffered_flag: bool,
    env_tape_size: Option<&str>,
    env_buffered: Option<&str>,
    file: &FileSettings,
) -> Settings {
    let defaults = Settings::default();

    let tape_size = tape_size_flag
        .or_else(|| env_tape_size.and_then(|s| parse_tape_size(ENV_TAPE_SIZE, s)))
        .or(file.tape_size)
        .unwrap_or(defaults.tape_size);

    // A bare flag can only switch buffering on; env and file may switch it either way.
    let buffered = buffered_flag
        || env_buffered
            .and_then(|s| parse_bool(ENV_BUFFERED, s))
            .or(file.buffered)
            .unwrap_or(defaults.buffered);

    let settings = Settings { tape_size, buffered };
    log::debug!("resolved settings: {settings:?}");
    settings
}

fn parse_tape_size(origin: &str, value: &str) -> Option<NonZeroUsize> {
    match value.trim().parse::<NonZeroUsize>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("ignoring {origin}={value:?}: expected a positive cell count");
            None
        }
    }
}

fn parse_bool(origin: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            log::warn!("ignoring {origin}={value:?}: expected true or false");
            None
        }
    }
}

/// Location of the config file: `$BF_CONFIG`, else `bf.toml` in the XDG config home.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

fn load_from_toml() -> Option<FileSettings> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    log::debug!("loaded config from {}", path.display());
    Some(parse_config(&content))
}

/// Parse the `[interpreter]` section of a config file.
///
/// Very small hand-rolled parser: `key = value` pairs, `#` comments,
/// optional double quotes around values. Unknown keys are ignored.
pub fn parse_config(content: &str) -> FileSettings {
    let mut in_section = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len()-1].trim() == "interpreter";
            continue;
        }
        if !in_section { continue; }
        if let Some((key, val_raw)) = line.split_once('=') {
            let val_raw = val_raw.trim();
            let val = val_raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(val_raw);
            map.insert(key.trim().to_string(), val.to_string());
        }
    }

    FileSettings {
        tape_size: map.get("tape_size").and_then(|v| parse_tape_size("tape_size", v)),
        buffered: map.get("buffered").and_then(|v| parse_bool("buffered", v)),
    }
}
