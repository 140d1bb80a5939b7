//! Persistent configuration for roulette.
//!
//! Stored at `~/Library/Application Support/roulette/config.toml` (macOS)
//! or `~/.local/share/roulette/config.toml` (Linux). `ROULETTE_HOME`
//! replaces the directory.
//!
//! Values can also be set via environment variables (higher priority).

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;

pub const BIND_KEY: &str = "roulette.bind";
pub const PORT_KEY: &str = "roulette.port";
pub const UTC_OFFSET_KEY: &str = "roulette.utc_offset";

/// Get the roulette data directory.
pub fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("ROULETTE_HOME") {
        return PathBuf::from(home);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("roulette")
}

/// Get the config file path.
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Read a config value. Checks env var first (uppercase, dots→underscores),
/// then falls back to config file.
///
/// Example: `get("roulette.port")` checks `ROULETTE_PORT` env, then config file.
pub fn get(key: &str) -> Option<String> {
    let env_key = key.replace('.', "_").to_uppercase();
    if let Ok(val) = std::env::var(&env_key) {
        if !val.is_empty() {
            return Some(val);
        }
    }

    load_config().unwrap_or_default().remove(key)
}

/// Set a config value in the config file.
pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = load_config().unwrap_or_default();
    config.insert(key.to_string(), value.to_string());
    save_config(&config)
}

/// Remove a config value from the config file.
pub fn unset(key: &str) -> Result<()> {
    let mut config = load_config().unwrap_or_default();
    config.remove(key);
    save_config(&config)
}

/// List all config values.
pub fn list() -> HashMap<String, String> {
    load_config().unwrap_or_default()
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: IpAddr,
    pub port: u16,
    /// Offset whose midnight starts a new day for the daily modes.
    pub utc_offset: FixedOffset,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            utc_offset: Utc.fix(),
        }
    }
}

impl Settings {
    /// Build settings from env vars and the config file, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::from_lookup(get)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::resolve(lookup, &[BIND_KEY, PORT_KEY, UTC_OFFSET_KEY])
    }

    /// Apply only `keys` on top of the defaults; other keys are never read.
    fn resolve(lookup: impl Fn(&str) -> Option<String>, keys: &[&str]) -> Result<Self> {
        let mut settings = Settings::default();
        for &key in keys {
            if let Some(v) = lookup(key) {
                settings.apply(key, &v)?;
            }
        }
        Ok(settings)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || format!("invalid {}: '{}'", key, value);
        match key {
            BIND_KEY => self.bind = value.trim().parse().with_context(invalid)?,
            PORT_KEY => self.port = value.trim().parse().with_context(invalid)?,
            UTC_OFFSET_KEY => self.utc_offset = parse_offset(value).with_context(invalid)?,
            _ => {}
        }
        Ok(())
    }
}

/// The day-boundary offset alone, for commands that never bind a socket.
pub fn day_offset() -> Result<FixedOffset> {
    Ok(Settings::resolve(get, &[UTC_OFFSET_KEY])?.utc_offset)
}

/// Check that `value` is usable for `key`. Unknown keys are accepted as-is.
pub fn validate(key: &str, value: &str) -> Result<()> {
    Settings::default().apply(key, value)
}

/// Parse `Z`, `UTC`, `+02:00`, `-0530` style offsets.
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    s.parse::<FixedOffset>()
        .map_err(|e| anyhow::anyhow!("expected an offset like +02:00 ({})", e))
}

fn load_config() -> Result<HashMap<String, String>> {
    let path = config_path();
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Ok(HashMap::new()),
    };
    Ok(parse_config(&content))
}

/// Simple key=value format (one per line). Lines starting with # are
/// comments. Section headers [name] prefix subsequent keys.
fn parse_config(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut section = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].trim().to_string();
            continue;
        }
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim().trim_matches('"');
            let full_key = if section.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", section, key)
            };
            map.insert(full_key, value.to_string());
        }
    }

    map
}

fn render_config(config: &HashMap<String, String>) -> String {
    let mut sections: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for (key, value) in config {
        let (section, field) = key.split_once('.').unwrap_or(("", key.as_str()));
        sections.entry(section).or_default().push((field, value));
    }

    let mut names: Vec<&str> = sections.keys().copied().collect();
    // Top-level keys ("") sort first.
    names.sort();

    let mut output = String::new();
    for name in names {
        let mut fields = sections.remove(name).unwrap_or_default();
        fields.sort();
        if !name.is_empty() {
            output.push_str(&format!("[{}]\n", name));
        }
        for (k, v) in fields {
            output.push_str(&format!("{} = \"{}\"\n", k, v));
        }
        output.push('\n');
    }
    output
}

fn save_config(config: &HashMap<String, String>) -> Result<()> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let path = config_path();
    std::fs::write(&path, render_config(config))
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
