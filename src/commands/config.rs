//! Configuration commands
//!
//! `config list` prints the resolved value of every known key. `config set`
//! validates the key and value, then writes through [`ConfigStore`] so the
//! formatting of the user's file survives the update.

use std::path::Path;

use tracing::debug;

use crate::commands::warning_icon;
use crate::config::{Config, ConfigStore, KNOWN_KEYS, validate_key, validate_value};
use crate::error::Result;

/// Print `key=value` lines for every known configuration key.
pub fn run_list(config: &Config, host: Option<&str>) -> Result<()> {
    for (key, value) in resolved_entries(config, host) {
        println!("{key}={value}");
    }
    Ok(())
}

/// Resolved `(key, value)` pairs in declaration order.
///
/// A host argument overlays that host's overrides on the global settings.
fn resolved_entries(config: &Config, host: Option<&str>) -> Vec<(String, String)> {
    let host_config = host.and_then(|h| config.hosts.get(h));

    KNOWN_KEYS
        .iter()
        .map(|(key, _)| {
            let value = match *key {
                "git_protocol" => host_config
                    .and_then(|h| h.git_protocol.clone())
                    .unwrap_or_else(|| config.settings.git_protocol.clone()),
                "editor" => config.settings.editor.clone().unwrap_or_default(),
                "prompt" => config.settings.prompt.clone(),
                "pager" => config.settings.pager.clone().unwrap_or_default(),
                _ => String::new(),
            };
            ((*key).to_string(), value)
        })
        .collect()
}

/// Set one configuration key and write the file back.
///
/// An unknown key produces a warning but still writes, matching the
/// forgiving behavior users expect from dotfile-style tools. A known key
/// with a value outside its accepted list is a hard error that names the
/// accepted values.
///
/// # Arguments
/// * `path` - Explicit config file path, or `None` for the resolved default
/// * `host` - Write under `[hosts.<host>]` when present
/// * `key` - Configuration key
/// * `value` - New value
pub fn run_set(path: Option<&Path>, host: Option<&str>, key: &str, value: &str) -> Result<()> {
    if validate_key(key).is_err() {
        eprintln!(
            "{} warning: '{key}' is not a known configuration key",
            warning_icon()
        );
    }
    validate_value(key, value)?;

    let mut store = ConfigStore::open(path)?;
    store.set(host, key, value)?;
    store.write()?;

    debug!(key, path = %store.path().display(), "configuration updated");
    Ok(())
}
