//! Core implementation of play-runner
//!
//! play-runner reads a declarative list of playbooks, resolves each playbook's
//! command-line options (literals, environment variables, base64 values and
//! joined lists), merges them with global options and runs `ansible-galaxy
//! install` and `ansible-playbook` one after the other. The run succeeds only
//! if every command exits `0`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config_file::{ConfigError, ConfigFile};
use crate::playbook::Config;

pub mod commands;
pub mod config_file;
pub mod env;
pub mod invoker;
pub mod logger;
pub mod options;
pub mod playbook;
pub mod report;
pub mod runner;

/// Environment variable that turns on check mode for playbook runs
pub const CHECK_MODE_VAR: &str = "ANSIBLE_CHECK_MODE";

/// Load configuration from a file (or auto-detect), returning the config and its path.
///
/// # Errors
///
/// Returns `ConfigError` if the config file is not found, cannot be parsed,
/// or contains invalid option descriptors.
pub fn load_config(config_file: Option<&str>) -> Result<(Config, PathBuf), ConfigError> {
    let config_path = match config_file {
        Some(file) => {
            let config_path = PathBuf::from(file);
            if !config_path.exists() {
                return Err(ConfigError::ConfigNotFound(config_path));
            }
            config_path
        }
        None => ConfigFile::find_config()?,
    };
    debug!("Loading config file: {}", config_path.display());
    let config = load_config_file(&config_path)?;
    Ok((config, config_path))
}

/// Parse and validate a specific config file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or is invalid.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = ConfigFile::from_file(path)?.try_into()?;
    validate_entries(&config)?;
    Ok(config)
}

/// Split a playbook filter such as `site;deploy,db` into names.
#[must_use]
pub fn parse_playbook_filter(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn validate_entries(config: &Config) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (index, entry) in config.entries.iter().enumerate() {
        if entry.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Playbook #{} has an empty name",
                index + 1
            )));
        }
        if !seen.insert(entry.id()) {
            warn!(
                "Playbook '{}' is configured more than once; a filter selects all of them",
                entry.id()
            );
        }
    }
    Ok(())
}
