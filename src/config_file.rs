//! Configuration file handling for play-runner

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{ListItem, NestedValue, OptionDescriptor, OptionValue};
use crate::playbook::{Config, Entry};

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No config file found in current directory or its parents: {0}")]
    ConfigNotFound(PathBuf),
    #[error("Unable to read config file {path}: {source}")]
    Read {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("Unknown working directory: {0}")]
    UnknownWorkingDirectory(String),
    #[error("Unable to parse YAML config file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("Unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// A scalar option value as written in the config file
///
/// Numbers keep their written form, so `2.0` stays `2.0` and integers beyond
/// `i64` are not truncated.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ConfigScalar {
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

impl fmt::Display for ConfigScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScalar::Bool(b) => write!(f, "{b}"),
            ConfigScalar::Number(n) => write!(f, "{n}"),
            ConfigScalar::String(s) => f.write_str(s),
        }
    }
}

/// Either a scalar or a list of items to be joined
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ConfigValue {
    List(Vec<ConfigListItem>),
    Scalar(ConfigScalar),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ConfigListItem {
    Option(ConfigOption),
    Scalar(ConfigScalar),
}

/// Configuration for a single command-line option
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigOption {
    pub name: String,
    pub value: Option<ConfigValue>,
    pub value_is_env_var: Option<bool>,
    pub is_base64: Option<bool>,
    pub separator: Option<String>,
}

impl ConfigOption {
    fn env_var_name(&self, scalar: &ConfigScalar) -> Result<String, ConfigError> {
        match scalar {
            ConfigScalar::String(var) if !var.trim().is_empty() => Ok(var.clone()),
            other => Err(ConfigError::Validation(format!(
                "Option '{}' has value_is_env_var set, but its value `{other}` is not a variable name",
                self.name
            ))),
        }
    }
}

fn literal(scalar: &ConfigScalar) -> Option<String> {
    let value = scalar.to_string();
    (!value.is_empty()).then_some(value)
}

impl TryFrom<ConfigOption> for OptionDescriptor {
    type Error = ConfigError;

    fn try_from(config: ConfigOption) -> Result<Self, Self::Error> {
        if config.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Option with an empty name".to_string(),
            ));
        }
        let is_env = config.value_is_env_var.unwrap_or(false);
        let encoded = config.is_base64.unwrap_or(false);
        let value = match &config.value {
            None => OptionValue::None,
            Some(ConfigValue::Scalar(scalar)) => match literal(scalar) {
                None => OptionValue::None,
                Some(_) if is_env => OptionValue::EnvVar(config.env_var_name(scalar)?),
                Some(value) => OptionValue::Literal(value),
            },
            Some(ConfigValue::List(items)) if items.is_empty() => OptionValue::None,
            Some(ConfigValue::List(items)) => {
                if is_env || encoded {
                    return Err(ConfigError::Validation(format!(
                        "Option '{}' has a list value and cannot also set value_is_env_var or is_base64",
                        config.name
                    )));
                }
                OptionValue::List {
                    items: items
                        .iter()
                        .map(|item| list_item(&config.name, item))
                        .collect::<Result<Vec<ListItem>, ConfigError>>()?,
                    separator: config.separator.clone(),
                }
            }
        };
        Ok(OptionDescriptor {
            name: config.name,
            value,
            encoded,
        })
    }
}

fn list_item(parent: &str, item: &ConfigListItem) -> Result<ListItem, ConfigError> {
    let nested = match item {
        ConfigListItem::Scalar(scalar) => return Ok(ListItem::Scalar(scalar.to_string())),
        ConfigListItem::Option(nested) => nested,
    };
    if nested.is_base64.unwrap_or(false) {
        return Err(ConfigError::Validation(format!(
            "Nested option '{}' in '{parent}' cannot be base64 encoded",
            nested.name
        )));
    }
    let value = match &nested.value {
        None => NestedValue::None,
        Some(ConfigValue::List(_)) => {
            return Err(ConfigError::Validation(format!(
                "Nested option '{}' in '{parent}' cannot have a list value",
                nested.name
            )));
        }
        Some(ConfigValue::Scalar(scalar)) => match literal(scalar) {
            None => NestedValue::None,
            Some(_) if nested.value_is_env_var.unwrap_or(false) => {
                NestedValue::EnvVar(nested.env_var_name(scalar)?)
            }
            Some(value) => NestedValue::Literal(value),
        },
    };
    Ok(ListItem::Option {
        name: nested.name.clone(),
        value,
    })
}

fn descriptors(options: Option<Vec<ConfigOption>>) -> Result<Vec<OptionDescriptor>, ConfigError> {
    options
        .unwrap_or_default()
        .into_iter()
        .map(OptionDescriptor::try_from)
        .collect()
}

/// Configuration for a single playbook
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigPlaybook {
    pub name: Option<String>,
    pub path: Option<String>,
    pub galaxy_deps_required: Option<bool>,
    pub galaxy_cli_options: Option<Vec<ConfigOption>>,
    pub cli_options: Option<Vec<ConfigOption>>,
}

impl TryFrom<ConfigPlaybook> for Entry {
    type Error = ConfigError;

    fn try_from(config: ConfigPlaybook) -> Result<Self, Self::Error> {
        Ok(Entry {
            name: config.name,
            path: config.path,
            requires_dependency_install: config.galaxy_deps_required.unwrap_or(false),
            install_options: descriptors(config.galaxy_cli_options)?,
            run_options: descriptors(config.cli_options)?,
        })
    }
}

/// Root configuration structure
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    pub playbooks: Option<Vec<ConfigPlaybook>>,
    pub global_cli_options: Option<Vec<ConfigOption>>,
    pub global_galaxy_cli_options: Option<Vec<ConfigOption>>,
}

impl TryFrom<ConfigFile> for Config {
    type Error = ConfigError;

    fn try_from(config: ConfigFile) -> Result<Self, Self::Error> {
        let entries = config
            .playbooks
            .unwrap_or_default()
            .into_iter()
            .map(Entry::try_from)
            .collect::<Result<Vec<Entry>, ConfigError>>()?;
        Ok(Config {
            entries,
            global_install_options: descriptors(config.global_galaxy_cli_options)?,
            global_run_options: descriptors(config.global_cli_options)?,
        })
    }
}

/// List of supported configuration file names
const FILENAMES: [&str; 3] = [
    "playbooks_config.yml",
    "playbooks_config.yaml",
    "playbooks_config.json",
];

impl ConfigFile {
    /// Loads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, or
    /// `ConfigError::Yaml`/`ConfigError::Json` if parsing fails.
    pub fn from_file(file: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = std::fs::read_to_string(file).map_err(|e| ConfigError::Read {
            source: e,
            path: file.to_path_buf(),
        })?;
        if file.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
                source: e,
                path: file.to_path_buf(),
            })
        } else if contents.trim().is_empty() {
            Ok(ConfigFile::default())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
                source: e,
                path: file.to_path_buf(),
            })
        }
    }

    /// Searches for a configuration file in the current directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownWorkingDirectory` if the cwd cannot be determined,
    /// or `ConfigError::ConfigNotFound` if no config file is found.
    pub fn find_config() -> Result<PathBuf, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::UnknownWorkingDirectory(e.to_string()))?;
        Self::find_config_from(&cwd)
    }

    /// Searches `start` and its parents for a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if no config file is found.
    pub fn find_config_from(start: &Path) -> Result<PathBuf, ConfigError> {
        let mut path = start.to_path_buf();
        debug!("Searching for config file in {}", start.display());
        loop {
            for file in &FILENAMES {
                let config_path = path.join(file);
                if config_path.exists() {
                    info!("Found config file: {}", config_path.display());
                    return Ok(config_path);
                }
            }
            if !path.pop() {
                return Err(ConfigError::ConfigNotFound(start.to_path_buf()));
            }
        }
    }
}
