use std::env::VarError;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::env::Environment;
use crate::options::descriptor::{ListItem, NestedValue, OptionDescriptor, OptionValue};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("option `{option}` references environment variable `{var}`, which is not set")]
    MissingEnvVar { option: String, var: String },

    #[error("option `{option}` references environment variable `{var}`, which is not valid unicode")]
    NonUnicodeEnvVar { option: String, var: String },

    #[error("option `{option}` has a list value but no separator")]
    MissingSeparator { option: String },

    #[error("option `{option}` is not valid base64: {source}")]
    InvalidBase64 {
        option: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("option `{option}` does not decode to UTF-8: {source}")]
    InvalidUtf8 {
        option: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// A concrete option ready to be placed on a command line.
///
/// Two options are the same option only if both name and value match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedOption {
    pub name: String,
    /// `None` for a bare switch
    pub value: Option<String>,
}

impl ResolvedOption {
    pub fn new(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            value: value.map(Into::into),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl fmt::Display for ResolvedOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Resolve a descriptor into its concrete name and value.
///
/// Values looked up from the environment are final and never resolved again.
///
/// # Errors
///
/// Returns `ResolveError::MissingEnvVar` if a referenced variable is unset,
/// `ResolveError::NonUnicodeEnvVar` if it is set but not valid unicode,
/// `ResolveError::MissingSeparator` if a list value has no (or an empty) separator,
/// and `ResolveError::InvalidBase64`/`ResolveError::InvalidUtf8` if an encoded value
/// cannot be decoded.
pub fn resolve(
    descriptor: &OptionDescriptor,
    env: &impl Environment,
) -> Result<ResolvedOption, ResolveError> {
    let option = descriptor.name.as_str();
    let value = match &descriptor.value {
        OptionValue::None => None,
        OptionValue::Literal(value) => Some(value.clone()),
        OptionValue::EnvVar(var) => Some(lookup(option, var, env)?),
        OptionValue::List { items, separator } => {
            let separator = separator
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ResolveError::MissingSeparator {
                    option: option.to_string(),
                })?;
            let tokens = items
                .iter()
                .map(|item| resolve_item(option, item, env))
                .collect::<Result<Vec<String>, ResolveError>>()?;
            Some(tokens.join(separator))
        }
    };

    let value = match value {
        Some(raw) if descriptor.encoded => Some(decode(option, &raw)?),
        other => other,
    };

    Ok(ResolvedOption {
        name: descriptor.name.clone(),
        value,
    })
}

fn resolve_item(
    option: &str,
    item: &ListItem,
    env: &impl Environment,
) -> Result<String, ResolveError> {
    match item {
        ListItem::Scalar(value) => Ok(value.clone()),
        ListItem::Option { name, value } => match value {
            NestedValue::None => Ok(name.clone()),
            NestedValue::Literal(value) => Ok(format!("{name}={value}")),
            NestedValue::EnvVar(var) => Ok(format!("{name}={}", lookup(option, var, env)?)),
        },
    }
}

fn lookup(option: &str, var: &str, env: &impl Environment) -> Result<String, ResolveError> {
    env.lookup(var).map_err(|e| match e {
        VarError::NotPresent => ResolveError::MissingEnvVar {
            option: option.to_string(),
            var: var.to_string(),
        },
        VarError::NotUnicode(_) => ResolveError::NonUnicodeEnvVar {
            option: option.to_string(),
            var: var.to_string(),
        },
    })
}

fn decode(option: &str, raw: &str) -> Result<String, ResolveError> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|source| ResolveError::InvalidBase64 {
            option: option.to_string(),
            source,
        })?;
    String::from_utf8(bytes).map_err(|source| ResolveError::InvalidUtf8 {
        option: option.to_string(),
        source,
    })
}
