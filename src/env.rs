//! Read-only access to environment variables
//!
//! Option resolution and check-mode detection read variables through the
//! [`Environment`] trait instead of `std::env` directly, so tests can supply a
//! plain map without touching the real process environment.

use std::collections::HashMap;
use std::env::VarError;

/// A source of environment variables.
pub trait Environment {
    /// Look up a variable, telling an unset variable apart from one that is not valid unicode.
    ///
    /// # Errors
    ///
    /// Returns `VarError::NotPresent` if the variable is unset and
    /// `VarError::NotUnicode` if its content is not valid unicode.
    fn lookup(&self, key: &str) -> Result<String, VarError>;

    /// Look up a variable, returning `None` if it is unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String> {
        self.lookup(key).ok()
    }

    /// Interpret a variable as a boolean switch, see [`is_truthy`].
    fn flag(&self, key: &str) -> bool {
        self.var(key).is_some_and(|v| is_truthy(&v))
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn lookup(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }
}

impl Environment for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Result<String, VarError> {
        self.get(key).cloned().ok_or(VarError::NotPresent)
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn lookup(&self, key: &str) -> Result<String, VarError> {
        (**self).lookup(key)
    }
}

/// Whether a string reads as "on".
///
/// Empty strings and `0`, `false`, `no`, `off` (any case) are false, anything else is true.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "0"
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("off"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        for v in ["1", "true", "TRUE", "yes", "on", "anything"] {
            assert!(is_truthy(v), "{v} should be truthy");
        }
        for v in ["", " ", "0", "false", "False", "no", "OFF"] {
            assert!(!is_truthy(v), "{v:?} should be falsy");
        }
    }

    #[test]
    fn test_map_environment() {
        let env = HashMap::from([("CHECK".to_string(), "yes".to_string())]);
        assert_eq!(env.var("CHECK").as_deref(), Some("yes"));
        assert!(env.flag("CHECK"));
        assert!(!env.flag("MISSING"));
        assert_eq!(env.lookup("MISSING"), Err(VarError::NotPresent));
    }

    #[test]
    fn test_process_environment_reads_path() {
        assert!(ProcessEnvironment.var("PATH").is_some());
    }
}
