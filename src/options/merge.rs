use std::collections::HashSet;

use crate::env::Environment;
use crate::options::descriptor::OptionDescriptor;
use crate::options::resolve::{ResolveError, ResolvedOption, resolve};

/// A de-duplicated collection of resolved options with a stable order.
///
/// Options are unique by their full `(name, value)` pair. The same name with
/// different values is kept twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<ResolvedOption>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, returning `false` if an identical one is already present.
    pub fn insert(&mut self, option: ResolvedOption) -> bool {
        if self.options.contains(&option) {
            return false;
        }
        self.options.push(option);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedOption> {
        self.options.iter()
    }

    /// Names that occur more than once with different values.
    #[must_use]
    pub fn conflicting_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut conflicts = Vec::new();
        for option in &self.options {
            let name = option.name.as_str();
            if !seen.insert(name) && !conflicts.contains(&name) {
                conflicts.push(name);
            }
        }
        conflicts
    }
}

impl FromIterator<ResolvedOption> for OptionSet {
    fn from_iter<I: IntoIterator<Item = ResolvedOption>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for option in iter {
            set.insert(option);
        }
        set
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a ResolvedOption;
    type IntoIter = std::slice::Iter<'a, ResolvedOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

/// Resolve global and per-playbook descriptors and union them.
///
/// Global options come first, then playbook options, each in descriptor order.
///
/// # Errors
///
/// Returns the first `ResolveError` hit while resolving any descriptor.
pub fn merge(
    global: &[OptionDescriptor],
    entry: &[OptionDescriptor],
    env: &impl Environment,
) -> Result<OptionSet, ResolveError> {
    global
        .iter()
        .chain(entry)
        .map(|descriptor| resolve(descriptor, env))
        .collect()
}
