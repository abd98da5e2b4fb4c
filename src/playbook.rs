use crate::commands::CommandKind;
use crate::options::OptionDescriptor;

/// One configured playbook and the options for its commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub name: Option<String>,
    /// Playbook path passed to `ansible-playbook`
    pub path: Option<String>,
    /// Run `ansible-galaxy install` before the playbook
    pub requires_dependency_install: bool,
    pub install_options: Vec<OptionDescriptor>,
    pub run_options: Vec<OptionDescriptor>,
}

impl Entry {
    /// Name used for filtering and reporting: `name`, falling back to `path`.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("<unnamed>")
    }

    #[must_use]
    pub fn options(&self, kind: CommandKind) -> &[OptionDescriptor] {
        match kind {
            CommandKind::DependencyInstall => &self.install_options,
            CommandKind::Run => &self.run_options,
        }
    }
}

/// The whole run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub entries: Vec<Entry>,
    /// Merged into every `ansible-galaxy install`
    pub global_install_options: Vec<OptionDescriptor>,
    /// Merged into every `ansible-playbook` run
    pub global_run_options: Vec<OptionDescriptor>,
}

impl Config {
    #[must_use]
    pub fn global_options(&self, kind: CommandKind) -> &[OptionDescriptor] {
        match kind {
            CommandKind::DependencyInstall => &self.global_install_options,
            CommandKind::Run => &self.global_run_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_falls_back_to_path() {
        let entry = Entry {
            path: Some("site.yml".to_string()),
            ..Default::default()
        };
        assert_eq!(entry.id(), "site.yml");

        let named = Entry {
            name: Some("site".to_string()),
            ..entry
        };
        assert_eq!(named.id(), "site");
    }
}
