use std::fmt;

/// Static description of a command kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: &'static str,
    /// Subcommand placed right after the program, if any
    pub subcommand: Option<&'static str>,
    /// Key of the per-playbook option list in the config file
    pub options_key: &'static str,
    /// Key of the global option list in the config file
    pub global_options_key: &'static str,
    pub takes_target: bool,
    pub supports_check_mode: bool,
}

/// The external programs the runner knows how to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `ansible-galaxy install`
    DependencyInstall,
    /// `ansible-playbook <path>`
    Run,
}

const DEPENDENCY_INSTALL: CommandSpec = CommandSpec {
    program: "ansible-galaxy",
    subcommand: Some("install"),
    options_key: "galaxy_cli_options",
    global_options_key: "global_galaxy_cli_options",
    takes_target: false,
    supports_check_mode: false,
};

const RUN: CommandSpec = CommandSpec {
    program: "ansible-playbook",
    subcommand: None,
    options_key: "cli_options",
    global_options_key: "global_cli_options",
    takes_target: true,
    supports_check_mode: true,
};

impl CommandKind {
    #[must_use]
    pub const fn spec(self) -> &'static CommandSpec {
        match self {
            CommandKind::DependencyInstall => &DEPENDENCY_INSTALL,
            CommandKind::Run => &RUN,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::DependencyInstall => f.write_str("dependency install"),
            CommandKind::Run => f.write_str("playbook run"),
        }
    }
}
