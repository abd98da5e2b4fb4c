use thiserror::Error;

use crate::commands::kind::CommandKind;
use crate::options::OptionSet;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{kind} requires a target path, but none was given")]
    MissingTarget { kind: CommandKind },
}

/// Program names used for each command kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Programs {
    pub galaxy: String,
    pub playbook: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            galaxy: CommandKind::DependencyInstall.spec().program.to_string(),
            playbook: CommandKind::Run.spec().program.to_string(),
        }
    }
}

impl Programs {
    #[must_use]
    pub fn get(&self, kind: CommandKind) -> &str {
        match kind {
            CommandKind::DependencyInstall => &self.galaxy,
            CommandKind::Run => &self.playbook,
        }
    }
}

/// Assembles argv tokens for an invocation. Does not touch processes.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    programs: Programs,
    check_mode: bool,
}

/// Flag appended after the playbook path in check mode
pub const CHECK_MODE_FLAG: &str = "-C";

impl CommandBuilder {
    #[must_use]
    pub fn new(programs: Programs, check_mode: bool) -> Self {
        Self {
            programs,
            check_mode,
        }
    }

    /// Build the full token sequence for `kind`.
    ///
    /// Options with a value become two tokens, `name` then `value`. `path` is
    /// ignored for kinds that take no target.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingTarget` if `kind` takes a target and `path`
    /// is absent or empty.
    pub fn build(
        &self,
        kind: CommandKind,
        options: &OptionSet,
        path: Option<&str>,
    ) -> Result<Vec<String>, BuildError> {
        let spec = kind.spec();
        let mut tokens = vec![self.programs.get(kind).to_string()];
        if let Some(subcommand) = spec.subcommand {
            tokens.push(subcommand.to_string());
        }
        if spec.takes_target {
            let path = path
                .filter(|p| !p.is_empty())
                .ok_or(BuildError::MissingTarget { kind })?;
            tokens.push(path.to_string());
        }
        if spec.supports_check_mode && self.check_mode {
            tokens.push(CHECK_MODE_FLAG.to_string());
        }
        for option in options {
            tokens.push(option.name.clone());
            if let Some(value) = &option.value {
                tokens.push(value.clone());
            }
        }
        Ok(tokens)
    }
}

/// Render tokens as a single shell-style line, quoting where needed.
#[must_use]
pub fn render_command_line(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResolvedOption;

    #[test]
    fn test_run_without_options() {
        let tokens = CommandBuilder::default()
            .build(CommandKind::Run, &OptionSet::new(), Some("/path/play.yml"))
            .unwrap();
        assert_eq!(tokens, vec!["ansible-playbook", "/path/play.yml"]);
    }

    #[test]
    fn test_run_check_mode() {
        let tokens = CommandBuilder::new(Programs::default(), true)
            .build(CommandKind::Run, &OptionSet::new(), Some("/path/play.yml"))
            .unwrap();
        assert_eq!(tokens, vec!["ansible-playbook", "/path/play.yml", "-C"]);
    }

    #[test]
    fn test_install_ignores_path_and_check_mode() {
        let options: OptionSet = [ResolvedOption::flag("opt1")].into_iter().collect();
        let tokens = CommandBuilder::new(Programs::default(), true)
            .build(CommandKind::DependencyInstall, &options, Some("site.yml"))
            .unwrap();
        assert_eq!(tokens, vec!["ansible-galaxy", "install", "opt1"]);
    }

    #[test]
    fn test_values_are_separate_tokens() {
        let options: OptionSet = [
            ResolvedOption::new("-e", Some("greeting=hello world")),
            ResolvedOption::flag("--diff"),
        ]
        .into_iter()
        .collect();
        let tokens = CommandBuilder::default()
            .build(CommandKind::Run, &options, Some("site.yml"))
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                "ansible-playbook",
                "site.yml",
                "-e",
                "greeting=hello world",
                "--diff"
            ]
        );
    }

    #[test]
    fn test_run_requires_target() {
        let builder = CommandBuilder::default();
        for path in [None, Some("")] {
            assert!(matches!(
                builder.build(CommandKind::Run, &OptionSet::new(), path),
                Err(BuildError::MissingTarget {
                    kind: CommandKind::Run
                })
            ));
        }
    }

    #[test]
    fn test_program_overrides() {
        let programs = Programs {
            galaxy: "/opt/ansible/bin/ansible-galaxy".to_string(),
            playbook: "/opt/ansible/bin/ansible-playbook".to_string(),
        };
        let tokens = CommandBuilder::new(programs, false)
            .build(CommandKind::DependencyInstall, &OptionSet::new(), None)
            .unwrap();
        assert_eq!(tokens, vec!["/opt/ansible/bin/ansible-galaxy", "install"]);
    }

    #[test]
    fn test_render_command_line() {
        let tokens: Vec<String> = [
            "ansible-playbook",
            "site.yml",
            "-e",
            "msg=it's here",
            "--limit",
            "",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        insta::assert_snapshot!(
            render_command_line(&tokens),
            @r"ansible-playbook site.yml -e 'msg=it'\''s here' --limit ''"
        );
    }
}
