//! Sequential execution of configured playbooks
//!
//! [`Runner::run`] walks the configured entries in order and hands each one to
//! [`Runner::process_entry`], which optionally installs dependencies with
//! `ansible-galaxy` and then runs the playbook. Every invocation produces an
//! [`ExecutionRecord`]; the run succeeds only if every record exited `0`.

use std::collections::HashSet;
use std::time::Instant;

use log::{debug, info, warn};
use thiserror::Error;

use crate::commands::{BuildError, CommandBuilder, CommandKind, render_command_line};
use crate::env::Environment;
use crate::invoker::{InvocationOutcome, Invoker};
use crate::options::{ResolveError, merge};
use crate::playbook::{Config, Entry};
use crate::report::Reporter;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("playbook '{entry}' must define a non-empty `{key}` list")]
    MissingOptions { entry: String, key: &'static str },

    #[error("playbook '{entry}': {source}")]
    Resolve {
        entry: String,
        #[source]
        source: ResolveError,
    },

    #[error("playbook '{entry}': {source}")]
    Build {
        entry: String,
        #[source]
        source: BuildError,
    },

    #[error("{0} playbook(s) were processed but no command was executed")]
    EmptyRun(usize),
}

/// One external invocation and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    /// Identifying name of the entry the command belongs to
    pub entry: String,
    pub kind: CommandKind,
    pub tokens: Vec<String>,
    pub outcome: InvocationOutcome,
}

/// Everything that happened during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub records: Vec<ExecutionRecord>,
    /// Entries excluded by the filter
    pub skipped: usize,
}

impl RunReport {
    /// `0` if every recorded command exited `0`, `1` otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.failed() > 0)
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.records.len() - self.passed()
    }
}

/// Drives entries through option merging, command assembly and invocation.
pub struct Runner<E, I> {
    builder: CommandBuilder,
    env: E,
    invoker: I,
    reporter: Reporter,
    /// Number of commands the current run is expected to execute
    planned: usize,
}

impl<E: Environment, I: Invoker> Runner<E, I> {
    /// A runner that reports nothing. See [`Runner::with_reporter`].
    pub fn new(builder: CommandBuilder, env: E, invoker: I) -> Self {
        Self {
            builder,
            env,
            invoker,
            reporter: Reporter::sink(),
            planned: 0,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn into_invoker(self) -> I {
        self.invoker
    }

    /// Run every entry, or only those named in `filter` when it is non-empty.
    ///
    /// # Errors
    ///
    /// Configuration and resolution errors abort the run at the entry where they
    /// occur. Commands that fail or cannot be started do not; they are recorded
    /// and reflected in [`RunReport::exit_code`].
    pub fn run(&mut self, config: &Config, filter: &[String]) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        if config.entries.is_empty() {
            info!("No playbooks configured");
            self.reporter.nothing_to_do();
            return Ok(report);
        }

        warn_unknown_filter_names(config, filter);
        let selected: Vec<&Entry> = config
            .entries
            .iter()
            .filter(|entry| {
                let keep = filter.is_empty() || filter.iter().any(|name| name == entry.id());
                if !keep {
                    debug!("Skipping playbook '{}' (not in filter)", entry.id());
                }
                keep
            })
            .collect();
        report.skipped = config.entries.len() - selected.len();

        if selected.is_empty() {
            warn!("Every playbook was excluded by the filter {filter:?}");
            self.reporter.nothing_selected();
            return Ok(report);
        }

        self.planned = selected
            .iter()
            .map(|e| 1 + usize::from(e.requires_dependency_install))
            .sum();
        let start = Instant::now();
        for entry in &selected {
            self.process_entry(entry, config, &mut report.records)?;
        }

        if report.records.is_empty() {
            return Err(RunError::EmptyRun(selected.len()));
        }
        self.reporter.summary(&report, start.elapsed());
        info!(
            "Run finished: {} passed, {} failed",
            report.passed(),
            report.failed()
        );
        Ok(report)
    }

    /// Process one entry, appending a record per invocation to `records`.
    ///
    /// Both option groups are validated before anything is executed. A failed
    /// dependency install does not prevent the playbook run.
    ///
    /// # Errors
    ///
    /// Returns `RunError::MissingOptions` if a required option list is absent or
    /// empty, and `RunError::Resolve`/`RunError::Build` if a command cannot be
    /// assembled.
    pub fn process_entry(
        &mut self,
        entry: &Entry,
        config: &Config,
        records: &mut Vec<ExecutionRecord>,
    ) -> Result<(), RunError> {
        let mut kinds = Vec::with_capacity(2);
        if entry.requires_dependency_install {
            kinds.push(CommandKind::DependencyInstall);
        }
        kinds.push(CommandKind::Run);

        for &kind in &kinds {
            if entry.options(kind).is_empty() {
                return Err(RunError::MissingOptions {
                    entry: entry.id().to_string(),
                    key: kind.spec().options_key,
                });
            }
        }

        for kind in kinds {
            let tokens = self.assemble(entry, config, kind)?;
            let position = records.len() + 1;
            self.reporter
                .started(position, self.planned.max(position), entry.id(), &tokens);
            let outcome = self.invoker.invoke(&tokens);
            debug!(
                "Executed `{}`, exit code {}",
                render_command_line(&tokens),
                outcome.exit_code
            );
            let record = ExecutionRecord {
                entry: entry.id().to_string(),
                kind,
                tokens,
                outcome,
            };
            self.reporter.finished(&record);
            records.push(record);
        }
        Ok(())
    }

    fn assemble(
        &self,
        entry: &Entry,
        config: &Config,
        kind: CommandKind,
    ) -> Result<Vec<String>, RunError> {
        let options = merge(config.global_options(kind), entry.options(kind), &self.env)
            .map_err(|source| RunError::Resolve {
                entry: entry.id().to_string(),
                source,
            })?;
        for name in options.conflicting_names() {
            warn!(
                "Playbook '{}': option `{name}` is given more than once with different values",
                entry.id()
            );
        }
        self.builder
            .build(kind, &options, entry.path.as_deref())
            .map_err(|source| RunError::Build {
                entry: entry.id().to_string(),
                source,
            })
    }
}

fn warn_unknown_filter_names(config: &Config, filter: &[String]) {
    let known: HashSet<&str> = config.entries.iter().map(Entry::id).collect();
    for name in filter {
        if !known.contains(name.as_str()) {
            warn!("Playbook filter '{name}' does not match any configured playbook");
        }
    }
}
