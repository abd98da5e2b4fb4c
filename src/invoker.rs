//! Launching external programs
//!
//! An [`Invoker`] executes one argv token sequence and reports how it went. It
//! never fails: a program that cannot be started is reported with
//! [`LAUNCH_FAILURE_STATUS`] so the run can carry on with the next command.

use std::io::Write;
use std::process::{Command as ProcessCommand, Stdio};
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::commands::render_command_line;

/// Exit status recorded when a program could not be started or was killed by a signal
pub const LAUNCH_FAILURE_STATUS: i32 = 1;

/// What happened when a token sequence was executed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOutcome {
    pub exit_code: i32,
    pub duration: Duration,
    /// Set when the program could not be started
    pub launch_error: Option<String>,
    /// Captured output, empty when output was inherited
    pub stdout: String,
    pub stderr: String,
}

impl InvocationOutcome {
    #[must_use]
    pub fn exited(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes assembled command lines.
pub trait Invoker {
    /// Run `tokens[0]` with the remaining tokens as arguments and wait for it.
    fn invoke(&mut self, tokens: &[String]) -> InvocationOutcome;
}

impl<I: Invoker + ?Sized> Invoker for &mut I {
    fn invoke(&mut self, tokens: &[String]) -> InvocationOutcome {
        (**self).invoke(tokens)
    }
}

/// Spawns real processes. No stdin is provided.
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    capture_output: bool,
}

impl ProcessInvoker {
    /// With `capture_output` the child's stdout/stderr are collected into the
    /// outcome instead of going straight to the terminal.
    #[must_use]
    pub fn new(capture_output: bool) -> Self {
        Self { capture_output }
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, tokens: &[String]) -> InvocationOutcome {
        let start = Instant::now();
        let Some((program, args)) = tokens.split_first() else {
            return launch_failure("empty command line".to_string(), start.elapsed());
        };
        debug!("Launching {}", render_command_line(tokens));

        let mut command = ProcessCommand::new(program);
        command.args(args).stdin(Stdio::null());

        let outcome = if self.capture_output {
            command.output().map(|o| InvocationOutcome {
                exit_code: o.status.code().unwrap_or(LAUNCH_FAILURE_STATUS),
                duration: start.elapsed(),
                launch_error: None,
                stdout: String::from_utf8_lossy(&o.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&o.stderr).into_owned(),
            })
        } else {
            command.status().map(|s| InvocationOutcome {
                exit_code: s.code().unwrap_or(LAUNCH_FAILURE_STATUS),
                duration: start.elapsed(),
                ..Default::default()
            })
        };

        match outcome {
            Ok(outcome) => {
                debug!("`{program}` exited with {}", outcome.exit_code);
                outcome
            }
            Err(e) => {
                error!("Failed to run `{program}`: {e}");
                launch_failure(e.to_string(), start.elapsed())
            }
        }
    }
}

fn launch_failure(message: String, duration: Duration) -> InvocationOutcome {
    InvocationOutcome {
        exit_code: LAUNCH_FAILURE_STATUS,
        duration,
        launch_error: Some(message),
        ..Default::default()
    }
}

/// Prints each command line instead of running it; every command "succeeds".
pub struct PrintInvoker<W: Write> {
    out: W,
}

impl<W: Write> PrintInvoker<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Invoker for PrintInvoker<W> {
    fn invoke(&mut self, tokens: &[String]) -> InvocationOutcome {
        if let Err(e) = writeln!(self.out, "{}", render_command_line(tokens)) {
            error!("Failed to print command line: {e}");
        }
        InvocationOutcome::exited(0)
    }
}
