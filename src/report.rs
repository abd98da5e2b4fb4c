//! Human-readable progress output for a run

use std::io::{IsTerminal, Write};
use std::time::Duration;

use anstyle::{AnsiColor, Color, Reset, Style};

use crate::commands::render_command_line;
use crate::runner::{ExecutionRecord, RunReport};

const BOLD: Style = Style::new().bold();
const DIM: Style = Style::new().dimmed();
const GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
const YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Writes progress lines and the final summary.
pub struct Reporter {
    out: Box<dyn Write>,
    color: bool,
    /// Child output goes to the terminal between the start and result lines
    streaming: bool,
}

impl Reporter {
    /// Report to stderr, colored only when stderr is a terminal.
    #[must_use]
    pub fn stderr() -> Self {
        let color = std::io::stderr().is_terminal();
        Self::new(Box::new(std::io::stderr()), color)
    }

    /// Discard all output.
    #[must_use]
    pub fn sink() -> Self {
        Self::new(Box::new(std::io::sink()), false)
    }

    #[must_use]
    pub fn new(out: Box<dyn Write>, color: bool) -> Self {
        Self {
            out,
            color,
            streaming: false,
        }
    }

    /// Set when commands inherit the terminal instead of having their output captured.
    ///
    /// The start line is then terminated right away so child output begins on
    /// a fresh line, and the result line repeats the entry name.
    #[must_use]
    pub fn streaming_output(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    fn paint(&self, style: Style, s: &str) -> String {
        if self.color {
            format!("{style}{s}{Reset}")
        } else {
            s.to_string()
        }
    }

    // Best effort, a broken report stream never fails the run
    fn emit(&mut self, line: &str) {
        let _ = self.out.write_all(line.as_bytes());
        let _ = self.out.flush();
    }

    pub fn nothing_to_do(&mut self) {
        let line = format!(
            "{}\n",
            self.paint(
                DIM,
                "Nothing to work with. Add playbooks to the config file."
            )
        );
        self.emit(&line);
    }

    pub fn nothing_selected(&mut self) {
        let line = format!("{}\n", self.paint(YELLOW, "No playbooks matched the filter."));
        self.emit(&line);
    }

    /// Announce a command before it starts.
    ///
    /// With captured output the result follows on the same line.
    pub fn started(&mut self, position: usize, total: usize, entry: &str, tokens: &[String]) {
        let mut line = format_start(
            &self.paint(BOLD, &counter(position, total)),
            entry,
            tokens,
        );
        if self.streaming {
            line.truncate(line.trim_end().len());
            line.push('\n');
        }
        self.emit(&line);
    }

    pub fn finished(&mut self, record: &ExecutionRecord) {
        let outcome = &record.outcome;
        let duration = self.paint(DIM, &format_duration(outcome.duration));
        let prefix = if self.streaming {
            format!("{}: ", record.entry)
        } else {
            String::new()
        };
        let line = if outcome.success() {
            format!("{prefix}{} {duration}\n", self.paint(GREEN, "PASS"))
        } else if let Some(err) = &outcome.launch_error {
            format!(
                "{prefix}{} {duration}\n  {}\n",
                self.paint(RED, "FAIL"),
                self.paint(RED, &format!("could not start: {err}"))
            )
        } else {
            format!(
                "{prefix}{} {duration}\n",
                self.paint(RED, &format!("FAIL (exit {})", outcome.exit_code))
            )
        };
        self.emit(&line);

        // Captured output is only replayed for failures
        if !outcome.success() {
            let _ = self.out.write_all(outcome.stdout.as_bytes());
            let _ = self.out.write_all(outcome.stderr.as_bytes());
        }
    }

    pub fn summary(&mut self, report: &RunReport, elapsed: Duration) {
        let passed = report.passed();
        let failed = report.failed();
        let mut parts = Vec::new();
        if passed > 0 {
            parts.push(self.paint(GREEN, &format!("{passed} passed")));
        }
        if failed > 0 {
            parts.push(self.paint(RED, &format!("{failed} failed")));
        }
        if report.skipped > 0 {
            parts.push(self.paint(YELLOW, &format!("{} skipped", report.skipped)));
        }
        let line = format!(
            "\n{} {} {}\n",
            self.paint(BOLD, &format!("{} commands:", report.records.len())),
            parts.join(self.paint(DIM, ", ").as_str()),
            self.paint(DIM, &format!("({})", format_duration(elapsed)))
        );
        self.emit(&line);
    }
}

fn counter(position: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("[{position:>width$}/{total}]")
}

fn format_start(counter: &str, entry: &str, tokens: &[String]) -> String {
    format!("{counter} {entry}: {} ", render_command_line(tokens))
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let tenths = d.subsec_millis() / 100;
    if total_secs < 60 {
        format!("{total_secs}.{tenths}s")
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{mins}m {secs}.{tenths}s")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::commands::CommandKind;
    use crate::invoker::InvocationOutcome;

    /// In-memory writer whose contents stay readable after being boxed.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn record(entry: &str, exit_code: i32) -> ExecutionRecord {
        ExecutionRecord {
            entry: entry.to_string(),
            kind: CommandKind::Run,
            tokens: tokens(),
            outcome: InvocationOutcome::exited(exit_code),
        }
    }

    fn tokens() -> Vec<String> {
        vec!["ansible-playbook".to_string(), "site.yml".to_string()]
    }

    #[test]
    fn test_captured_result_shares_start_line() {
        let buffer = SharedBuffer::default();
        let mut reporter = Reporter::new(Box::new(buffer.clone()), false);
        reporter.started(1, 1, "site", &tokens());
        reporter.finished(&record("site", 0));
        assert_eq!(
            buffer.contents(),
            "[1/1] site: ansible-playbook site.yml PASS 0.0s\n"
        );
    }

    #[test]
    fn test_streaming_start_line_is_terminated() {
        let buffer = SharedBuffer::default();
        let mut reporter = Reporter::new(Box::new(buffer.clone()), false).streaming_output(true);
        reporter.started(1, 2, "site", &tokens());
        // Inherited child output lands here, after the start line
        assert_eq!(buffer.contents(), "[1/2] site: ansible-playbook site.yml\n");

        reporter.finished(&record("site", 2));
        assert_eq!(
            buffer.contents(),
            "[1/2] site: ansible-playbook site.yml\nsite: FAIL (exit 2) 0.0s\n"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1250)), "1.2s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5.0s");
    }

    #[test]
    fn test_counter_is_padded() {
        assert_eq!(counter(3, 12), "[ 3/12]");
        assert_eq!(counter(1, 1), "[1/1]");
    }

    #[test]
    fn test_format_start() {
        let tokens: Vec<String> = ["ansible-playbook", "site.yml", "--limit", "web servers"]
            .iter()
            .map(ToString::to_string)
            .collect();
        insta::assert_snapshot!(
            format_start("[1/2]", "site", &tokens).trim_end(),
            @"[1/2] site: ansible-playbook site.yml --limit 'web servers'"
        );
    }
}
