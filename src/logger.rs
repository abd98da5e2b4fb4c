use std::io::Write;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;

struct RunnerLogger {
    file: Option<Mutex<std::fs::File>>,
    filter: LevelFilter,
    start: Instant,
}

impl RunnerLogger {
    fn format(&self, record: &Record) -> String {
        let elapsed = self.start.elapsed().as_secs_f64();
        format!(
            "[{elapsed:.3}s] [{}] {} — {}",
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for RunnerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        let _ = writeln!(std::io::stderr(), "{line}");
        if let Some(ref file) = self.file {
            let _ = writeln!(file.lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Pick the log level: `RUST_LOG` wins, then `debug`, then warnings only.
#[must_use]
pub fn level_filter(rust_log: Option<&str>, debug: bool) -> LevelFilter {
    rust_log
        .and_then(|s| s.parse().ok())
        .unwrap_or(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
}

/// Initialize the global logger, writing to stderr and optionally `log_file`.
///
/// # Errors
///
/// Returns `SetLoggerError` if a logger is already installed.
pub fn init(filter: LevelFilter, log_file: Option<std::fs::File>) -> Result<(), SetLoggerError> {
    let logger = RunnerLogger {
        file: log_file.map(Mutex::new),
        filter,
        start: Instant::now(),
    };
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(None, false), LevelFilter::Warn);
        assert_eq!(level_filter(None, true), LevelFilter::Debug);
        assert_eq!(level_filter(Some("trace"), false), LevelFilter::Trace);
        assert_eq!(level_filter(Some("nonsense"), true), LevelFilter::Debug);
    }
}
