//! Logger utility for application-wide logging
//!
//! The default CLI setup logs to stderr through `env_logger`. With a log
//! file, this logger takes its place: every record goes to the file and is
//! echoed to stderr, so stdout stays reserved for results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// File-backed logger
pub struct Logger {
    /// File handle for log output
    file: Mutex<File>,
    /// Most verbose level that is recorded
    level: Level,
}

impl Logger {
    /// Creates a new logger instance
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file, truncated if it exists
    /// * `level` - Most verbose level that is recorded
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be created
    pub fn new<P: AsRef<Path>>(log_file: P, level: Level) -> io::Result<Self> {
        let file = File::create(log_file)?;
        Ok(Logger { file: Mutex::new(file), level })
    }

    /// Writes one line to the log file
    ///
    /// # Arguments
    ///
    /// * `message` - The message to log
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        let mut file = self.file.lock().map_err(|_| io::Error::other("log file lock poisoned"))?;
        writeln!(file, "{}", message)?;
        file.flush()
    }

    /// Installs a file logger as the global `log` backend
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    /// * `level` - Most verbose level that is recorded
    pub fn init_global_logger<P: AsRef<Path>>(log_file: P, level: Level) -> io::Result<()> {
        let global_logger = Logger::new(log_file, level)?;

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Installs `env_logger` on stderr
    ///
    /// `RUST_LOG` overrides `default_level` when set.
    pub fn init_stderr_logger(default_level: LevelFilter) {
        let _ = env_logger::Builder::new()
            .filter_level(default_level)
            .parse_default_env()
            .format_timestamp(None)
            .try_init();
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let _ = self.write_line(&message);

            // Also print to console
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_records_are_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imagesniff.log");
        let logger = Logger::new(&path, Level::Info).unwrap();

        logger.log(&Record::builder()
            .level(Level::Warn)
            .target("imagesniff::jpeg")
            .args(format_args!("Segment runs past the end"))
            .build());
        logger.log(&Record::builder()
            .level(Level::Debug)
            .args(format_args!("not recorded"))
            .build());
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[WARN] imagesniff::jpeg: Segment runs past the end\n");
    }
}
