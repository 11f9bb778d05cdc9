//! Per-run logger with file and sink output.
//!
//! Each run gets its own logger that:
//! - Writes to a dedicated log file (optional)
//! - Sends messages to a sink callback (console, tests)
//! - Keeps external tool output in a tail buffer
//! - Shows that tail after a tool failure

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, LogSink, MessagePrefix};

/// Per-run logger with dual output (file + sink).
pub struct RunLogger {
    /// Path to log file, if one was opened.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Sink receiving every formatted line.
    sink: Mutex<Option<LogSink>>,
    /// Logging configuration.
    config: LogConfig,
    /// Recent tool output lines.
    tail_buffer: Mutex<VecDeque<String>>,
}

impl RunLogger {
    /// Create a logger with no outputs attached.
    pub fn new(config: LogConfig) -> Self {
        Self {
            log_path: None,
            file_writer: Mutex::new(None),
            sink: Mutex::new(None),
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
        }
    }

    /// Attach a sink that receives each formatted line.
    pub fn with_sink(self, sink: LogSink) -> Self {
        *self.sink.lock() = Some(sink);
        self
    }

    /// Open `quizrip_<timestamp>.log` in `log_dir`.
    pub fn with_log_file(mut self, log_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("quizrip_{}.log", stamp));
        let file = File::create(&log_path)?;

        *self.file_writer.lock() = Some(BufWriter::new(file));
        self.log_path = Some(log_path);
        Ok(self)
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a failed entry.
    pub fn failed(&self, message: &str) {
        let msg = MessagePrefix::Failed.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Record one line of external tool output.
    ///
    /// In compact mode, lines only go to the tail buffer.
    pub fn output_line(&self, line: &str) {
        {
            let mut buffer = self.tail_buffer.lock();
            if self.config.error_tail > 0 && buffer.len() >= self.config.error_tail {
                buffer.pop_front();
            }
            if self.config.error_tail > 0 {
                buffer.push_back(line.to_string());
            }
        }

        if self.config.compact {
            return;
        }

        let msg = format!("[tool] {}", line);
        self.log(LogLevel::Debug, &msg);
    }

    /// Show the tail buffer (typically after an error) and clear it.
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.tail_buffer.lock().drain(..).collect();
        if lines.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            self.output(&self.format_message(line));
        }
    }

    /// Clear the tail buffer.
    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the log file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Output a formatted message to file and sink.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref sink) = *self.sink.lock() {
            sink(formatted);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn collecting(config: LogConfig) -> (RunLogger, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let clone = Arc::clone(&lines);
        let sink: LogSink = Box::new(move |msg| clone.lock().push(msg.to_string()));
        (RunLogger::new(config).with_sink(sink), lines)
    }

    fn plain() -> LogConfig {
        LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn creates_log_file() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new(LogConfig::default())
            .with_log_file(dir.path())
            .unwrap();

        let path = logger.log_path().unwrap().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("quizrip_"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let logger = RunLogger::new(LogConfig::default())
            .with_log_file(dir.path())
            .unwrap();

        logger.info("Test message");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("Test message"));
    }

    #[test]
    fn sink_receives_prefixed_lines() {
        let (logger, lines) = collecting(plain());

        logger.phase("Dispatch");
        logger.failed("07-Song.mp3: boom");

        let lines = lines.lock();
        assert_eq!(lines[0], "=== Dispatch ===");
        assert_eq!(lines[1], "[FAILED] 07-Song.mp3: boom");
    }

    #[test]
    fn level_filters_debug() {
        let (logger, lines) = collecting(plain());
        logger.debug("hidden");
        logger.info("shown");
        assert_eq!(lines.lock().len(), 1);
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let mut config = plain();
        config.error_tail = 5;
        let logger = RunLogger::new(config);

        for i in 0..10 {
            logger.output_line(&format!("Line {}", i));
        }

        let tail = logger.get_tail();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0], "Line 5");
        assert_eq!(tail[4], "Line 9");
    }

    #[test]
    fn compact_mode_keeps_tool_output_quiet() {
        let (logger, lines) = collecting(plain());
        logger.output_line("ffmpeg noise");
        assert!(lines.lock().is_empty());

        logger.show_tail("ffmpeg");
        let lines = lines.lock();
        assert_eq!(lines[0], "[ffmpeg/tail]");
        assert_eq!(lines[1], "ffmpeg noise");
        assert!(logger.get_tail().is_empty());
    }
}
