//! Logging for the multiview GL driver
//!
//! - Customizable logger via the `Logger` trait (installed with `Driver::set_logger`)
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default, filtered by a minimum severity
//! - file:line information for validation failures and errors

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use multiview_gl::mvgl::log::{Logger, LogEntry};
///
/// struct CaptureLogger;
///
/// impl Logger for CaptureLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Store the entry somewhere...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "mvgl::Context", "mvgl::Framebuffer")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (validation failures and errors only)
    pub file: Option<&'static str>,

    /// Source line (validation failures and errors only)
    pub line: Option<u32>,
}

impl LogEntry {
    /// Render the entry without colors: `[SEVERITY] [source] message (file:line)`
    pub fn plain_text(&self) -> String {
        let mut text = format!("[{}] [{}] {}", self.severity.label(), self.source, self.message);
        if let (Some(file), Some(line)) = (self.file, self.line) {
            text.push_str(&format!(" ({}:{})", file, line));
        }
        text
    }
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-call tracing of entry points
    Trace,

    /// State changes (attachments, bindings, extension activation)
    Debug,

    /// Context and driver lifecycle
    Info,

    /// Rejected calls (GL errors recorded on a context)
    Warn,

    /// Driver-level failures
    Error,
}

impl LogSeverity {
    /// Fixed-width label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Default logger: colored console output
///
/// Entries below `min_severity` are dropped.
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - With location: `[timestamp] [SEVERITY] [source] message (file:line)`
pub struct DefaultLogger {
    pub min_severity: LogSeverity,
}

impl DefaultLogger {
    pub fn new(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new(LogSeverity::Info)
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity < self.min_severity {
            return;
        }

        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let label = entry.severity.label();
        let severity_str = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! mvgl_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::mvgl::Driver::log(
            $crate::mvgl::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
///
/// ```ignore
/// mvgl_debug!("mvgl::Framebuffer", "Attached {} views", count);
/// ```
#[macro_export]
macro_rules! mvgl_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::mvgl::Driver::log(
            $crate::mvgl::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! mvgl_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::mvgl::Driver::log(
            $crate::mvgl::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! mvgl_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::mvgl::Driver::log(
            $crate::mvgl::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! mvgl_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::mvgl::Driver::log_detailed(
            $crate::mvgl::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Build an `Error` of the given variant, logging it (WARN, file:line) first
///
/// ```ignore
/// let err = mvgl_err!("mvgl::Context", InvalidValue, "negative view count {}", n);
/// ```
#[macro_export]
macro_rules! mvgl_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::mvgl::Driver::log_detailed(
            $crate::mvgl::log::LogSeverity::Warn,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::mvgl::Error::$variant(message)
    }};
}

/// Return early with an `Error` built by `mvgl_err!`
#[macro_export]
macro_rules! mvgl_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::mvgl_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
