//! Engine log sink configuration.

use crate::engine::PactEngine;
use crate::error::PactError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// Log level understood by both the engine and the local subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Nothing is emitted
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// All levels, quietest first.
    pub const ALL: [Self; 6] = [
        Self::Off,
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Value of the engine's `LevelFilter` enum.
    #[must_use]
    pub const fn native(self) -> u32 {
        match self {
            Self::Off => 0,
            Self::Error => 1,
            Self::Warn => 2,
            Self::Info => 3,
            Self::Debug => 4,
            Self::Trace => 5,
        }
    }

    /// Lowercase name, also used as the `tracing` filter directive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = PactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(PactError::config(format!("unknown log level: {s}"))),
        }
    }
}

/// Where the engine writes its log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogSink {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error
    Stderr,
    /// A file
    File(PathBuf),
}

impl LogSink {
    /// Sink specifier in the engine's syntax.
    #[must_use]
    pub fn specifier(&self) -> String {
        match self {
            Self::Stdout => "stdout".to_string(),
            Self::Stderr => "stderr".to_string(),
            Self::File(path) => format!("file {}", path.display()),
        }
    }
}

impl FromStr for LogSink {
    type Err = PactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => match s.strip_prefix("file ") {
                Some(path) if !path.trim().is_empty() => Ok(Self::File(PathBuf::from(path.trim()))),
                _ => Err(PactError::config(format!("unknown log sink: {s}"))),
            },
        }
    }
}

/// Install `sink` as the engine's only log sink, filtered at `level`.
///
/// Logging is diagnostic: a sink or apply status other than zero (the engine
/// refuses a second configuration, for instance) is reported and the run
/// carries on. Returns whether the configuration took effect.
///
/// # Errors
///
/// Returns an error only if the sink specifier cannot be encoded.
pub fn configure_engine_logging<E>(engine: &E, sink: &LogSink, level: LogLevel) -> Result<bool, PactError>
where
    E: PactEngine + ?Sized,
{
    debug!(sink = %sink.specifier(), %level, "initializing engine logger");
    engine.logger_init();

    let status = engine.logger_attach_sink(&sink.specifier(), level)?;
    if status != 0 {
        warn!(status, sink = %sink.specifier(), "pactffi_logger_attach_sink failed, continuing without engine logs");
        return Ok(false);
    }

    let status = engine.logger_apply();
    if status != 0 {
        warn!(status, "pactffi_logger_apply failed, continuing without engine logs");
        return Ok(false);
    }

    debug!("engine logger initialized");
    Ok(true)
}

/// Emit `message` through the engine's logger. [`LogLevel::Off`] emits nothing.
///
/// # Errors
///
/// Returns an error if an argument cannot be encoded.
pub fn log_message<E>(engine: &E, source: &str, level: LogLevel, message: &str) -> Result<(), PactError>
where
    E: PactEngine + ?Sized,
{
    if level == LogLevel::Off {
        return Ok(());
    }
    engine.log_message(source, level.as_str(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_level_filters() {
        let natives: Vec<u32> = LogLevel::ALL.iter().map(|l| l.native()).collect();
        assert_eq!(natives, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parse_levels() {
        for level in LogLevel::ALL {
            assert_eq!(level.as_str().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_sink_specifiers() {
        assert_eq!(LogSink::Stdout.specifier(), "stdout");
        assert_eq!("stderr".parse::<LogSink>().unwrap(), LogSink::Stderr);
        let file = "file /tmp/pact.log".parse::<LogSink>().unwrap();
        assert_eq!(file, LogSink::File(PathBuf::from("/tmp/pact.log")));
        assert_eq!(file.specifier(), "file /tmp/pact.log");
        assert!("file ".parse::<LogSink>().is_err());
        assert!("syslog".parse::<LogSink>().is_err());
    }
}
