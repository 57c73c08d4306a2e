//! Persisted log verbosity.
//!
//! Settings store verbosity as a small integer so the host's settings blob
//! stays stable. This module maps it onto `tracing` filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::level_filters::LevelFilter;

/// Log verbosity, persisted as `0..=6`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
    Verbose = 5,
    Trace = 6,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::None,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Verbose,
        LogLevel::Trace,
    ];

    /// Filter for a `tracing` subscriber. `Verbose` has no tracing level of
    /// its own and shares `DEBUG`.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::None => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug | LogLevel::Verbose => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Levels that are reset to [`LogLevel::Info`] after a while
    pub fn is_elevated(self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Verbose | LogLevel::Trace)
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Trace => "trace",
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("log level {value} is outside 0..=6"))
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_round_trip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::try_from(u8::from(level)), Ok(level));
        }
        assert!(LogLevel::try_from(7).is_err());
    }

    #[test]
    fn test_out_of_range_level_is_rejected() {
        assert_eq!(serde_json::from_str::<LogLevel>("6").unwrap(), LogLevel::Trace);
        let err = serde_json::from_str::<LogLevel>("9").unwrap_err();
        assert!(err.to_string().contains("outside 0..=6"));
    }

    #[test]
    fn test_verbose_collapses_onto_debug() {
        assert_eq!(LogLevel::Verbose.level_filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::None.level_filter(), LevelFilter::OFF);
        assert_eq!(LogLevel::Trace.level_filter(), LevelFilter::TRACE);
    }

    #[test]
    fn test_elevated_levels() {
        let elevated: Vec<_> = LogLevel::ALL.into_iter().filter(|l| l.is_elevated()).collect();
        assert_eq!(elevated, vec![LogLevel::Debug, LogLevel::Verbose, LogLevel::Trace]);
    }
}
