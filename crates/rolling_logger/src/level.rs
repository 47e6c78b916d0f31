//! Severity levels and their canonical names.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

use crate::LoggerError;

/// Severity of a log record, in ascending order.
///
/// [`Level::Json`] is a pseudo-level used only for structured dumps: it is never filtered out and
/// never carries a call-stack trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Very fine-grained diagnostics.
    Trace = 0,

    /// Debugging information.
    Debug = 1,

    /// Normal operational messages.
    #[default]
    Info = 2,

    /// Something unexpected that does not stop the caller.
    Warn = 3,

    /// A failure the caller is expected to handle.
    Error = 4,

    /// A failure the caller most likely cannot recover from.
    Fatal = 5,

    /// Logged immediately before the calling thread is aborted.
    Panic = 6,

    /// Pseudo-level for structured dumps.
    Json = 7,
}

impl Level {
    /// All levels, indexed by their numeric code.
    pub const ALL: [Self; 8] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Panic,
        Self::Json,
    ];

    /// Numeric code of this level.
    #[allow(clippy::as_conversions)]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a level by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Lower-case name of this level, as accepted by [`Level::from_str`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
            Self::Json => "json",
        }
    }

    /// Bracketed tag written in front of every log line, e.g. `[WARN]`.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Trace => "[TRACE]",
            Self::Debug => "[DEBUG]",
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
            Self::Fatal => "[FATAL]",
            Self::Panic => "[PANIC]",
            Self::Json => "[JSON]",
        }
    }

    /// Whether records at this level get a call-stack trace appended.
    pub const fn has_call_stack(self) -> bool {
        matches!(self, Self::Error | Self::Fatal | Self::Panic)
    }

    /// ANSI color sequence used for the console header of this level.
    pub(crate) const fn color(self) -> &'static str {
        match self {
            Self::Trace => "\x1b[37m",
            Self::Debug | Self::Json => "\x1b[34m",
            Self::Info => "\x1b[32m",
            Self::Warn => "\x1b[33m",
            Self::Error => "\x1b[31m",
            Self::Fatal | Self::Panic => "\x1b[35m",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            "fatal" => Self::Fatal,
            "panic" => Self::Panic,
            "json" => Self::Json,
            _ => return Err(LoggerError::UnknownLevel(s.to_string())),
        };
        Ok(level)
    }
}

impl TryFrom<&str> for Level {
    type Error = LoggerError;

    fn try_from(value: &str) -> Result<Self, LoggerError> {
        value.parse()
    }
}

impl TryFrom<u8> for Level {
    type Error = LoggerError;

    fn try_from(value: u8) -> Result<Self, LoggerError> {
        Self::from_code(value).ok_or_else(|| LoggerError::UnknownLevel(value.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Code(u8),
    Name(String),
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let level = match LevelRepr::deserialize(deserializer)? {
            LevelRepr::Code(code) => Self::try_from(code),
            LevelRepr::Name(name) => name.parse(),
        };
        level.map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "tracing-layer")]
impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::TRACE {
            Self::Trace
        } else if level == tracing::Level::DEBUG {
            Self::Debug
        } else if level == tracing::Level::INFO {
            Self::Info
        } else if level == tracing::Level::WARN {
            Self::Warn
        } else {
            Self::Error
        }
    }
}
