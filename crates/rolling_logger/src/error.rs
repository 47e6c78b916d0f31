use std::{convert::Infallible, path::PathBuf};

use crate::{Level, Location};

/// Errors that can occur within the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Represents an error in configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The log file could not be created or opened for appending.
    #[error("Failed to open log file `{}`: {source}", .path.display())]
    OpenFile {
        /// Path of the log file.
        path: PathBuf,

        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Represents any other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A level name or code that does not map to any [`Level`].
    #[error("Unknown log level: `{0}`")]
    UnknownLevel(String),

    /// Represents an error while formatting a timestamp.
    #[error("Failed to format timestamp: {0}")]
    TimestampFormat(#[from] time::error::Format),

    /// Represents an error during JSON (de)serialization.
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl From<Infallible> for LoggerError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// The error value returned by the `error` and `fatal` emitters.
///
/// The message has already been logged when this value is constructed; it exists so that
/// callers can propagate the same message through their own error handling.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoggedError {
    level: Level,
    location: Location,
    message: String,
}

impl LoggedError {
    pub(crate) fn new(level: Level, location: Location, message: String) -> Self {
        Self {
            level,
            location,
            message,
        }
    }

    /// Level the message was logged at.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Call site that produced the message.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The formatted message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
