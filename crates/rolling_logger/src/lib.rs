//! `rolling_logger` provides leveled logging to the console and to a size-rotated log file.
//!
//! It offers:
//! - A [`Logger`] that filters records by [`Level`], mirrors them to standard output and appends
//!   them to a log file, one line per record, safely from any number of threads.
//! - A background maintenance thread that rotates the file once it outgrows its size limit and
//!   deletes the oldest rotated backups.
//! - Macros capturing the call site of every record ([`info!`], [`errorf!`], [`warnw!`], ...),
//!   and call-timing helpers ([`enter!`], [`leave!`], [`timed!`]).
//! - JSON debug dumps ([`dump!`], [`dump_struct!`]).
//! - With the `tracing-layer` feature, a [`LoggerLayer`] forwarding [`tracing`] events into a
//!   [`Logger`].
//!
//! ```
//! use rolling_logger::{Logger, Options};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::open(dir.path().join("service.log"), Options::default()).unwrap();
//!
//! rolling_logger::info!(logger, "listening on port", 8080);
//! let error = rolling_logger::errorf!(logger, "peer {} refused the connection", "10.0.0.7");
//! assert_eq!(error.to_string(), "peer 10.0.0.7 refused the connection");
//! ```

mod macros;

mod config;
mod console;
pub mod dump;
mod error;
mod format;
#[cfg(feature = "tracing-layer")]
mod layer;
mod level;
mod location;
mod logger;
mod maintenance;
mod retention;
mod rotation;
mod timing;
mod writer;

#[cfg(feature = "tracing-layer")]
pub use self::layer::LoggerLayer;
pub use self::{
    config::{
        LogConfig, Options, DEFAULT_FILE_SIZE_LIMIT_MB, DEFAULT_MAINTENANCE_INTERVAL,
        DEFAULT_MAX_BACKUPS, ENV_LOG_LEVEL,
    },
    error::{LoggedError, LoggerError},
    format::{truncate, DEFAULT_SEPARATOR, TRUNCATION_MARKER},
    level::Level,
    location::{routine_id, Location},
    logger::{CallGuard, Logger},
    maintenance::MaintenanceReport,
    timing::{CallStats, Elapsed},
};

/// Items referenced by the exported macros. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::{
        format::{spread, weak_join},
        location::short_function_name,
    };
}
