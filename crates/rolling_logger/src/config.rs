//! Logger configuration.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering},
    time::Duration,
};

use serde::Deserialize;

use crate::{Level, LoggerError};

/// Default size, in megabytes, at which the active log file is rotated.
pub const DEFAULT_FILE_SIZE_LIMIT_MB: u64 = 1024;

/// Default number of rotated backup files retained.
pub const DEFAULT_MAX_BACKUPS: usize = 31;

/// Default interval between two maintenance (rotation and retention) ticks.
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(30);

/// Environment variable overriding the configured minimum level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Options accepted when opening a [`Logger`](crate::Logger).
///
/// All fields can also be changed at runtime through the setters on
/// [`Logger`](crate::Logger).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    /// Minimum severity emitted to the console and the log file.
    pub log_level: Level,

    /// Size in megabytes above which the active file is rotated. `0` selects
    /// [`DEFAULT_FILE_SIZE_LIMIT_MB`].
    pub file_size_limit_mb: u64,

    /// Number of rotated backups kept by the retention sweep. `0` disables the sweep.
    pub max_backups: usize,

    /// If `true`, records are not mirrored to standard output.
    pub console_disabled: bool,

    /// Seconds between two maintenance ticks. `0` selects [`DEFAULT_MAINTENANCE_INTERVAL`].
    pub maintenance_interval_secs: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_level: Level::Info,
            file_size_limit_mb: DEFAULT_FILE_SIZE_LIMIT_MB,
            max_backups: DEFAULT_MAX_BACKUPS,
            console_disabled: false,
            maintenance_interval_secs: DEFAULT_MAINTENANCE_INTERVAL.as_secs(),
        }
    }
}

impl Options {
    /// Applies the [`ENV_LOG_LEVEL`] environment variable, if it is set.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::UnknownLevel`] if the variable holds neither a level name nor a
    /// numeric level code.
    pub fn with_env_overrides(mut self) -> Result<Self, LoggerError> {
        if let Ok(value) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = parse_level_setting(&value)?;
        }
        Ok(self)
    }

    /// The rotation threshold in bytes, with `0` mapped to the default.
    pub(crate) fn file_size_limit_bytes(&self) -> u64 {
        mb_to_bytes(self.file_size_limit_mb)
    }

    pub(crate) fn maintenance_interval(&self) -> Duration {
        match self.maintenance_interval_secs {
            0 => DEFAULT_MAINTENANCE_INTERVAL,
            secs => Duration::from_secs(secs),
        }
    }
}

pub(crate) fn mb_to_bytes(mb: u64) -> u64 {
    let mb = if mb == 0 {
        DEFAULT_FILE_SIZE_LIMIT_MB
    } else {
        mb
    };
    mb.saturating_mul(BYTES_PER_MB)
}

fn parse_level_setting(value: &str) -> Result<Level, LoggerError> {
    match value.trim().parse::<u8>() {
        Ok(code) => Level::try_from(code),
        Err(_) => value.parse(),
    }
}

/// The mutable, process-lifetime view of [`Options`] shared by the foreground emitters and the
/// maintenance task.
#[derive(Debug)]
pub(crate) struct Settings {
    level: AtomicU8,
    file_size_limit_bytes: AtomicU64,
    max_backups: AtomicUsize,
    console_disabled: AtomicBool,
    stats_enabled: AtomicBool,
}

impl Settings {
    pub(crate) fn new(options: &Options) -> Self {
        Self {
            level: AtomicU8::new(options.log_level.code()),
            file_size_limit_bytes: AtomicU64::new(options.file_size_limit_bytes()),
            max_backups: AtomicUsize::new(options.max_backups),
            console_disabled: AtomicBool::new(options.console_disabled),
            stats_enabled: AtomicBool::new(true),
        }
    }

    pub(crate) fn level(&self) -> Level {
        Level::from_code(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.level.store(level.code(), Ordering::Relaxed);
    }

    pub(crate) fn file_size_limit_bytes(&self) -> u64 {
        self.file_size_limit_bytes.load(Ordering::Relaxed)
    }

    pub(crate) fn set_file_size_limit_bytes(&self, bytes: u64) {
        self.file_size_limit_bytes.store(bytes, Ordering::Relaxed);
    }

    pub(crate) fn max_backups(&self) -> usize {
        self.max_backups.load(Ordering::Relaxed)
    }

    pub(crate) fn set_max_backups(&self, max_backups: usize) {
        self.max_backups.store(max_backups, Ordering::Relaxed);
    }

    pub(crate) fn console_disabled(&self) -> bool {
        self.console_disabled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_console_disabled(&self, disabled: bool) {
        self.console_disabled.store(disabled, Ordering::Relaxed);
    }

    pub(crate) fn stats_enabled(&self) -> bool {
        self.stats_enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_stats_enabled(&self, enabled: bool) {
        self.stats_enabled.store(enabled, Ordering::Relaxed);
    }
}

/// A complete logger configuration, as loaded from a JSON document.
///
/// ```
/// use rolling_logger::{Level, LogConfig};
///
/// let config = LogConfig::from_json(
///     r#"{ "file_path": "/tmp/app.log", "log_level": "warn", "max_backups": 3 }"#,
/// )
/// .unwrap();
/// assert_eq!(config.options.log_level, Level::Warn);
/// assert_eq!(config.options.file_size_limit_mb, 1024);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Path of the active log file.
    pub file_path: PathBuf,

    /// Remaining options; omitted fields take their defaults.
    #[serde(flatten)]
    pub options: Options,
}

impl LogConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::JsonSerialization`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, LoggerError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let options = Options::default();
        assert_eq!(options.log_level, Level::Info);
        assert_eq!(options.file_size_limit_bytes(), 1024 * 1024 * 1024);
        assert_eq!(options.max_backups, 31);
        assert!(!options.console_disabled);
        assert_eq!(options.maintenance_interval(), Duration::from_secs(30));
    }

    #[test]
    fn zero_size_and_interval_fall_back_to_defaults() {
        let options = Options {
            file_size_limit_mb: 0,
            maintenance_interval_secs: 0,
            max_backups: 0,
            ..Options::default()
        };
        assert_eq!(options.file_size_limit_bytes(), 1024 * BYTES_PER_MB);
        assert_eq!(options.maintenance_interval(), DEFAULT_MAINTENANCE_INTERVAL);
        assert_eq!(options.max_backups, 0);
    }

    #[test]
    fn settings_reflect_options_and_updates() {
        let settings = Settings::new(&Options {
            log_level: Level::Warn,
            file_size_limit_mb: 2,
            ..Options::default()
        });
        assert_eq!(settings.level(), Level::Warn);
        assert_eq!(settings.file_size_limit_bytes(), 2 * BYTES_PER_MB);

        settings.set_level(Level::Trace);
        settings.set_max_backups(0);
        settings.set_console_disabled(true);
        assert_eq!(settings.level(), Level::Trace);
        assert_eq!(settings.max_backups(), 0);
        assert!(settings.console_disabled());
    }

    #[test]
    fn level_settings_accept_names_and_codes() {
        assert_eq!(parse_level_setting("3").ok(), Some(Level::Warn));
        assert_eq!(parse_level_setting("debug").ok(), Some(Level::Debug));
        assert!(parse_level_setting("loud").is_err());
        assert!(parse_level_setting("9").is_err());
    }

    #[test]
    fn config_is_loaded_from_json_with_defaults() {
        let config = LogConfig::from_json(
            r#"{"file_path": "/var/log/test.log", "log_level": 1, "file_size_limit_mb": 50}"#,
        )
        .expect("config should parse");
        assert_eq!(config.file_path, PathBuf::from("/var/log/test.log"));
        assert_eq!(config.options.log_level, Level::Debug);
        assert_eq!(config.options.file_size_limit_mb, 50);
        assert_eq!(config.options.max_backups, DEFAULT_MAX_BACKUPS);

        assert!(matches!(
            LogConfig::from_json(r#"{"log_level": "info"}"#),
            Err(LoggerError::JsonSerialization(_))
        ));
    }
}
