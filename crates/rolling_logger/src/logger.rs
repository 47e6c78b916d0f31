//! The output pipeline: level filtering, line assembly, console mirroring and file output.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    config::{mb_to_bytes, Settings},
    console::Console,
    format,
    location::{capture_call_stack, render_call_stack, routine_id, CALL_STACK_DEPTH},
    maintenance::{self, MaintenanceReport, MaintenanceTask},
    timing::{CallStats, CallTimer, Elapsed},
    writer::WriterCore,
    Level, LogConfig, LoggedError, LoggerError, Location, Options,
};

/// Frames between [`capture_call_stack`] and the code that called a public emitter:
/// `Logger::output` and the public method itself.
const EMITTER_STACK_SKIP: usize = 2;

/// State shared between the foreground emitters and the maintenance thread.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) settings: Settings,
    pub(crate) writer: WriterCore,
    pub(crate) timer: CallTimer,
    console: Console,
    pid: u32,
}

/// A leveled logger writing to the console and to a size-rotated log file.
///
/// A `Logger` owns its configuration, its file handle and its background maintenance thread.
/// Share it between threads with an [`Arc`]. Records are normally emitted through the
/// crate's macros ([`info!`](crate::info), [`errorf!`](crate::errorf), ...), which capture
/// the call site.
///
/// ```
/// use rolling_logger::{Level, Logger, Options};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("app.log");
/// let logger = Logger::open(
///     &path,
///     Options {
///         console_disabled: true,
///         ..Options::default()
///     },
/// )
/// .unwrap();
///
/// logger.set_level("warn").unwrap();
/// rolling_logger::info!(logger, "not written");
/// rolling_logger::warnf!(logger, "disk usage at {}%", 91);
/// logger.close().unwrap();
///
/// let contents = std::fs::read_to_string(&path).unwrap();
/// assert_eq!(contents.lines().count(), 1);
/// assert!(contents.contains("[WARN]"));
/// assert!(contents.ends_with("disk usage at 91%\n"));
/// ```
#[derive(Debug)]
pub struct Logger {
    shared: Arc<Shared>,
    maintenance: Mutex<Option<MaintenanceTask>>,
}

impl Logger {
    /// Opens (creating or appending to) the log file at `path` and starts the maintenance
    /// thread.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Configuration`] if `path` is empty, [`LoggerError::OpenFile`] if
    /// the file cannot be opened, and [`LoggerError::Io`] if the maintenance thread cannot be
    /// spawned.
    pub fn open(path: impl AsRef<Path>, options: Options) -> Result<Self, LoggerError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LoggerError::Configuration(
                "log file path must not be empty".to_string(),
            ));
        }

        let shared = Arc::new(Shared::new(WriterCore::open(path)?, &options));
        let task = MaintenanceTask::spawn(Arc::clone(&shared), options.maintenance_interval())?;

        Ok(Self {
            shared,
            maintenance: Mutex::new(Some(task)),
        })
    }

    /// Opens a logger from a complete [`LogConfig`].
    ///
    /// # Errors
    ///
    /// See [`Logger::open`].
    pub fn from_config(config: LogConfig) -> Result<Self, LoggerError> {
        Self::open(config.file_path, config.options)
    }

    /// A logger that only writes to the console. It never opens a file and runs no maintenance.
    pub fn without_file(options: Options) -> Self {
        Self {
            shared: Arc::new(Shared::new(WriterCore::closed(PathBuf::new()), &options)),
            maintenance: Mutex::new(None),
        }
    }

    /// Stops the maintenance thread, then flushes and releases the log file.
    ///
    /// Closing is idempotent. Records emitted afterwards still reach the console but are
    /// dropped on the file side.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Io`] if the final flush fails.
    pub fn close(&self) -> Result<(), LoggerError> {
        let task = self.maintenance.lock().take();
        if let Some(task) = task {
            task.stop();
        }
        self.shared.writer.close()
    }

    /// Path of the active log file; empty for [`Logger::without_file`] loggers.
    pub fn path(&self) -> &Path {
        self.shared.writer.path()
    }

    /// Current minimum level.
    pub fn level(&self) -> Level {
        self.shared.settings.level()
    }

    /// Sets the minimum level from a [`Level`], a level name (`"warn"`, `"warning"`, ...) or a
    /// numeric level code.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::UnknownLevel`] if the name or code does not denote a level; the
    /// current level is kept in that case.
    pub fn set_level<L>(&self, level: L) -> Result<(), LoggerError>
    where
        L: TryInto<Level>,
        LoggerError: From<L::Error>,
    {
        self.shared.settings.set_level(level.try_into()?);
        Ok(())
    }

    /// Sets the rotation threshold in megabytes; `0` selects the default.
    pub fn set_file_size_limit_mb(&self, mb: u64) {
        self.shared.settings.set_file_size_limit_bytes(mb_to_bytes(mb));
    }

    /// Sets the rotation threshold in bytes.
    pub fn set_file_size_limit_bytes(&self, bytes: u64) {
        self.shared.settings.set_file_size_limit_bytes(bytes);
    }

    /// Sets how many rotated backups are retained; `0` disables the retention sweep.
    pub fn set_max_backups(&self, max_backups: usize) {
        self.shared.settings.set_max_backups(max_backups);
    }

    /// Enables or disables mirroring of records to standard output.
    pub fn set_console_disabled(&self, disabled: bool) {
        self.shared.settings.set_console_disabled(disabled);
    }

    /// Enables or disables the call-timing tracker.
    pub fn set_stats_enabled(&self, enabled: bool) {
        self.shared.settings.set_stats_enabled(enabled);
    }

    /// Runs one rotation check and one retention sweep immediately, independently of the
    /// maintenance thread.
    pub fn run_maintenance(&self) -> MaintenanceReport {
        maintenance::tick(&self.shared)
    }

    /// Emits `message` at `level`.
    ///
    /// Records below the current minimum level produce no output at all; [`Level::Json`]
    /// records are never filtered. The call site is returned either way.
    pub fn emit(&self, level: Level, location: Location, message: &str) -> Location {
        self.output(level, location, message, EMITTER_STACK_SKIP);
        location
    }

    /// Emits `message` at `level` after cutting it to `limit` bytes.
    pub fn emit_truncated(
        &self,
        level: Level,
        location: Location,
        limit: usize,
        message: String,
    ) -> Location {
        let message = format::truncate(message, limit);
        self.output(level, location, &message, EMITTER_STACK_SKIP);
        location
    }

    /// Emits `message` at an error severity, counts it against the calling function in the
    /// call-timing tracker, and returns it as an error value for the caller to propagate.
    pub fn emit_error(&self, level: Level, location: Location, message: String) -> LoggedError {
        self.output(level, location, &message, EMITTER_STACK_SKIP);
        if self.shared.settings.stats_enabled() {
            self.shared.timer.record_error(location.function());
        }
        LoggedError::new(level, location, message)
    }

    /// Emits `message` at [`Level::Panic`] and then panics the calling thread with the same
    /// message.
    ///
    /// This is the logging counterpart of [`panic!`]; it is meant as a last resort.
    #[allow(clippy::panic)]
    pub fn emit_and_panic(&self, location: Location, message: String) -> ! {
        self.output(Level::Panic, location, &message, EMITTER_STACK_SKIP);
        panic!("{message}");
    }

    /// Starts a timing window for the calling function and logs `enter` at info level.
    pub fn enter(&self, location: Location, detail: &str) {
        let message = if detail.is_empty() {
            "enter".to_string()
        } else {
            format!("enter {detail}")
        };
        self.output(Level::Info, location, &message, EMITTER_STACK_SKIP);
        if self.shared.settings.stats_enabled() {
            self.shared.timer.enter(location.function());
        }
    }

    /// Closes the innermost timing window of the calling function and logs the elapsed time
    /// at info level.
    ///
    /// Returns `None`, and logs nothing, if [`Logger::enter`] was not called for this function
    /// on this thread.
    pub fn leave(&self, location: Location) -> Option<Elapsed> {
        if !self.shared.settings.stats_enabled() {
            return None;
        }
        let elapsed = self.shared.timer.leave(location.function())?;
        self.output(
            Level::Info,
            location,
            &format!("leave ({elapsed})"),
            EMITTER_STACK_SKIP,
        );
        Some(elapsed)
    }

    /// Starts a timing window that is closed when the returned guard is dropped.
    pub fn timed(&self, location: Location) -> CallGuard<'_> {
        self.enter(location, "");
        CallGuard {
            logger: self,
            location,
        }
    }

    /// Statistics recorded for `function`, if it has ever been entered.
    pub fn call_stats(&self, function: &str) -> Option<CallStats> {
        self.shared.timer.stats(function)
    }

    /// Summary of call counts, average durations and error counts for every tracked function,
    /// or only for `function` if given.
    pub fn report(&self, function: Option<&str>) -> String {
        self.shared.timer.report(function)
    }

    /// Formats and writes one record. `stack_skip` is the number of frames between the call
    /// stack capture and the original call site.
    fn output(&self, level: Level, location: Location, message: &str, stack_skip: usize) {
        let settings = &self.shared.settings;
        if level != Level::Json && level < settings.level() {
            return;
        }

        let routine = routine_id();
        let header = format!("{} {{{routine}}} {location}", level.tag());
        // Captured directly in this frame; a closure here would shift `stack_skip`.
        let call_stack = if level.has_call_stack() {
            Some(render_call_stack(&capture_call_stack(
                stack_skip,
                CALL_STACK_DEPTH,
            )))
        } else {
            None
        };

        if !settings.console_disabled() {
            let console = &self.shared.console;
            let console_header = format!(
                "{} PID:{} {header}",
                format::console_timestamp(format::now()),
                self.shared.pid
            );
            console.write_line(&console.render(
                level.color(),
                &console_header,
                message,
                call_stack.as_deref(),
            ));
        }

        let line = format!(
            "{header} {message}{}",
            call_stack.as_deref().unwrap_or_default()
        );
        // Failures are not reported through `tracing`: a subscriber forwarding events back into
        // this logger would recurse.
        let _ = self.shared.writer.write_line(&line);
    }
}

impl Shared {
    fn new(writer: WriterCore, options: &Options) -> Self {
        Self {
            settings: Settings::new(options),
            writer,
            timer: CallTimer::default(),
            console: Console::detect(),
            pid: std::process::id(),
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::debug!(%error, "Failed to close logger");
        }
    }
}

/// Closes a timing window opened by [`Logger::timed`] when dropped.
#[derive(Debug)]
#[must_use = "the timing window closes as soon as the guard is dropped"]
pub struct CallGuard<'a> {
    logger: &'a Logger,
    location: Location,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.logger.leave(self.location);
    }
}
