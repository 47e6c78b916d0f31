//! The periodic background task performing rotation and the retention sweep.

use std::{
    path::PathBuf,
    sync::{
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{logger::Shared, retention, rotation, LoggerError};

/// Outcome of one maintenance tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Where the active file was moved to, if it was rotated.
    pub rotated_to: Option<PathBuf>,

    /// Number of backups deleted by the retention sweep.
    pub removed_backups: usize,
}

/// Runs one rotation check followed by one retention sweep.
///
/// Failures never propagate: they are reported as `tracing` events (after the writer lock has
/// been released) and retried on the next tick.
pub(crate) fn tick(shared: &Shared) -> MaintenanceReport {
    let limit = shared.settings.file_size_limit_bytes();
    let rotated_to = match rotation::rotate_if_needed(&shared.writer, limit) {
        Ok(rotated_to) => rotated_to,
        Err(error) => {
            tracing::warn!(
                path = %shared.writer.path().display(),
                %error,
                "Log file rotation failed"
            );
            None
        }
    };

    let removed_backups = retention::sweep(shared.writer.path(), shared.settings.max_backups());

    MaintenanceReport {
        rotated_to,
        removed_backups,
    }
}

/// Handle to the background maintenance thread.
///
/// The thread sleeps for the configured interval between ticks and exits as soon as
/// [`MaintenanceTask::stop`] is called or the handle is dropped. A tick that has already started
/// always runs to completion.
#[derive(Debug)]
pub(crate) struct MaintenanceTask {
    shutdown: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl MaintenanceTask {
    pub(crate) fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self, LoggerError> {
        let (shutdown, shutdown_receiver) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("rolling-logger-maintenance".to_string())
            .spawn(move || loop {
                match shutdown_receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        tick(&shared);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self { shutdown, handle })
    }

    /// Signals the thread to exit and waits for it.
    pub(crate) fn stop(self) {
        let _ = self.shutdown.send(());
        if self.handle.join().is_err() {
            tracing::warn!("Log maintenance thread panicked");
        }
    }
}
