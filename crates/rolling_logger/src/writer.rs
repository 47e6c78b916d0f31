//! The single point of file I/O: an optional open log file and the formatter bound to it,
//! serialized behind one lock that is shared with rotation.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::{format, LoggerError};

/// Prefixes every line with a microsecond timestamp and writes it to the bound file.
#[derive(Debug)]
struct LineFormatter {
    file: File,
}

impl LineFormatter {
    fn new(file: File) -> Self {
        Self { file }
    }

    /// Writes one line.
    ///
    /// The line is assembled in memory first and written with a single `write_all` call, so
    /// concurrent writers never interleave within a line.
    fn write_line(&mut self, text: &str) -> std::io::Result<()> {
        let timestamp = format::file_timestamp(format::now());
        let mut buffer = Vec::with_capacity(timestamp.len() + text.len() + 2);
        buffer.extend_from_slice(timestamp.as_bytes());
        buffer.push(b' ');
        buffer.extend_from_slice(text.as_bytes());
        buffer.push(b'\n');
        self.file.write_all(&buffer)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

/// State of the active log file.
#[derive(Debug)]
enum Slot {
    /// Lines are written to this file.
    Open(LineFormatter),

    /// A rotation moved the file away but could not create a fresh one; the next maintenance
    /// tick retries.
    Detached,

    /// Never opened, or released by [`WriterCore::close`].
    Closed,
}

/// Owns the active log file.
///
/// The file handle and its formatter live in the same [`Slot`], and are only touched while
/// holding the lock.
#[derive(Debug)]
pub(crate) struct WriterCore {
    path: PathBuf,
    slot: Mutex<Slot>,
}

impl WriterCore {
    /// Creates or appends to the file at `path`.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, LoggerError> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            slot: Mutex::new(Slot::Open(LineFormatter::new(file))),
        })
    }

    /// A writer that was never opened; every write is dropped.
    pub(crate) fn closed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(Slot::Closed),
        }
    }

    #[cfg(test)]
    pub(crate) fn detached(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(Slot::Detached),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Open(_))
    }

    /// Appends one line. Silently does nothing if the file is not open.
    pub(crate) fn write_line(&self, text: &str) -> std::io::Result<()> {
        match &mut *self.slot.lock() {
            Slot::Open(formatter) => formatter.write_line(text),
            Slot::Detached | Slot::Closed => Ok(()),
        }
    }

    /// Flushes and releases the file handle. Closing an already closed writer succeeds, and a
    /// closed writer is never reopened.
    pub(crate) fn close(&self) -> Result<(), LoggerError> {
        let previous = std::mem::replace(&mut *self.slot.lock(), Slot::Closed);
        if let Slot::Open(mut formatter) = previous {
            formatter.flush()?;
        }
        Ok(())
    }

    /// Recreates the file after a rotation that could not reopen it.
    ///
    /// Returns `true` if the writer was detached and is open again.
    pub(crate) fn reattach(&self) -> Result<bool, LoggerError> {
        let mut slot = self.slot.lock();
        if !matches!(*slot, Slot::Detached) {
            return Ok(false);
        }
        *slot = Slot::Open(LineFormatter::new(open_append(&self.path)?));
        Ok(true)
    }

    /// Moves the active file to `backup` and starts a fresh file at the original path.
    ///
    /// The whole sequence runs under the writer lock, so no line is split between the two
    /// files. If the rename fails the original file is reopened for appending and the rename
    /// error is returned. If the fresh file cannot be created the writer is left detached until
    /// [`WriterCore::reattach`] succeeds. Does nothing unless the writer is open.
    pub(crate) fn rotate_to(&self, backup: &Path) -> Result<bool, LoggerError> {
        let mut slot = self.slot.lock();
        let mut formatter = match std::mem::replace(&mut *slot, Slot::Detached) {
            Slot::Open(formatter) => formatter,
            other => {
                *slot = other;
                return Ok(false);
            }
        };
        // A failed flush must not prevent rotation; the rename below still preserves whatever
        // reached the file.
        let _ = formatter.flush();
        drop(formatter);

        let renamed = std::fs::rename(&self.path, backup);
        *slot = Slot::Open(LineFormatter::new(open_append(&self.path)?));
        drop(slot);

        renamed?;
        Ok(true)
    }
}

fn open_append(path: &Path) -> Result<File, LoggerError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}
