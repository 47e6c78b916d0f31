//! Size-based rotation of the active log file.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use time::OffsetDateTime;

use crate::{format, writer::WriterCore, LoggerError};

/// Returns `<path>.<YYYYMMDDHHMMSS>` for the given instant.
pub(crate) fn backup_path(path: &Path, at: OffsetDateTime) -> Result<PathBuf, LoggerError> {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(format::backup_suffix(at)?);
    Ok(PathBuf::from(name))
}

/// Rotates the active file if its size strictly exceeds `limit_bytes`.
///
/// A writer left detached by an earlier failed rotation is reopened first. Returns the path
/// the old content was moved to, or `None` if no rotation was needed or the writer is closed. Two rotations within the same second target the same backup name; the
/// later one replaces the earlier backup.
///
/// # Errors
///
/// Fails if the active file cannot be inspected or replaced.
pub(crate) fn rotate_if_needed(
    writer: &WriterCore,
    limit_bytes: u64,
) -> Result<Option<PathBuf>, LoggerError> {
    writer.reattach()?;
    if !writer.is_open() {
        return Ok(None);
    }

    let size = std::fs::metadata(writer.path())?.len();
    if size <= limit_bytes {
        return Ok(None);
    }

    let backup = backup_path(writer.path(), format::now())?;
    if writer.rotate_to(&backup)? {
        Ok(Some(backup))
    } else {
        Ok(None)
    }
}
