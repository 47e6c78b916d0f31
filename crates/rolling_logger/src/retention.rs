//! Retention sweep: keeps only the most recent rotated backups of a log file.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Lists the backups of `path`: regular files in the same directory whose name contains
/// `<file name>.`, newest first.
///
/// Ties in modification time are broken by name, so that the later timestamp suffix wins.
pub(crate) fn list_backups(path: &Path) -> Vec<PathBuf> {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return Vec::new();
    };
    let pattern = format!("{file_name}.");
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut backups: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .ok()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let name = entry.file_name();
            if !name.to_str()?.contains(&pattern) {
                return None;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, entry.path()))
        })
        .collect();

    backups.sort_by(|(time_a, path_a), (time_b, path_b)| {
        time_b.cmp(time_a).then_with(|| path_b.cmp(path_a))
    });
    backups.into_iter().map(|(_, path)| path).collect()
}

/// Deletes every backup of `path` beyond the `max_backups` most recently modified ones.
///
/// A `max_backups` of `0` disables the sweep. Deletion is best-effort: failures are reported
/// at debug level and the sweep continues with the next file. Returns the number of files
/// removed.
pub(crate) fn sweep(path: &Path, max_backups: usize) -> usize {
    if max_backups == 0 {
        return 0;
    }

    let mut removed = 0;
    for stale in list_backups(path).iter().skip(max_backups) {
        match fs::remove_file(stale) {
            Ok(()) => removed += 1,
            Err(error) => {
                tracing::debug!(path = %stale.display(), %error, "Failed to remove log backup");
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn touch(path: &Path, age: Duration) {
        let file = fs::File::create(path).expect("failed to create file");
        file.set_modified(SystemTime::now() - age)
            .expect("failed to set modification time");
    }

    #[test]
    fn keeps_the_newest_backups_and_the_active_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let active = dir.path().join("app.log");
        touch(&active, Duration::from_secs(0));
        for hours in 1..=5_u64 {
            touch(
                &dir.path().join(format!("app.log.2024010100000{hours}")),
                Duration::from_secs(hours * 3600),
            );
        }
        touch(&dir.path().join("other.log.20240101000000"), Duration::from_secs(9 * 3600));
        fs::create_dir(dir.path().join("app.log.archive")).expect("failed to create dir");

        assert_eq!(sweep(&active, 2), 3);

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .expect("failed to list dir")
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "app.log",
                "app.log.20240101000001",
                "app.log.20240101000002",
                "app.log.archive",
                "other.log.20240101000000",
            ]
        );
    }

    #[test]
    fn zero_disables_the_sweep() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let active = dir.path().join("app.log");
        for index in 0..4_u64 {
            touch(
                &dir.path().join(format!("app.log.{index}")),
                Duration::from_secs(index),
            );
        }
        assert_eq!(sweep(&active, 0), 0);
        assert_eq!(list_backups(&active).len(), 4);
    }

    #[test]
    fn backups_are_listed_newest_first() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let active = dir.path().join("app.log");
        touch(&dir.path().join("app.log.old"), Duration::from_secs(600));
        touch(&dir.path().join("app.log.new"), Duration::from_secs(60));

        let names: Vec<String> = list_backups(&active)
            .iter()
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["app.log.new", "app.log.old"]);
    }

    #[test]
    fn missing_directory_yields_no_backups() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let active = dir.path().join("gone").join("app.log");
        assert!(list_backups(&active).is_empty());
        assert_eq!(sweep(&active, 1), 0);
    }
}
