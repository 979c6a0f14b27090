//! Retention of archives in the backup directory.

use crate::constants::{BACKUP_PREFIX, BACKUP_SUFFIX};
use crate::report::Reporter;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use std::{fs, io};

/// An archive found in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl BackupRecord {
    fn file_name(&self) -> &std::ffi::OsStr {
        self.path.file_name().unwrap_or_default()
    }
}

impl Ord for BackupRecord {
    /// Oldest first. Equal mtimes fall back to the file name, whose embedded
    /// timestamp sorts chronologically.
    fn cmp(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.file_name().cmp(other.file_name()))
    }
}

impl PartialOrd for BackupRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of deleting one archive.
#[derive(Debug)]
pub struct RemovalOutcome {
    pub path: PathBuf,
    pub result: io::Result<()>,
}

/// Everything a rotation pass did.
#[derive(Debug, Default)]
pub struct RotationSummary {
    pub outcomes: Vec<RemovalOutcome>,
    /// Archives still present, as far as this pass knows.
    pub retained: usize,
}

impl RotationSummary {
    pub fn removed(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.path.as_path())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RemovalOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

/// Returns true for names of the form `backup_*.tar.gz`.
pub fn is_backup_name(name: &str) -> bool {
    name.len() >= BACKUP_PREFIX.len() + BACKUP_SUFFIX.len()
        && name.starts_with(BACKUP_PREFIX)
        && name.ends_with(BACKUP_SUFFIX)
}

/// Lists the archives in `dir`, oldest first.
///
/// Only regular files are considered. Entries that vanish while listing are
/// skipped.
pub fn list_backups(dir: &Path) -> io::Result<Vec<BackupRecord>> {
    let mut backups = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_backup_name) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        backups.push(BackupRecord {
            path: entry.path(),
            modified: meta.modified()?,
        });
    }
    backups.sort();
    Ok(backups)
}

/// Deletes the oldest archives in `dir` until at most `max_backups` remain.
///
/// A directory that cannot be listed yields an empty summary.
pub fn rotate_backups(dir: &Path, max_backups: usize, reporter: &dyn Reporter) -> RotationSummary {
    match list_backups(dir) {
        Ok(backups) => remove_oldest(backups, max_backups, reporter),
        Err(e) => {
            reporter.error(&format!("Failed to list backups in {}: {e}", dir.display()));
            RotationSummary::default()
        }
    }
}

/// Deletes records from the front of `backups` (oldest first, as returned by
/// [`list_backups`]) until at most `max_backups` are left.
///
/// Each deletion is independent: a failure is recorded and the next-oldest
/// archive is tried.
pub fn remove_oldest(
    mut backups: Vec<BackupRecord>,
    max_backups: usize,
    reporter: &dyn Reporter,
) -> RotationSummary {
    let excess = backups.len().saturating_sub(max_backups);
    let mut summary = RotationSummary::default();
    for oldest in backups.drain(..excess) {
        let result = fs::remove_file(&oldest.path);
        match &result {
            Ok(()) => reporter.info(&format!(
                "Rotated out old backup: {}",
                oldest.path.display()
            )),
            Err(e) => reporter.error(&format!(
                "Failed to remove old backup {}: {e}",
                oldest.path.display()
            )),
        }
        summary.outcomes.push(RemovalOutcome {
            path: oldest.path,
            result,
        });
    }
    summary.retained = backups.len() + summary.failed().count();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use log::Level;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn create_backup_file(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(mtime).unwrap();
        path
    }

    #[test]
    fn test_is_backup_name() {
        assert!(is_backup_name("backup_20240101_000000.tar.gz"));
        assert!(is_backup_name("backup_x.tar.gz"));
        assert!(!is_backup_name("backup_.tar"));
        assert!(!is_backup_name("snapshot_20240101.tar.gz"));
        assert!(!is_backup_name("backup_20240101.zip"));
    }

    #[test]
    fn test_list_backups_oldest_first() {
        let dir = tempdir().unwrap();
        let newest = create_backup_file(dir.path(), "backup_3.tar.gz", 10);
        let oldest = create_backup_file(dir.path(), "backup_1.tar.gz", 300);
        let middle = create_backup_file(dir.path(), "backup_2.tar.gz", 100);
        create_backup_file(dir.path(), "notes.txt", 1000);
        fs::create_dir(dir.path().join("backup_dir.tar.gz")).unwrap();

        let paths: Vec<_> = list_backups(dir.path())
            .unwrap()
            .into_iter()
            .map(|b| b.path)
            .collect();
        assert_eq!(paths, vec![oldest, middle, newest]);
    }

    #[test]
    fn test_list_backups_ties_by_name() {
        let dir = tempdir().unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(60);
        for name in ["backup_b.tar.gz", "backup_c.tar.gz", "backup_a.tar.gz"] {
            File::create(dir.path().join(name))
                .unwrap()
                .set_modified(mtime)
                .unwrap();
        }

        let names: Vec<_> = list_backups(dir.path())
            .unwrap()
            .iter()
            .map(|b| b.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["backup_a.tar.gz", "backup_b.tar.gz", "backup_c.tar.gz"]
        );
    }

    #[test]
    fn test_rotate_keeps_newest_two() {
        let reporter = MemoryReporter::new();
        let dir = tempdir().unwrap();
        let oldest = create_backup_file(dir.path(), "backup_1.tar.gz", 300);
        let middle = create_backup_file(dir.path(), "backup_2.tar.gz", 200);
        let newest = create_backup_file(dir.path(), "backup_3.tar.gz", 100);

        let summary = rotate_backups(dir.path(), 2, &reporter);

        assert_eq!(summary.removed().collect::<Vec<_>>(), vec![oldest.as_path()]);
        assert_eq!(summary.failed().count(), 0);
        assert_eq!(summary.retained, 2);
        assert!(!oldest.exists());
        assert!(middle.exists());
        assert!(newest.exists());
        assert_eq!(
            reporter.messages(Level::Info),
            vec![format!("Rotated out old backup: {}", oldest.display())]
        );
    }

    #[test]
    fn test_rotate_keeps_n_most_recent() {
        let reporter = MemoryReporter::new();
        let dir = tempdir().unwrap();
        let mut paths = vec![];
        for i in 0..7u64 {
            let name = format!("backup_{i}.tar.gz");
            // Higher index is newer.
            paths.push(create_backup_file(dir.path(), &name, 1000 - i * 10));
        }
        create_backup_file(dir.path(), "unrelated.tar.gz", 5000);

        for max in [5, 3, 1] {
            let summary = rotate_backups(dir.path(), max, &reporter);
            assert_eq!(summary.retained, max);
            let left: Vec<_> = list_backups(dir.path())
                .unwrap()
                .into_iter()
                .map(|b| b.path)
                .collect();
            assert_eq!(left, paths[paths.len() - max..].to_vec());
        }
        assert!(dir.path().join("unrelated.tar.gz").exists());
    }

    #[test]
    fn test_remove_oldest_continues_after_failure() {
        let reporter = MemoryReporter::new();
        let dir = tempdir().unwrap();
        create_backup_file(dir.path(), "backup_1.tar.gz", 400);
        create_backup_file(dir.path(), "backup_2.tar.gz", 300);
        let next = create_backup_file(dir.path(), "backup_3.tar.gz", 200);
        let newest = create_backup_file(dir.path(), "backup_4.tar.gz", 100);
        let backups = list_backups(dir.path()).unwrap();

        // The oldest archive vanishes between listing and removal.
        let vanished = backups[0].path.clone();
        fs::remove_file(&vanished).unwrap();

        let summary = remove_oldest(backups, 1, &reporter);

        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(summary.failed().count(), 1);
        assert_eq!(summary.failed().next().unwrap().path, vanished);
        assert_eq!(summary.removed().count(), 2);
        assert!(summary.removed().any(|p| p == next));
        assert_eq!(summary.retained, 2);
        assert!(!next.exists());
        assert!(newest.exists());

        let errors = reporter.messages(Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with(&format!(
            "Failed to remove old backup {}:",
            vanished.display()
        )));
        assert_eq!(reporter.messages(Level::Info).len(), 2);
    }

    #[test]
    fn test_rotate_under_limit_is_noop() {
        let reporter = MemoryReporter::new();
        let dir = tempdir().unwrap();
        create_backup_file(dir.path(), "backup_1.tar.gz", 10);

        let summary = rotate_backups(dir.path(), 3, &reporter);
        assert!(summary.outcomes.is_empty());
        assert_eq!(summary.retained, 1);
        assert!(reporter.records().is_empty());
    }

    #[test]
    fn test_rotate_missing_dir() {
        let reporter = MemoryReporter::new();
        let dir = tempdir().unwrap();

        let summary = rotate_backups(&dir.path().join("missing"), 1, &reporter);
        assert!(summary.outcomes.is_empty());
        assert_eq!(reporter.messages(Level::Error).len(), 1);
    }
}
