//! Directory snapshots: one run writes one `backup_<timestamp>.tar.gz`.

use crate::constants::{BACKUP_PREFIX, BACKUP_SUFFIX, TIMESTAMP_FORMAT};
use crate::error::BackupError;
use crate::path_util;
use crate::report::Reporter;
use crate::rotation::{self, RotationSummary};
use anyhow::Context;
use chrono::Local;
use flate2::{Compression, write::GzEncoder};
use log::Level;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One invocation of the backup tool.
#[derive(Debug, Clone)]
pub struct BackupJob {
    /// Directory to snapshot.
    pub source: PathBuf,
    /// Directory holding the archives.
    pub backup_dir: PathBuf,
    /// Number of archives kept after rotation. Always at least 1.
    pub max_backups: usize,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct BackupOutcome {
    pub archive: PathBuf,
    pub rotation: RotationSummary,
}

/// Parses the retention count given on the command line.
///
/// # Errors
/// Returns `InvalidMaxBackups` for anything that is not an integer >= 1.
pub fn parse_max_backups(raw: &str) -> Result<usize, BackupError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| BackupError::InvalidMaxBackups(format!("'{raw}' is not an integer")))?;
    if value < 1 {
        return Err(BackupError::InvalidMaxBackups(
            "max_backups must be positive".to_string(),
        ));
    }
    usize::try_from(value).map_err(|_| BackupError::InvalidMaxBackups(format!("'{raw}' is too large")))
}

/// Current local time in the archive timestamp format, e.g. `20240131_130509`.
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Archive file name for `timestamp`.
pub fn backup_file_name(timestamp: &str) -> String {
    format!("{BACKUP_PREFIX}{timestamp}{BACKUP_SUFFIX}")
}

/// Creates `dir` and its missing ancestors. Succeeds when it already exists.
///
/// # Errors
/// `CreateBackupDir` when the directory cannot be created or the path is
/// taken by something that is not a directory.
pub fn ensure_backup_dir(dir: &Path, reporter: &dyn Reporter) -> Result<(), BackupError> {
    match fs::create_dir_all(dir) {
        Ok(()) => {
            reporter.info(&format!("Backup directory {} ensured.", dir.display()));
            Ok(())
        }
        Err(e) => {
            let err = BackupError::CreateBackupDir(e);
            reporter.error(&err.to_string());
            Err(err)
        }
    }
}

/// Writes `source` into `<backup_dir>/backup_<timestamp>.tar.gz`.
///
/// The archive holds a single top-level directory named after the base
/// name of `source`. Returns `None` when anything goes wrong; the failure is
/// recorded and no partial archive is left behind.
pub fn create_backup(
    source: &Path,
    backup_dir: &Path,
    timestamp: &str,
    reporter: &dyn Reporter,
) -> Option<PathBuf> {
    let backup_file = backup_dir.join(backup_file_name(timestamp));
    match write_archive(source, &backup_file, reporter) {
        Ok(()) => {
            reporter.info(&format!("Backup created: {}", backup_file.display()));
            Some(backup_file)
        }
        Err(e) => {
            reporter.error(&format!("Backup creation failed: {e:#}"));
            None
        }
    }
}

/// Validates the source, ensures the backup directory, writes the archive
/// and rotates old archives.
///
/// Rotation problems are recorded but never fail the run.
pub fn run_backup(
    job: &BackupJob,
    timestamp: &str,
    reporter: &dyn Reporter,
) -> Result<BackupOutcome, BackupError> {
    if let Err(e) = path_util::check_source_dir(&job.source) {
        reporter.error(&e.to_string());
        return Err(e);
    }
    ensure_backup_dir(&job.backup_dir, reporter)?;

    let archive = create_backup(&job.source, &job.backup_dir, timestamp, reporter)
        .ok_or(BackupError::Archive)?;
    let rotation = rotation::rotate_backups(&job.backup_dir, job.max_backups, reporter);

    reporter.info("Backup process completed successfully");
    Ok(BackupOutcome { archive, rotation })
}

fn write_archive(src: &Path, dest: &Path, reporter: &dyn Reporter) -> anyhow::Result<()> {
    let root = path_util::archive_root_name(src)
        .with_context(|| format!("Invalid source directory '{}'", src.display()))?;
    // Two runs in the same second must not clobber each other.
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .with_context(|| format!("Cannot create archive '{}'", dest.display()))?;

    let result = append_tree(file, src, &root, dest, reporter);
    if result.is_err() {
        discard_partial(dest, reporter);
    }
    result
}

/// Deletes an archive whose writing failed, so rotation never counts it.
fn discard_partial(dest: &Path, reporter: &dyn Reporter) {
    if let Err(e) = fs::remove_file(dest) {
        reporter.error(&format!(
            "Failed to remove incomplete archive {}: {e}",
            dest.display()
        ));
    }
}

fn append_tree(
    file: File,
    src: &Path,
    root: &Path,
    dest: &Path,
    reporter: &dyn Reporter,
) -> anyhow::Result<()> {
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut tar_builder = tar::Builder::new(encoder);
    tar_builder.follow_symlinks(false);

    let dest_canonical = fs::canonicalize(dest)?;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name() == dest_canonical.file_name().unwrap_or_default()
            && fs::canonicalize(path).is_ok_and(|p| p == dest_canonical)
        {
            continue;
        }
        // tar has no entry type for sockets.
        if is_socket(&entry.file_type()) {
            reporter.record(
                Level::Warn,
                &format!("Skipping socket {}", path.display()),
            );
            continue;
        }

        let rel = path.strip_prefix(src)?;
        let name = if rel.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(rel)
        };
        if entry.file_type().is_dir() {
            tar_builder.append_dir(&name, path)?;
        } else {
            tar_builder
                .append_path_with_name(path, &name)
                .with_context(|| format!("Failed to add '{}'", path.display()))?;
        }
    }

    let encoder = tar_builder.into_inner()?;
    encoder.finish()?.flush()?;
    Ok(())
}

#[cfg(unix)]
fn is_socket(file_type: &fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_socket()
}

#[cfg(not(unix))]
fn is_socket(_file_type: &fs::FileType) -> bool {
    false
}
