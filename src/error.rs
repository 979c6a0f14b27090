use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a backup run.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid max_backups value: {0}")]
    InvalidMaxBackups(String),
    #[error("Source directory {} does not exist", .0.display())]
    SourceMissing(PathBuf),
    #[error("Source path {} is not a directory", .0.display())]
    SourceNotDirectory(PathBuf),
    #[error("Failed to create backup directory: {0}")]
    CreateBackupDir(#[source] io::Error),
    #[error("Backup creation failed")]
    Archive,
}

/// Failures that prevent a log report from being produced.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("File {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("Invalid error pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
