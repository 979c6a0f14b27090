use crate::error::BackupError;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Checks that `path` exists and is a directory.
///
/// # Errors
/// `SourceMissing` when the path cannot be found, `SourceNotDirectory` when
/// it exists but is something else.
pub fn check_source_dir(path: &Path) -> Result<(), BackupError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BackupError::SourceNotDirectory(path.to_path_buf())),
        Err(_) => Err(BackupError::SourceMissing(path.to_path_buf())),
    }
}

/// Name under which `src` is stored inside an archive.
///
/// Relative spellings such as `.` or `dir/..` carry no usable file name,
/// so the path is resolved first.
pub fn archive_root_name(src: &Path) -> io::Result<PathBuf> {
    if let Some(name) = src.file_name() {
        return Ok(PathBuf::from(name));
    }
    let resolved = fs::canonicalize(src)?;
    match resolved.file_name() {
        Some(name) => Ok(PathBuf::from(name)),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Cannot derive an archive name from '{}'", src.display()),
        )),
    }
}
