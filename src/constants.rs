/// Prefix of every archive written by the backup tool.
pub const BACKUP_PREFIX: &str = "backup_";
/// Extension of every archive written by the backup tool.
pub const BACKUP_SUFFIX: &str = ".tar.gz";
/// `chrono` format of the timestamp embedded in archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Audit log used by the backup tool unless overridden.
pub const DEFAULT_LOG_FILE: &str = "/var/log/backup_script.log";
/// Environment variable that overrides [`DEFAULT_LOG_FILE`].
pub const LOG_FILE_ENV: &str = "BACKUP_LOG_FILE";
/// Pattern that marks a log line as an error.
pub const ERROR_PATTERN: &str = "ERROR|FAIL|CRITICAL";
/// Number of rows printed per report table.
pub const DEFAULT_TOP: usize = 5;
