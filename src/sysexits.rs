//! Exit status codes shared by the `backup` and `log_analyzer` binaries.
//!
//! Shell scripts driving these tools only distinguish success from failure,
//! so every failure maps to the same status.

/// value: 0 <br>
/// The run completed.
pub const EX_OK: i32 = 0;

/// value: 1 <br>
/// Bad arguments, a missing source, an unwritable backup directory, a failed
/// archive or an unreadable log file.
pub const EX_FAILURE: i32 = 1;
