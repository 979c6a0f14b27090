//! opskit: two small operational tools sharing one library.
//!
//! * `backup` snapshots a directory into `backup_<timestamp>.tar.gz` and
//!   rotates old archives ([`backup`], [`rotation`]).
//! * `log_analyzer` reports the most frequent error sources and request
//!   sources of a text log ([`analyzer`]).

pub mod analyzer;
pub mod backup;
pub mod commands;
pub mod constants;
pub mod error;
pub mod logging;
pub mod path_util;
pub mod report;
pub mod rotation;
pub mod sysexits;
