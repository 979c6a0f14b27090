//! `env_logger` set-up for the two binaries.

use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where the audit trail ended up.
#[derive(Debug)]
pub enum LogSink {
    File(PathBuf),
    /// The log file could not be opened; records go to standard error.
    Stderr(io::Error),
}

/// Installs the process-wide logger of the backup tool.
///
/// Records are appended to `path` as `2024-01-31 13:05:09,042 - INFO - message`.
/// The default level is INFO and `RUST_LOG` overrides it. When `path`
/// cannot be opened the same format is written to standard error instead.
pub fn init_audit_log(path: &Path) -> LogSink {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        });

    let sink = match open_log_file(path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
            LogSink::File(path.to_path_buf())
        }
        Err(e) => {
            builder.target(Target::Stderr);
            LogSink::Stderr(e)
        }
    };
    // A logger may already be installed when embedded in another program.
    let _ = builder.try_init();

    if let LogSink::Stderr(e) = &sink {
        log::warn!(
            "Cannot open log file {}: {e}; logging to standard error",
            path.display()
        );
    }
    sink
}

/// Installs a standard-error logger for the log analyzer.
///
/// Only warnings and errors are shown unless `RUST_LOG` asks for more, so
/// the report on standard output stays clean.
pub fn init_console_log() {
    let _ = Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .target(Target::Stderr)
        .try_init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
