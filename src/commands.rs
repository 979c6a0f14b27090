//! Command-line interfaces of `backup` and `log_analyzer`.
//!
//! Both binaries are thin: they parse arguments, install a logger and hand
//! over to the library. Every path ends in an exit status from
//! [`sysexits`](crate::sysexits).

use crate::analyzer;
use crate::backup::{self, BackupJob};
use crate::constants::{DEFAULT_LOG_FILE, DEFAULT_TOP, LOG_FILE_ENV};
use crate::logging::{self, LogSink};
use crate::report::{LogReporter, Reporter};
use crate::sysexits::{EX_FAILURE, EX_OK};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process;

/// Snapshot a directory into a timestamped tar.gz archive and keep only the
/// newest archives.
#[derive(Parser, Debug)]
#[command(name = "backup", version, about, long_about = None)]
pub struct BackupCli {
    /// Directory to back up.
    pub source_dir: PathBuf,
    /// Directory receiving the archives. Created when missing.
    pub backup_dir: PathBuf,
    /// Number of archives to keep (at least 1).
    #[arg(allow_negative_numbers = true)]
    pub max_backups: String,
    /// Audit log file.
    #[arg(long, env = LOG_FILE_ENV, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

/// Report the most frequent error sources and request sources of a log file.
#[derive(Parser, Debug)]
#[command(name = "log_analyzer", version, about, long_about = None)]
pub struct AnalyzerCli {
    /// Log file to analyze.
    pub logfile: PathBuf,
    /// Rows printed per table.
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP, value_parser = parse_top)]
    pub top: usize,
}

/// Parses arguments like `T::parse`, but exits with [`EX_FAILURE`] on
/// usage errors.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EX_FAILURE } else { EX_OK };
            let _ = e.print();
            process::exit(code);
        }
    }
}

/// Runs one backup and returns the process exit status.
pub fn backup(cli: BackupCli) -> i32 {
    let sink = logging::init_audit_log(&cli.log_file);
    // Failures are echoed to the terminal unless the log already goes there.
    let echo = matches!(sink, LogSink::File(_));
    let reporter = LogReporter;

    let max_backups = match backup::parse_max_backups(&cli.max_backups) {
        Ok(max_backups) => max_backups,
        Err(e) => {
            reporter.error(&e.to_string());
            if echo {
                eprintln!("{e}");
            }
            return EX_FAILURE;
        }
    };

    let job = BackupJob {
        source: cli.source_dir,
        backup_dir: cli.backup_dir,
        max_backups,
    };
    match backup::run_backup(&job, &backup::timestamp_now(), &reporter) {
        Ok(outcome) => {
            let failed = outcome.rotation.failed().count();
            if failed > 0 && echo {
                eprintln!("Warning: {failed} old backup(s) could not be removed");
            }
            println!("Backup completed: {}", outcome.archive.display());
            EX_OK
        }
        Err(e) => {
            if echo {
                eprintln!("{e}");
            }
            EX_FAILURE
        }
    }
}

/// Analyzes one log file, prints the report and returns the exit status.
pub fn analyze(cli: AnalyzerCli) -> i32 {
    logging::init_console_log();

    match analyzer::analyze_file(&cli.logfile, &LogReporter) {
        Ok(analysis) => {
            print!("{}", analysis.render(Local::now(), cli.top));
            EX_OK
        }
        Err(e) => {
            eprintln!("Error: {e}");
            EX_FAILURE
        }
    }
}

fn parse_top(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
