use opskit::commands::{self, BackupCli};
use std::process;

/// Entry point of `backup <source_dir> <backup_dir> <max_backups>`.
fn main() {
    let cli: BackupCli = commands::parse_args();
    process::exit(commands::backup(cli));
}
