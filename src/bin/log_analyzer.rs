use opskit::commands::{self, AnalyzerCli};
use std::process;

/// Entry point of `log_analyzer <path_to_logfile>`.
fn main() {
    let cli: AnalyzerCli = commands::parse_args();
    process::exit(commands::analyze(cli));
}
