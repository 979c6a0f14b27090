//! Event sink injected into the backup and analysis operations.
//!
//! Operations never talk to a global logger directly. They receive a
//! [`Reporter`] and the caller decides where the records end up: the `log`
//! facade for the binaries, memory for tests.

use log::Level;
use std::sync::Mutex;

/// Receives the INFO/ERROR events emitted while an operation runs.
pub trait Reporter {
    fn record(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}

/// Forwards every record to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn record(&self, level: Level, message: &str) {
        log::log!(level, "{message}");
    }
}

/// Keeps every record in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn records(&self) -> Vec<(Level, String)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages recorded at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, level: Level, message: &str) {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push((level, message.to_string()));
    }
}
