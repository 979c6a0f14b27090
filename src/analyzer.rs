//! Single-pass frequency analysis of a text log.
//!
//! Every line counts as one request from its first whitespace-delimited
//! token. Lines mentioning `ERROR`, `FAIL` or `CRITICAL` also count as an
//! error for that token.

use crate::constants::ERROR_PATTERN;
use crate::error::AnalyzeError;
use crate::report::Reporter;
use chrono::{DateTime, Local};
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// What one log line contributes to the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord<'a> {
    /// Leading token, usually the client address.
    pub source: &'a str,
    pub is_error: bool,
}

impl<'a> LineRecord<'a> {
    /// Returns `None` for lines without any token.
    pub fn parse(line: &'a str, error_re: &Regex) -> Option<Self> {
        let source = line.split_whitespace().next()?;
        Some(Self {
            source,
            is_error: error_re.is_match(line),
        })
    }
}

/// Occurrence counts keyed by token, remembering first-seen order.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` highest counts, descending. Equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> = self
            .entries
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        // Stable sort keeps insertion order among ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Both tables built from one log file.
#[derive(Debug, Clone)]
pub struct LogAnalysis {
    pub errors: FrequencyTable,
    pub requests: FrequencyTable,
    /// Lines read, including skipped ones.
    pub lines: usize,
    /// Blank lines that had no token to count.
    pub skipped: usize,
    error_re: Regex,
}

impl LogAnalysis {
    /// Empty tables with the error pattern compiled.
    ///
    /// # Errors
    /// Fails only if [`ERROR_PATTERN`] does not compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            errors: FrequencyTable::new(),
            requests: FrequencyTable::new(),
            lines: 0,
            skipped: 0,
            error_re: Regex::new(ERROR_PATTERN)?,
        })
    }

    pub fn add_line(&mut self, line: &str) {
        self.lines += 1;
        let Some(record) = LineRecord::parse(line, &self.error_re) else {
            self.skipped += 1;
            return;
        };
        if record.is_error {
            self.errors.increment(record.source);
        }
        self.requests.increment(record.source);
    }

    /// Formats the report printed by `log_analyzer`.
    pub fn render(&self, generated_at: DateTime<Local>, top: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Log Analysis Report - {}",
            generated_at.format("%Y-%m-%d %H:%M:%S%.6f")
        );
        let _ = writeln!(out, "\nTop {top} Errors:");
        for (source, count) in self.errors.top(top) {
            let _ = writeln!(out, "{source}: {count} occurrences");
        }
        let _ = writeln!(out, "\nTop {top} IPs by Request Count:");
        for (source, count) in self.requests.top(top) {
            let _ = writeln!(out, "{source}: {count} requests");
        }
        out
    }
}

/// Consumes `reader` line by line.
///
/// # Errors
/// Any read failure, including a line that is not valid UTF-8.
pub fn analyze_reader<R: BufRead>(reader: R) -> Result<LogAnalysis, AnalyzeError> {
    let mut analysis = LogAnalysis::new()?;
    for line in reader.lines() {
        analysis.add_line(&line?);
    }
    Ok(analysis)
}

/// Opens `path` and analyzes it without loading it whole.
///
/// # Errors
/// `NotFound` when the file does not exist, `Io` for any other failure.
pub fn analyze_file(path: &Path, reporter: &dyn Reporter) -> Result<LogAnalysis, AnalyzeError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AnalyzeError::NotFound(path.to_path_buf()),
        _ => AnalyzeError::Io(e),
    })?;
    let analysis = analyze_reader(BufReader::new(file))?;
    reporter.info(&format!(
        "Analyzed {} lines of {} ({} blank lines skipped)",
        analysis.lines,
        path.display(),
        analysis.skipped
    ));
    Ok(analysis)
}
