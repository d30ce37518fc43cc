//! Sampler turning raw `ps aux` output into normalized process records.
//!
//! Parsing is deliberately tolerant: a row that does not match the expected
//! column layout is skipped, the remaining rows survive in their original
//! order. Only a failure to obtain the listing at all is an error.

use crate::collector::traits::ProcessSource;
use std::io;
use tracing::debug;

/// Commands longer than this are shortened for display.
const COMMAND_DISPLAY_MAX: usize = 60;
/// Characters kept from the start of an over-long command.
const COMMAND_PREFIX_LEN: usize = 31;
/// Characters kept from the end of an over-long command.
const COMMAND_SUFFIX_LEN: usize = 30;
/// Column index where the command field begins in `ps aux` output.
const COMMAND_COLUMN: usize = 10;

/// Error type for sampling failures.
#[derive(Debug)]
pub enum CollectError {
    /// The process listing could not be invoked or read.
    Io(io::Error),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "process listing failed: {}", e),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// One row of the process table, normalized for exposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub owner_user: String,
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    /// Command line rejoined with single spaces and bounded for display.
    pub command_display: String,
}

/// Collects process records from a [`ProcessSource`].
pub struct ProcessSampler<S: ProcessSource> {
    source: S,
}

impl<S: ProcessSource> ProcessSampler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Samples the current process table.
    ///
    /// Malformed rows are skipped individually; an empty table is a valid
    /// empty sample. Fails only when the listing itself cannot be obtained.
    pub fn sample(&self) -> Result<Vec<ProcessRecord>, CollectError> {
        let listing = self.source.list_processes()?;
        let mut records = Vec::new();

        // First line is the USER PID %CPU %MEM ... header.
        for line in listing.lines().skip(1) {
            match parse_row(line) {
                Some(record) => records.push(record),
                None => {
                    if !line.trim().is_empty() {
                        debug!("skipping unparseable process row: {}", line);
                    }
                }
            }
        }

        Ok(records)
    }
}

/// Parses one `ps aux` row into a record, or `None` if the row is malformed.
fn parse_row(line: &str) -> Option<ProcessRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() <= COMMAND_COLUMN {
        return None;
    }

    let owner_user = fields[0].to_string();
    let pid: u32 = fields[1].parse().ok()?;
    let cpu_percent: f64 = fields[2].parse().ok()?;
    let mem_percent: f64 = fields[3].parse().ok()?;
    if !cpu_percent.is_finite()
        || !mem_percent.is_finite()
        || cpu_percent < 0.0
        || mem_percent < 0.0
    {
        return None;
    }

    // The command field is the remainder of the row; embedded runs of
    // whitespace collapse to single spaces.
    let command = fields[COMMAND_COLUMN..].join(" ");

    Some(ProcessRecord {
        owner_user,
        pid,
        cpu_percent,
        mem_percent,
        command_display: truncate_command(&command),
    })
}

/// Bounds a command string for display.
///
/// Strings of up to 60 characters pass through unchanged. Longer strings
/// become the first 31 characters, `"...."`, and the last 30 characters
/// (65 characters total). Slicing is character-based so multi-byte input
/// cannot be split mid-sequence.
pub fn truncate_command(command: &str) -> String {
    let char_count = command.chars().count();
    if char_count <= COMMAND_DISPLAY_MAX {
        return command.to_string();
    }

    let prefix: String = command.chars().take(COMMAND_PREFIX_LEN).collect();
    let suffix: String = command
        .chars()
        .skip(char_count - COMMAND_SUFFIX_LEN)
        .collect();
    format!("{}....{}", prefix, suffix)
}
