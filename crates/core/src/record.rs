// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Log record parsing for the disk-benchmark line format.
//!
//! A disk benchmark log interleaves setup chatter with readings such as
//!
//! ```text
//! r, a, s, 1048576, 15, 1, 123.45
//! ```
//!
//! where the first field is the operation marker and the last field is the
//! measured throughput. Only lines whose first character is `r` or `w` are
//! treated as readings; everything else is skipped without comment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation kind of a benchmark reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// A read measurement (`r`).
    Read,
    /// A write measurement (`w`).
    Write,
    /// A candidate line that could not be interpreted.
    Unknown,
}

impl Operation {
    fn from_marker(field: &str) -> Self {
        match field {
            "r" => Operation::Read,
            "w" => Operation::Write,
            _ => Operation::Unknown,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
            Operation::Unknown => write!(f, "unknown"),
        }
    }
}

/// Field separator used by a log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// Comma separated (disk benchmark output).
    #[default]
    Comma,
    /// Runs of whitespace (network benchmark output).
    Whitespace,
}

/// One benchmark observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Operation kind taken from the first field.
    pub operation: Operation,
    /// Measurement taken from the last field. NaN when it did not parse.
    pub value: f64,
    /// Everything before the last field, exactly as it appeared.
    ///
    /// This is the experiment label used when plotting every experiment
    /// setup as its own series.
    pub signature: String,
    /// Original tokens, kept only for unrecognized records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_fields: Option<Vec<String>>,
}

impl LogRecord {
    /// Returns true when the record is a usable read or write.
    pub fn is_recognized(&self) -> bool {
        self.operation != Operation::Unknown
    }
}

/// Turns raw log lines into [`LogRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser {
    delimiter: Delimiter,
}

impl RecordParser {
    /// Create a parser for the given field separator.
    pub fn new(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }

    /// Returns true when a raw line starts with a read or write marker.
    ///
    /// Only candidate lines need to be decoded and parsed.
    pub fn is_candidate(line: &[u8]) -> bool {
        matches!(line.first(), Some(b'r' | b'w'))
    }

    /// Classify one line.
    ///
    /// Returns `None` for lines that are not readings at all (headers,
    /// blank lines, comments). Candidate lines that fail to parse come back
    /// as [`Operation::Unknown`] with their raw fields attached.
    pub fn parse(&self, line: &str) -> Option<LogRecord> {
        let line = line.trim_end_matches(['\n', '\r']);
        if !line.starts_with(['r', 'w']) {
            return None;
        }

        let fields: Vec<&str> = match self.delimiter {
            Delimiter::Comma => line.split(',').collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        };
        let last = fields.last().copied().unwrap_or_default();
        let signature = match self.delimiter {
            Delimiter::Comma => line
                .rsplit_once(',')
                .map(|(head, _)| head)
                .unwrap_or_default()
                .to_string(),
            Delimiter::Whitespace => fields[..fields.len().saturating_sub(1)].join(" "),
        };

        let operation = Operation::from_marker(fields[0].trim());
        let value = last.trim().parse::<f64>();

        match (operation, value) {
            (Operation::Read | Operation::Write, Ok(value)) => Some(LogRecord {
                operation,
                value,
                signature,
                raw_fields: None,
            }),
            (_, value) => Some(LogRecord {
                operation: Operation::Unknown,
                value: value.unwrap_or(f64::NAN),
                signature,
                raw_fields: Some(fields.iter().map(|f| f.to_string()).collect()),
            }),
        }
    }
}
