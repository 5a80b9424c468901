// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by every stage of the pipeline.

use thiserror::Error;

/// Errors that can occur while ingesting logs or computing summaries.
#[derive(Debug, Error)]
pub enum Error {
    /// A candidate record could not be interpreted.
    ///
    /// The ingest pipeline collects these instead of raising them; the
    /// variant surfaces only when an unknown record is pushed directly
    /// into an aggregator.
    #[error("Unrecognized record: {}", .fields.join(","))]
    UnrecognizedRecord {
        /// Raw fields of the offending line.
        fields: Vec<String>,
    },

    /// A run identifier has no manifest entry.
    #[error("No timestamp recorded for run '{run_id}'")]
    MissingTimestamp {
        /// The run identifier that was looked up.
        run_id: String,
    },

    /// A marker line in the manifest does not follow the entry format.
    #[error("Malformed manifest line {line}: {reason}")]
    MalformedManifestLine {
        /// One-based line number in the manifest.
        line: usize,
        /// What was wrong with the entry.
        reason: String,
    },

    /// Statistics were requested over zero samples.
    #[error("Cannot summarize an empty sample set")]
    EmptyInput,

    /// A percentile rank outside `[0, 100]` was requested.
    #[error("Percentile {0} is outside [0, 100]")]
    InvalidPercentile(f64),

    /// A network summary line does not end in `<value> <unit>`.
    #[error("Malformed bandwidth line '{line}': {reason}")]
    MalformedBandwidth {
        /// The offending line.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
