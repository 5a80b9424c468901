// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run manifest parsing and timestamp resolution.
//!
//! Each measurement batch ships with a hand-maintained manifest that lists
//! when every run was taken:
//!
//! ```text
//! Singapore runs
//! ==============
//! * 26 -- 8/31 -- 3am
//! * 28 -- 2015/9/1 -- 12pm
//! ```
//!
//! Lines that do not start with the marker are ignored. A marker line that
//! does not split into `run -- date -- time` is a hard error, except for one
//! known entry recorded in a different shape (see [`ANOMALOUS_ENTRY`]).

use crate::error::{Error, Result};
use crate::lines;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;
use tracing::{debug, warn};

/// Manifest entry for run 27, which was pasted from `date` output instead
/// of the usual `run -- date -- time` form.
pub const ANOMALOUS_ENTRY: &str = "* 27, Mon Aug 31 11:45:24 PDT 2015, ap-southeast-1a, i2.xlarge";

const ANOMALOUS_RUN: &str = "27";
const SEGMENT_SEPARATOR: &str = " -- ";

fn anomalous_timestamp() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2015, 8, 31)?.and_hms_opt(11, 45, 24)
}

/// How manifest files are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Character that starts an entry line.
    pub marker: char,
    /// Number of leading lines dropped by position before any matching.
    pub header_lines: usize,
    /// Year used for `month/day` dates.
    pub default_year: i32,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            marker: '*',
            header_lines: 0,
            default_year: 2015,
        }
    }
}

/// One execution of an experiment with its resolved start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentRun {
    /// Identifier used in the manifest.
    pub run_id: String,
    /// When the run was taken.
    pub timestamp: NaiveDateTime,
}

/// Mapping from run identifier to the time the run was taken.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: HashMap<String, NaiveDateTime>,
}

impl Manifest {
    /// Parse a manifest from a reader.
    pub fn parse<R: BufRead>(reader: R, config: &ManifestConfig) -> Result<Self> {
        let mut entries = HashMap::new();

        for (index, line) in lines::raw_lines(reader).enumerate().skip(config.header_lines) {
            let bytes = line?;
            let line = lines::decode(&bytes);
            let line_no = index + 1;

            let (run_id, timestamp) = if line.trim() == ANOMALOUS_ENTRY {
                let timestamp = anomalous_timestamp().ok_or_else(|| Error::MalformedManifestLine {
                    line: line_no,
                    reason: "invalid fixed timestamp".to_string(),
                })?;
                (ANOMALOUS_RUN.to_string(), timestamp)
            } else if line.starts_with(config.marker) {
                parse_entry(&line[config.marker.len_utf8()..], config.default_year)
                    .map_err(|reason| Error::MalformedManifestLine { line: line_no, reason })?
            } else {
                debug!(line = line_no, "Skipping manifest line without marker");
                continue;
            };

            if let Some(previous) = entries.insert(run_id.clone(), timestamp) {
                warn!(
                    run_id = %run_id,
                    previous = %previous,
                    replacement = %timestamp,
                    "Duplicate manifest entry, keeping the later one"
                );
            }
        }

        Ok(Self { entries })
    }

    /// Look up the timestamp of a run.
    pub fn resolve(&self, run_id: &str) -> Result<NaiveDateTime> {
        self.entries
            .get(run_id)
            .copied()
            .ok_or_else(|| Error::MissingTimestamp {
                run_id: run_id.to_string(),
            })
    }

    /// Resolve a run identifier into an [`ExperimentRun`].
    pub fn run(&self, run_id: &str) -> Result<ExperimentRun> {
        Ok(ExperimentRun {
            run_id: run_id.to_string(),
            timestamp: self.resolve(run_id)?,
        })
    }

    /// Number of runs in the manifest.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no run was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(body: &str, default_year: i32) -> std::result::Result<(String, NaiveDateTime), String> {
    let segments: Vec<&str> = body.trim().split(SEGMENT_SEPARATOR).map(str::trim).collect();
    let [run_id, date, time] = segments.as_slice() else {
        return Err(format!(
            "expected 'run -- date -- time', found {} segment(s)",
            segments.len()
        ));
    };
    if run_id.is_empty() {
        return Err("empty run identifier".to_string());
    }

    let date = parse_date(*date, default_year)?;
    let hour = parse_hour(*time)?;
    let timestamp = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| format!("invalid hour {hour}"))?;

    Ok((run_id.to_string(), timestamp))
}

fn parse_date(text: &str, default_year: i32) -> std::result::Result<NaiveDate, String> {
    let parts: Vec<&str> = text.split('/').collect();
    let number = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid date component '{s}' in '{text}'"))
    };

    let (year, month, day) = match parts.as_slice() {
        [month, day] => (default_year, number(*month)?, number(*day)?),
        [year, month, day] => {
            let year = number(*year)? as i32;
            (year, number(*month)?, number(*day)?)
        }
        _ => return Err(format!("date '{text}' is neither month/day nor year/month/day")),
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| format!("no such date '{text}'"))
}

/// Parse a 12-hour clock reading such as `3am` or `12pm` into 0-23.
fn parse_hour(text: &str) -> std::result::Result<u32, String> {
    let lower = text.to_ascii_lowercase();
    let (digits, offset) = if let Some(digits) = lower.strip_suffix("am") {
        (digits, 0)
    } else if let Some(digits) = lower.strip_suffix("pm") {
        (digits, 12)
    } else {
        return Err(format!("time '{text}' must end in am or pm"));
    };

    let hour: u32 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid hour in '{text}'"))?;
    if !(1..=12).contains(&hour) {
        return Err(format!("hour in '{text}' is outside 1-12"));
    }

    Ok(hour % 12 + offset)
}
