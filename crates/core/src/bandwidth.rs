// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bandwidth extraction from iperf-style summary lines.
//!
//! The final line of an iperf client log reads like
//!
//! ```text
//! [  3]  0.0-100.0 sec   111 GBytes  9.54 Gbits/sec
//! ```
//!
//! Values are normalized to Mbit/s before they reach an aggregator.

use crate::error::{Error, Result};
use crate::lines;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Factor applied to `Gbits/sec` readings to express them in Mbit/s.
pub const DEFAULT_GBIT_FACTOR: f64 = 1024.0;

/// Unit token at the end of a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandwidthUnit {
    /// `Mbits/sec`
    Mbits,
    /// `Gbits/sec`
    Gbits,
}

impl BandwidthUnit {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "Mbits/sec" => Some(Self::Mbits),
            "Gbits/sec" => Some(Self::Gbits),
            _ => None,
        }
    }
}

/// Unit normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BandwidthConfig {
    /// Multiplier turning one Gbit/s into Mbit/s.
    pub gbit_factor: f64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Self {
            gbit_factor: DEFAULT_GBIT_FACTOR,
        }
    }
}

impl BandwidthConfig {
    /// Convert a value in `unit` to Mbit/s.
    pub fn normalize(&self, value: f64, unit: BandwidthUnit) -> f64 {
        match unit {
            BandwidthUnit::Mbits => value,
            BandwidthUnit::Gbits => value * self.gbit_factor,
        }
    }
}

/// Parse one summary line into Mbit/s.
pub fn parse_bandwidth(line: &str, config: &BandwidthConfig) -> Result<f64> {
    let malformed = |reason: &str| Error::MalformedBandwidth {
        line: line.trim_end().to_string(),
        reason: reason.to_string(),
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [.., value, unit] = tokens.as_slice() else {
        return Err(malformed("expected a value followed by a unit"));
    };

    let unit = BandwidthUnit::from_token(unit)
        .ok_or_else(|| malformed("unit must be Mbits/sec or Gbits/sec"))?;
    let value: f64 = value
        .parse()
        .map_err(|_| malformed("bandwidth value is not a number"))?;

    Ok(config.normalize(value, unit))
}

/// Read an iperf log and parse its last non-blank line.
pub fn read_final_bandwidth<R: BufRead>(reader: R, config: &BandwidthConfig) -> Result<f64> {
    let mut last = None;
    for line in lines::raw_lines(reader) {
        let line = line?;
        if !lines::is_blank(&line) {
            last = Some(line);
        }
    }

    match last {
        Some(line) => parse_bandwidth(&lines::decode(&line), config),
        None => Err(Error::MalformedBandwidth {
            line: String::new(),
            reason: "log contains no summary line".to_string(),
        }),
    }
}
