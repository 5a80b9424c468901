// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Descriptive statistics over sample sets.
//!
//! Percentiles use linear interpolation between the two closest ranks
//! (`rank = p / 100 * (n - 1)`), standard deviation is the population
//! variant. Every entry point fails with [`Error::EmptyInput`] on an empty
//! sample set instead of producing a placeholder value.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Percentiles reported when none are configured.
pub const DEFAULT_PERCENTILES: [f64; 6] = [5.0, 10.0, 50.0, 85.0, 90.0, 95.0];

/// One requested percentile and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    /// Requested rank in `[0, 100]`.
    pub rank: f64,
    /// Interpolated sample value at that rank.
    pub value: f64,
}

/// Summary of one sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Number of samples.
    pub count: usize,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// Requested percentiles, in request order.
    pub percentiles: Vec<Percentile>,
}

impl SummaryStatistics {
    /// Value for a requested rank, if it was part of the request.
    pub fn percentile(&self, rank: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| p.rank == rank)
            .map(|p| p.value)
    }
}

/// A non-empty, ascending copy of a sample set.
#[derive(Debug, Clone)]
pub struct SortedSamples {
    values: Vec<f64>,
}

impl SortedSamples {
    /// Sort a copy of `samples`.
    pub fn new(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut values = samples.to_vec();
        values.sort_by(f64::total_cmp);
        Ok(Self { values })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Never true for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest sample.
    pub fn min(&self) -> f64 {
        self.values[0]
    }

    /// Largest sample.
    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Linearly interpolated percentile.
    pub fn percentile(&self, p: f64) -> Result<f64> {
        if !(0.0..=100.0).contains(&p) {
            return Err(Error::InvalidPercentile(p));
        }

        let rank = p / 100.0 * (self.values.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let fraction = rank - lower as f64;

        let (lo, hi) = (self.values[lower], self.values[upper]);
        Ok(lo + (hi - lo) * fraction)
    }

    /// Several percentiles from one sort.
    pub fn percentiles(&self, ranks: &[f64]) -> Result<Vec<Percentile>> {
        ranks
            .iter()
            .map(|&rank| -> Result<Percentile> {
                Ok(Percentile {
                    rank,
                    value: self.percentile(rank)?,
                })
            })
            .collect()
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation.
    pub fn stddev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.values.len() as f64;
        variance.sqrt()
    }

    /// Full summary including the requested percentiles.
    pub fn summarize(&self, ranks: &[f64]) -> Result<SummaryStatistics> {
        Ok(SummaryStatistics {
            count: self.len(),
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            median: self.percentile(50.0)?,
            stddev: self.stddev(),
            percentiles: self.percentiles(ranks)?,
        })
    }
}

/// Single percentile of an unsorted sample set.
pub fn percentile(samples: &[f64], p: f64) -> Result<f64> {
    SortedSamples::new(samples)?.percentile(p)
}

/// Several percentiles of an unsorted sample set, sorting once.
pub fn percentiles(samples: &[f64], ranks: &[f64]) -> Result<Vec<Percentile>> {
    SortedSamples::new(samples)?.percentiles(ranks)
}

/// Summarize an unsorted sample set.
pub fn summarize(samples: &[f64], ranks: &[f64]) -> Result<SummaryStatistics> {
    SortedSamples::new(samples)?.summarize(ranks)
}
