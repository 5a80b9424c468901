// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Grouping of samples into series.
//!
//! Samples are grouped by `(metric, key)`, so a single group can never mix
//! reads with writes or throughput with bandwidth. The key is chosen by the
//! caller: nothing (one group per metric), the experiment signature, or the
//! time a run was taken.

use crate::error::{Error, Result};
use crate::record::{LogRecord, Operation};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What a sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Disk read throughput.
    Read,
    /// Disk write throughput.
    Write,
    /// Network bandwidth.
    Bandwidth,
}

impl Metric {
    /// Unit samples of this metric are expressed in.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Read | Metric::Write => "MB/s",
            Metric::Bandwidth => "Mbit/s",
        }
    }

    /// Metric carried by a record, if the record is usable.
    pub fn from_operation(operation: Operation) -> Option<Self> {
        match operation {
            Operation::Read => Some(Metric::Read),
            Operation::Write => Some(Metric::Write),
            Operation::Unknown => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Read => write!(f, "read"),
            Metric::Write => write!(f, "write"),
            Metric::Bandwidth => write!(f, "bandwidth"),
        }
    }
}

/// A grouping key.
pub trait SeriesKey: Ord + Clone {
    /// Human readable label. Empty for the unit key.
    fn label(&self) -> String;
}

impl SeriesKey for () {
    fn label(&self) -> String {
        String::new()
    }
}

impl SeriesKey for String {
    fn label(&self) -> String {
        self.clone()
    }
}

impl SeriesKey for NaiveDate {
    fn label(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl SeriesKey for NaiveDateTime {
    fn label(&self) -> String {
        self.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// A sample tagged with the time its run was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    /// Start time of the run that produced the sample.
    pub timestamp: NaiveDateTime,
    /// Sample value.
    pub value: f64,
}

/// Samples of one metric sharing one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesGroup<K> {
    /// Metric of every sample in the group.
    pub metric: Metric,
    /// Grouping identity.
    pub key: K,
    /// Sample values, in no guaranteed order.
    pub samples: Vec<f64>,
    /// Samples that were pushed with a run time, ordered by that time.
    pub points: Vec<TimedSample>,
}

impl<K> SeriesGroup<K> {
    /// Number of samples.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Returns true for gap groups.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct GroupBuffer {
    samples: Vec<f64>,
    points: Vec<TimedSample>,
}

/// Accumulates samples until the caller finishes the series.
#[derive(Debug, Clone)]
pub struct SeriesAggregator<K> {
    groups: BTreeMap<(Metric, K), GroupBuffer>,
}

impl<K: SeriesKey> Default for SeriesAggregator<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SeriesKey> SeriesAggregator<K> {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Add one sample.
    pub fn push(&mut self, metric: Metric, key: K, value: f64) {
        self.groups.entry((metric, key)).or_default().samples.push(value);
    }

    /// Add one sample and remember when its run was taken.
    pub fn push_at(&mut self, metric: Metric, key: K, value: f64, timestamp: NaiveDateTime) {
        let buffer = self.groups.entry((metric, key)).or_default();
        buffer.samples.push(value);
        buffer.points.push(TimedSample { timestamp, value });
    }

    /// Add a parsed record. Unknown records are rejected.
    pub fn push_record(&mut self, key: K, record: &LogRecord) -> Result<()> {
        let metric = Metric::from_operation(record.operation).ok_or_else(|| Error::UnrecognizedRecord {
            fields: record.raw_fields.clone().unwrap_or_default(),
        })?;
        self.push(metric, key, record.value);
        Ok(())
    }

    /// Total number of samples across all groups.
    pub fn sample_count(&self) -> usize {
        self.groups.values().map(|buffer| buffer.samples.len()).sum()
    }

    /// Finish the series, ordered by metric then ascending key.
    pub fn finish(self) -> Vec<SeriesGroup<K>> {
        self.groups
            .into_iter()
            .map(|((metric, key), mut buffer)| {
                buffer.points.sort_by_key(|point| point.timestamp);
                SeriesGroup {
                    metric,
                    key,
                    samples: buffer.samples,
                    points: buffer.points,
                }
            })
            .collect()
    }
}

impl SeriesAggregator<NaiveDate> {
    /// Finish a daily series, filling every missing date between the first
    /// and last observation of each metric with an empty group.
    pub fn finish_contiguous(self) -> Vec<SeriesGroup<NaiveDate>> {
        let mut out: Vec<SeriesGroup<NaiveDate>> = Vec::with_capacity(self.groups.len());

        for group in self.finish() {
            let previous = out
                .last()
                .filter(|prev| prev.metric == group.metric)
                .map(|prev| prev.key);
            if let Some(mut day) = previous {
                while let Some(next) = day.succ_opt().filter(|next| *next < group.key) {
                    out.push(SeriesGroup {
                        metric: group.metric,
                        key: next,
                        samples: Vec::new(),
                        points: Vec::new(),
                    });
                    day = next;
                }
            }
            out.push(group);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordParser;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 8, d).unwrap()
    }

    #[test]
    fn test_groups_are_split_by_metric() {
        let parser = RecordParser::default();
        let mut agg = SeriesAggregator::new();
        for line in ["r, a, 10", "w, a, 20", "r, b, 30"] {
            agg.push_record((), &parser.parse(line).unwrap()).unwrap();
        }
        let groups = agg.finish();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].metric, Metric::Read);
        assert_eq!(groups[0].samples, vec![10.0, 30.0]);
        assert_eq!(groups[1].metric, Metric::Write);
        assert_eq!(groups[1].samples, vec![20.0]);
    }

    #[test]
    fn test_signature_keys_are_ascending() {
        let parser = RecordParser::default();
        let mut agg = SeriesAggregator::new();
        for line in ["r, s, 4096, 3", "r, a, 4096, 1", "r, s, 4096, 5"] {
            let record = parser.parse(line).unwrap();
            agg.push_record(record.signature.clone(), &record).unwrap();
        }
        let groups = agg.finish();
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["r, a, 4096", "r, s, 4096"]);
        assert_eq!(groups[1].count(), 2);
    }

    #[test]
    fn test_unknown_record_is_rejected() {
        let record = RecordParser::default().parse("r, a, nope").unwrap();
        let mut agg: SeriesAggregator<()> = SeriesAggregator::new();
        let err = agg.push_record((), &record).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedRecord { .. }));
        assert_eq!(agg.sample_count(), 0);
    }

    #[test]
    fn test_gap_days_are_filled() {
        let mut agg = SeriesAggregator::new();
        agg.push(Metric::Bandwidth, day(3), 900.0);
        agg.push(Metric::Bandwidth, day(1), 1000.0);
        let groups = agg.finish_contiguous();
        let keys: Vec<NaiveDate> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![day(1), day(2), day(3)]);
        assert!(groups[1].is_empty());
        assert_eq!(groups[1].metric, Metric::Bandwidth);
    }

    #[test]
    fn test_gap_fill_is_per_metric() {
        let mut agg = SeriesAggregator::new();
        agg.push(Metric::Read, day(1), 1.0);
        agg.push(Metric::Read, day(4), 1.0);
        agg.push(Metric::Write, day(10), 2.0);
        let groups = agg.finish_contiguous();
        assert_eq!(groups.len(), 5);
        assert_eq!(groups[4].metric, Metric::Write);
        assert_eq!(groups[4].key, day(10));
        assert_eq!(groups.iter().filter(|g| g.is_empty()).count(), 2);
    }

    #[test]
    fn test_timed_samples_are_chronological() {
        let at = |d, h| day(d).and_hms_opt(h, 0, 0).unwrap();
        let mut agg = SeriesAggregator::new();
        agg.push_at(Metric::Read, "r, a".to_string(), 30.0, at(2, 9));
        agg.push_at(Metric::Read, "r, a".to_string(), 10.0, at(1, 15));
        agg.push(Metric::Read, "r, b".to_string(), 5.0);

        let groups = agg.finish();
        assert_eq!(groups[0].samples, vec![30.0, 10.0]);
        let times: Vec<NaiveDateTime> = groups[0].points.iter().map(|p| p.timestamp).collect();
        assert_eq!(times, vec![at(1, 15), at(2, 9)]);
        assert_eq!(groups[0].points[0].value, 10.0);
        assert!(groups[1].points.is_empty());
    }

    #[test]
    fn test_empty_aggregator_finishes_empty() {
        let agg: SeriesAggregator<NaiveDate> = SeriesAggregator::new();
        assert!(agg.finish_contiguous().is_empty());
    }

    #[test]
    fn test_key_labels() {
        assert_eq!(day(2).label(), "2015-08-02");
        assert_eq!(().label(), "");
        assert_eq!(day(2).and_hms_opt(15, 0, 0).unwrap().label(), "2015-08-02 15:00:00");
    }
}
