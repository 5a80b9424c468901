// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ingest pipeline: parser, aggregator and summarizer wired together.
//!
//! An [`Ingest`] owns its aggregator while input streams in. Finishing it
//! yields an immutable [`Ingested`] snapshot, and summarizing the snapshot
//! yields a [`Report`] that callers render however they like.
//!
//! ```
//! use benchlog_core::{Ingest, PipelineConfig};
//! use std::io::Cursor;
//!
//! let config = PipelineConfig::default();
//! let mut ingest = Ingest::from_config(&config);
//! ingest.ingest_reader(Cursor::new("r, a, 10\nr, a, 20\n"), |_| ()).unwrap();
//!
//! let report = ingest.finish().summarize(&config.percentiles).unwrap();
//! assert_eq!(report.readings, 2);
//! assert_eq!(report.series[0].statistics.as_ref().unwrap().mean, 15.0);
//! ```

use crate::aggregate::{Metric, SeriesAggregator, SeriesGroup, SeriesKey};
use crate::bandwidth::{self, BandwidthConfig};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::lines;
use crate::manifest::ExperimentRun;
use crate::record::{LogRecord, RecordParser};
use crate::stats::{self, SummaryStatistics};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::BufRead;
use tracing::{debug, warn};

/// In-progress ingestion of one or more logs.
#[derive(Debug)]
pub struct Ingest<K> {
    parser: RecordParser,
    bandwidth: BandwidthConfig,
    aggregator: SeriesAggregator<K>,
    readings: usize,
    unrecognized: Vec<LogRecord>,
}

impl<K: SeriesKey> Ingest<K> {
    /// Create an ingest with explicit parser settings.
    pub fn new(parser: RecordParser, bandwidth: BandwidthConfig) -> Self {
        Self {
            parser,
            bandwidth,
            aggregator: SeriesAggregator::new(),
            readings: 0,
            unrecognized: Vec::new(),
        }
    }

    /// Create an ingest using the parser settings of `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(RecordParser::new(config.delimiter), config.bandwidth.clone())
    }

    /// Feed one line. `key` is only called for usable records.
    pub fn ingest_line<F>(&mut self, line: &str, key: F)
    where
        F: FnOnce(&LogRecord) -> K,
    {
        self.ingest_line_at(line, None, key);
    }

    fn ingest_line_at<F>(&mut self, line: &str, at: Option<NaiveDateTime>, key: F)
    where
        F: FnOnce(&LogRecord) -> K,
    {
        let Some(record) = self.parser.parse(line) else {
            return;
        };
        self.readings += 1;

        match Metric::from_operation(record.operation) {
            Some(metric) => {
                let key = key(&record);
                match at {
                    Some(at) => self.aggregator.push_at(metric, key, record.value, at),
                    None => self.aggregator.push(metric, key, record.value),
                }
            }
            None => self.unrecognized.push(record),
        }
    }

    fn ingest_lines<R, F>(&mut self, reader: R, at: Option<NaiveDateTime>, mut key: F) -> Result<usize>
    where
        R: BufRead,
        F: FnMut(&LogRecord) -> K,
    {
        let before = self.readings;
        for line in lines::raw_lines(reader) {
            let line = line?;
            if RecordParser::is_candidate(&line) {
                self.ingest_line_at(&lines::decode(&line), at, &mut key);
            }
        }
        Ok(self.readings - before)
    }

    /// Feed every line of a disk benchmark log. Returns the number of
    /// readings found in this reader.
    pub fn ingest_reader<R, F>(&mut self, reader: R, key: F) -> Result<usize>
    where
        R: BufRead,
        F: FnMut(&LogRecord) -> K,
    {
        let found = self.ingest_lines(reader, None, key)?;
        debug!(readings = found, "Ingested disk log");
        Ok(found)
    }

    /// Feed the disk log of one run. Every sample also keeps the run's
    /// start time, so a series can be charted over time.
    pub fn ingest_run<R, F>(&mut self, reader: R, run: &ExperimentRun, key: F) -> Result<usize>
    where
        R: BufRead,
        F: FnMut(&LogRecord) -> K,
    {
        let found = self.ingest_lines(reader, Some(run.timestamp), key)?;
        debug!(run = %run.run_id, readings = found, "Ingested run log");
        Ok(found)
    }

    /// Feed an iperf log, which contributes one bandwidth sample.
    pub fn ingest_bandwidth<R: BufRead>(&mut self, reader: R, key: K) -> Result<f64> {
        let value = bandwidth::read_final_bandwidth(reader, &self.bandwidth)?;
        self.readings += 1;
        self.aggregator.push(Metric::Bandwidth, key, value);
        debug!(mbits = value, "Ingested bandwidth log");
        Ok(value)
    }

    /// Feed the iperf logs one node wrote while sending to each of its
    /// peers. The final bandwidths are summed into a single sample, the
    /// node's total outgoing bandwidth.
    pub fn ingest_node_bandwidth<I, R>(&mut self, readers: I, key: K) -> Result<f64>
    where
        I: IntoIterator<Item = R>,
        R: BufRead,
    {
        let mut total = 0.0;
        let mut peers = 0usize;
        for reader in readers {
            total += bandwidth::read_final_bandwidth(reader, &self.bandwidth)?;
            peers += 1;
        }
        if peers == 0 {
            return Err(Error::MalformedBandwidth {
                line: String::new(),
                reason: "node has no peer logs".to_string(),
            });
        }

        self.readings += 1;
        self.aggregator.push(Metric::Bandwidth, key, total);
        debug!(peers, mbits = total, "Ingested node bandwidth");
        Ok(total)
    }

    /// Readings seen so far, recognized or not.
    pub fn readings(&self) -> usize {
        self.readings
    }

    /// Finish ingestion with groups ordered by metric and key.
    pub fn finish(self) -> Ingested<K> {
        let groups = self.aggregator.finish();
        Ingested::new(self.readings, self.unrecognized, groups)
    }
}

impl Ingest<NaiveDate> {
    /// Finish ingestion of a daily series, filling gap dates.
    pub fn finish_contiguous(self) -> Ingested<NaiveDate> {
        let groups = self.aggregator.finish_contiguous();
        Ingested::new(self.readings, self.unrecognized, groups)
    }
}

/// Immutable result of an ingest.
#[derive(Debug, Clone)]
pub struct Ingested<K> {
    /// Candidate readings seen, including unrecognized ones.
    pub readings: usize,
    /// Readings that could not be interpreted.
    pub unrecognized: Vec<LogRecord>,
    /// Finished series.
    pub groups: Vec<SeriesGroup<K>>,
}

impl<K: SeriesKey> Ingested<K> {
    fn new(readings: usize, unrecognized: Vec<LogRecord>, groups: Vec<SeriesGroup<K>>) -> Self {
        if !unrecognized.is_empty() {
            warn!(
                count = unrecognized.len(),
                "Unrecognized readings present, statistics will be withheld"
            );
        }
        Self {
            readings,
            unrecognized,
            groups,
        }
    }

    /// Returns true when every candidate reading was understood.
    pub fn is_trustworthy(&self) -> bool {
        self.unrecognized.is_empty()
    }

    /// Summarize every group.
    ///
    /// When unrecognized readings exist no statistics are produced at all.
    /// Empty gap groups are listed with `statistics: None`.
    pub fn summarize(&self, percentiles: &[f64]) -> Result<Report<K>> {
        let unrecognized = self
            .unrecognized
            .iter()
            .map(|record| record.raw_fields.clone().unwrap_or_default())
            .collect();

        if !self.is_trustworthy() {
            return Ok(Report {
                readings: self.readings,
                unrecognized,
                withheld: true,
                series: Vec::new(),
            });
        }

        let series = self
            .groups
            .iter()
            .map(|group| -> Result<GroupSummary<K>> {
                let statistics = if group.is_empty() {
                    None
                } else {
                    Some(stats::summarize(&group.samples, percentiles)?)
                };
                Ok(GroupSummary {
                    metric: group.metric,
                    key: group.key.clone(),
                    count: group.count(),
                    statistics,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Report {
            readings: self.readings,
            unrecognized,
            withheld: false,
            series,
        })
    }
}

/// Statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary<K> {
    /// Metric of the group.
    pub metric: Metric,
    /// Grouping identity.
    pub key: K,
    /// Number of samples.
    pub count: usize,
    /// Summary, absent for gap groups.
    pub statistics: Option<SummaryStatistics>,
}

/// Structured outcome of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<K> {
    /// Candidate readings seen.
    pub readings: usize,
    /// Raw fields of every unrecognized reading.
    pub unrecognized: Vec<Vec<String>>,
    /// True when statistics were suppressed because of unrecognized input.
    pub withheld: bool,
    /// Per-group summaries, empty when withheld.
    pub series: Vec<GroupSummary<K>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DISK_LOG: &str = "\
Running on /dev/xvdb
type, mode, pattern, block, count, repeat, MB/s
r, a, s, 1048576, 15, 1, 100.0
r, a, s, 1048576, 15, 1, 200.0
w, a, s, 1048576, 15, 1, 50.0

w, a, r, 4096, 150, 1, 30.0
";

    #[test]
    fn test_disk_log_grouped_by_metric() {
        let config = PipelineConfig::default();
        let mut ingest = Ingest::from_config(&config);
        let found = ingest.ingest_reader(Cursor::new(DISK_LOG), |_| ()).unwrap();
        assert_eq!(found, 4);

        let report = ingest.finish().summarize(&[50.0]).unwrap();
        assert!(!report.withheld);
        assert_eq!(report.series.len(), 2);

        let read = report.series[0].statistics.as_ref().unwrap();
        assert_eq!(report.series[0].metric, Metric::Read);
        assert_eq!((read.count, read.min, read.max), (2, 100.0, 200.0));

        let write = report.series[1].statistics.as_ref().unwrap();
        assert_eq!(write.mean, 40.0);
    }

    #[test]
    fn test_unrecognized_readings_withhold_statistics() {
        let mut ingest: Ingest<()> = Ingest::from_config(&PipelineConfig::default());
        ingest
            .ingest_reader(Cursor::new("r, a, 1.0\nrw, a, 2.0\nw, a, broken\n"), |_| ())
            .unwrap();
        assert_eq!(ingest.readings(), 3);

        let ingested = ingest.finish();
        assert!(!ingested.is_trustworthy());

        let report = ingested.summarize(&[50.0]).unwrap();
        assert!(report.withheld);
        assert!(report.series.is_empty());
        assert_eq!(report.unrecognized.len(), 2);
        assert_eq!(report.unrecognized[0][0], "rw");
    }

    #[test]
    fn test_non_utf8_chatter_is_skipped() {
        let log = &b"r, a, 10\ncaf\xe9 setup chatter\nr, a, 20\n"[..];
        let mut ingest: Ingest<()> = Ingest::from_config(&PipelineConfig::default());
        assert_eq!(ingest.ingest_reader(Cursor::new(log), |_| ()).unwrap(), 2);

        let report = ingest.finish().summarize(&[50.0]).unwrap();
        assert!(!report.withheld);
        assert_eq!(report.series[0].statistics.as_ref().unwrap().median, 15.0);
    }

    #[test]
    fn test_non_utf8_candidate_is_unrecognized() {
        let log = &b"r, a, 1\xff0\n"[..];
        let mut ingest: Ingest<()> = Ingest::from_config(&PipelineConfig::default());
        ingest.ingest_reader(Cursor::new(log), |_| ()).unwrap();
        let report = ingest.finish().summarize(&[50.0]).unwrap();
        assert!(report.withheld);
        assert_eq!(report.unrecognized[0][2], " 1\u{fffd}0");
    }

    #[test]
    fn test_gap_groups_have_no_statistics() {
        let day = |d| NaiveDate::from_ymd_opt(2015, 10, d).unwrap();
        let mut ingest = Ingest::from_config(&PipelineConfig::default());
        ingest
            .ingest_bandwidth(Cursor::new("[ 3] 0.0-100.0 sec 11 GBytes 9 Gbits/sec\n"), day(16))
            .unwrap();
        ingest
            .ingest_bandwidth(Cursor::new("[ 3] 0.0-100.0 sec 1 GBytes 900 Mbits/sec\n"), day(18))
            .unwrap();

        let report = ingest.finish_contiguous().summarize(&[5.0, 95.0]).unwrap();
        assert_eq!(report.readings, 2);
        assert_eq!(report.series.len(), 3);
        assert_eq!(report.series[1].key, day(17));
        assert_eq!(report.series[1].count, 0);
        assert!(report.series[1].statistics.is_none());
        assert_eq!(report.series[0].statistics.as_ref().unwrap().max, 9216.0);
    }

    #[test]
    fn test_run_samples_keep_their_time() {
        let run = |id: &str, h| ExperimentRun {
            run_id: id.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2015, 8, 31).unwrap().and_hms_opt(h, 0, 0).unwrap(),
        };
        let mut ingest = Ingest::from_config(&PipelineConfig::default());
        ingest
            .ingest_run(Cursor::new("r, a, 300\n"), &run("27", 11), |r| r.signature.clone())
            .unwrap();
        ingest
            .ingest_run(Cursor::new("r, a, 100\nw, a, 5\n"), &run("26", 3), |r| r.signature.clone())
            .unwrap();

        let ingested = ingest.finish();
        let read = &ingested.groups[0];
        assert_eq!(read.key, "r, a");
        let points: Vec<(u32, f64)> = read
            .points
            .iter()
            .map(|p| (chrono::Timelike::hour(&p.timestamp), p.value))
            .collect();
        assert_eq!(points, vec![(3, 100.0), (11, 300.0)]);

        let report = ingested.summarize(&[50.0]).unwrap();
        assert_eq!(report.series[0].statistics.as_ref().unwrap().median, 200.0);
    }

    #[test]
    fn test_node_bandwidth_is_summed() {
        let mut ingest: Ingest<()> = Ingest::from_config(&PipelineConfig::default());
        let node_0 = [
            Cursor::new("[  3]  0.0-10.0 sec  1 GBytes  2 Gbits/sec\n"),
            Cursor::new("[  3]  0.0-10.0 sec  1 GBytes  952 Mbits/sec\n"),
        ];
        let node_1 = [Cursor::new("[  3]  0.0-10.0 sec  1 GBytes  1 Gbits/sec\n")];
        assert_eq!(ingest.ingest_node_bandwidth(node_0, ()).unwrap(), 3000.0);
        assert_eq!(ingest.ingest_node_bandwidth(node_1, ()).unwrap(), 1024.0);
        assert_eq!(ingest.readings(), 2);

        let report = ingest.finish().summarize(&[50.0]).unwrap();
        let stats = report.series[0].statistics.as_ref().unwrap();
        assert_eq!((stats.count, stats.min, stats.max), (2, 1024.0, 3000.0));
    }

    #[test]
    fn test_node_without_peer_logs_is_rejected() {
        let mut ingest: Ingest<()> = Ingest::from_config(&PipelineConfig::default());
        let err = ingest
            .ingest_node_bandwidth(Vec::<Cursor<&str>>::new(), ())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedBandwidth { .. }));
        assert_eq!(ingest.readings(), 0);
    }

    #[test]
    fn test_bad_bandwidth_log_is_fatal() {
        let mut ingest: Ingest<()> = Ingest::from_config(&PipelineConfig::default());
        assert!(ingest
            .ingest_bandwidth(Cursor::new("connect failed: Connection refused\n"), ())
            .is_err());
        assert_eq!(ingest.readings(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let mut ingest = Ingest::from_config(&PipelineConfig::default());
        ingest
            .ingest_reader(Cursor::new("r, a, 4.0\n"), |r| r.signature.clone())
            .unwrap();
        let report = ingest.finish().summarize(&[90.0]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["series"][0]["key"], "r, a");
        assert_eq!(json["series"][0]["metric"], "read");
        assert_eq!(json["withheld"], false);
    }
}
