//! Analysis result types.
//!
//! This module provides the key-erased form of a core [`Report`] that every
//! renderer and sink consumes, plus the series form handed to charting.

use benchlog_core::{Metric, Report, SeriesGroup, SeriesKey, SummaryStatistics, TimedSample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one series with its key rendered as a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Metric of the series.
    pub metric: Metric,
    /// Unit of every value in the series.
    pub unit: String,
    /// Grouping label, empty when grouped by metric only.
    pub key: String,
    /// Number of samples.
    pub count: usize,
    /// Statistics, absent for gap groups.
    pub statistics: Option<SummaryStatistics>,
}

/// Analysis result ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Name of the analysis, e.g. `disk`.
    pub title: String,
    /// Candidate readings seen.
    pub readings: usize,
    /// Raw fields of unrecognized readings.
    pub unrecognized: Vec<Vec<String>>,
    /// True when statistics were suppressed.
    pub withheld: bool,
    /// Per-series summaries.
    pub series: Vec<SeriesSummary>,
    /// When the result was produced.
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Build a result from a core report.
    pub fn new<K: SeriesKey>(title: impl Into<String>, report: &Report<K>) -> Self {
        Self {
            title: title.into(),
            readings: report.readings,
            unrecognized: report.unrecognized.clone(),
            withheld: report.withheld,
            series: report
                .series
                .iter()
                .map(|group| SeriesSummary {
                    metric: group.metric,
                    unit: group.metric.unit().to_string(),
                    key: group.key.label(),
                    count: group.count,
                    statistics: group.statistics.clone(),
                })
                .collect(),
            generated_at: Utc::now(),
        }
    }
}

/// Samples of one series, in the shape charting tools consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Metric of the series.
    pub metric: Metric,
    /// Unit of the samples.
    pub unit: String,
    /// Grouping label.
    pub key: String,
    /// Sample values; empty for gap groups.
    pub samples: Vec<f64>,
    /// Samples with the start time of their run, oldest first. Only
    /// present for timeline analyses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<TimedSample>,
}

/// Convert finished groups into chart series, keeping their order.
pub fn chart_series<K: SeriesKey>(groups: &[SeriesGroup<K>]) -> Vec<ChartSeries> {
    groups
        .iter()
        .map(|group| ChartSeries {
            metric: group.metric,
            unit: group.metric.unit().to_string(),
            key: group.key.label(),
            samples: group.samples.clone(),
            points: group.points.clone(),
        })
        .collect()
}
