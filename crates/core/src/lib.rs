// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core analysis pipeline for disk and network benchmark logs.
//!
//! The pipeline reads line-oriented benchmark output, groups the readings
//! into series and computes descriptive statistics over each series:
//!
//! ```text
//! record / bandwidth ──► aggregate ──► stats
//!          ▲
//!      manifest (run id → timestamp, used as grouping key)
//! ```
//!
//! # Modules
//!
//! - [`record`] - disk benchmark line parser
//! - [`bandwidth`] - iperf summary line parser
//! - [`manifest`] - run manifest and timestamp resolution
//! - [`aggregate`] - series grouping, including gap-filled daily series
//! - [`stats`] - percentiles and summary statistics
//! - [`pipeline`] - the stages wired together into a structured report
//! - [`config`] - layered configuration

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod bandwidth;
pub mod config;
pub mod error;
mod lines;
pub mod manifest;
pub mod pipeline;
pub mod record;
pub mod stats;

pub use aggregate::{Metric, SeriesAggregator, SeriesGroup, SeriesKey, TimedSample};
pub use crate::config::PipelineConfig;
pub use error::{Error, Result};
pub use manifest::{ExperimentRun, Manifest};
pub use pipeline::{GroupSummary, Ingest, Ingested, Report};
pub use record::{Delimiter, LogRecord, Operation, RecordParser};
pub use stats::{Percentile, SummaryStatistics};
