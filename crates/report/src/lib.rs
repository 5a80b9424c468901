//! Report rendering for benchlog analyses.
//!
//! This crate turns the structured report produced by `benchlog-core` into
//! output: plain text for the terminal, markdown for notes, and JSON for
//! plotting tools.
//!
//! # Quick Start
//!
//! ```
//! use benchlog_core::{Ingest, PipelineConfig};
//! use benchlog_report::{text, AnalysisResult};
//! use std::io::Cursor;
//!
//! let config = PipelineConfig::default();
//! let mut ingest = Ingest::from_config(&config);
//! ingest.ingest_reader(Cursor::new("w, s, s, 10485760, 1, 0, 88.0\n"), |_| ()).unwrap();
//! let report = ingest.finish().summarize(&config.percentiles).unwrap();
//!
//! let result = AnalysisResult::new("disk", &report);
//! assert!(text::render(&result).contains("Max write bandwidth: 88 MB/s"));
//! ```
//!
//! # Modules
//!
//! - [`result`] - The `AnalysisResult` and `ChartSeries` types
//! - [`text`] - Terminal report
//! - [`markdown`] - Markdown report generation
//! - [`io`] - I/O operations for reading/writing results
//! - [`sink`] - Output destinations

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod io;
pub mod markdown;
pub mod result;
pub mod sink;
pub mod text;

pub use result::{chart_series, AnalysisResult, ChartSeries, SeriesSummary};
pub use sink::{emit_all, JsonSink, MarkdownSink, ReportSink, TextSink};
