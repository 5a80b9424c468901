//! I/O operations for analysis results.
//!
//! This module provides functionality to read and write analysis results
//! and chart series to the filesystem.

use crate::result::{AnalysisResult, ChartSeries};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Default output directory path.
pub const OUTPUT_DIR: &str = "benchlog/output";

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> io::Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Write an analysis result to a JSON file.
pub fn write_result_json(result: &AnalysisResult, path: impl AsRef<Path>) -> io::Result<()> {
    write_json(result, path.as_ref())
}

/// Read an analysis result from a JSON file.
pub fn read_result_json(path: impl AsRef<Path>) -> io::Result<AnalysisResult> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Write chart series to a JSON file.
pub fn write_chart_series(series: &[ChartSeries], path: impl AsRef<Path>) -> io::Result<()> {
    write_json(series, path.as_ref())
}

/// Read chart series from a JSON file.
pub fn read_chart_series(path: impl AsRef<Path>) -> io::Result<Vec<ChartSeries>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
