//! Report sinks.
//!
//! A sink is the boundary where a finished [`AnalysisResult`] leaves the
//! program: a terminal, a markdown note or a JSON file for plotting tools.

use crate::io as report_io;
use crate::markdown;
use crate::result::AnalysisResult;
use crate::text;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Destination for analysis results.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Deliver one result.
    fn emit(&mut self, result: &AnalysisResult) -> io::Result<()>;
}

/// Writes the plain-text report to a writer.
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Create a sink over `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextSink<io::Stdout> {
    /// Text sink over standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn describe(&self) -> String {
        "text".to_string()
    }

    fn emit(&mut self, result: &AnalysisResult) -> io::Result<()> {
        self.writer.write_all(text::render(result).as_bytes())?;
        self.writer.flush()
    }
}

/// Writes the markdown summary to a writer.
pub struct MarkdownSink<W> {
    writer: W,
}

impl<W: Write> MarkdownSink<W> {
    /// Create a sink over `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportSink for MarkdownSink<W> {
    fn describe(&self) -> String {
        "markdown".to_string()
    }

    fn emit(&mut self, result: &AnalysisResult) -> io::Result<()> {
        self.writer
            .write_all(markdown::generate_summary(result).as_bytes())?;
        self.writer.flush()
    }
}

/// Writes the result as pretty JSON to a file.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    /// Create a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonSink {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn emit(&mut self, result: &AnalysisResult) -> io::Result<()> {
        report_io::write_result_json(result, &self.path)
    }
}

/// Deliver a result to every sink in order, stopping at the first failure.
pub fn emit_all(result: &AnalysisResult, sinks: &mut [Box<dyn ReportSink>]) -> io::Result<()> {
    for sink in sinks.iter_mut() {
        sink.emit(result)?;
        info!(sink = %sink.describe(), title = %result.title, "Report emitted");
    }
    Ok(())
}
