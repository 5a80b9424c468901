//! Plain-text report, the format printed to a terminal.

use crate::result::{AnalysisResult, SeriesSummary};
use benchlog_core::Metric;
use std::fmt::Write;

fn noun(metric: Metric) -> (&'static str, &'static str) {
    match metric {
        Metric::Read => ("read bandwidth", "reads"),
        Metric::Write => ("write bandwidth", "writes"),
        Metric::Bandwidth => ("network bandwidth", "network bandwidth"),
    }
}

fn write_series(output: &mut String, series: &SeriesSummary) {
    let (single, plural) = noun(series.metric);
    let unit = &series.unit;

    if !series.key.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "[{}] {}", series.key, series.metric).unwrap();
    }

    let Some(stats) = &series.statistics else {
        writeln!(output, "No samples").unwrap();
        return;
    };

    writeln!(output, "Samples: {}", stats.count).unwrap();
    writeln!(output, "Max {}: {} {}", single, stats.max, unit).unwrap();
    writeln!(output, "Min {}: {} {}", single, stats.min, unit).unwrap();
    writeln!(output, "Mean: {:.3} {}", stats.mean, unit).unwrap();
    writeln!(output, "Median: {:.3} {}", stats.median, unit).unwrap();
    writeln!(output, "Std: {:.3} {}", stats.stddev, unit).unwrap();
    if !stats.percentiles.is_empty() {
        writeln!(output, "CDF for {}:", plural).unwrap();
        for p in &stats.percentiles {
            writeln!(output, "{}th percentile: {:.6}", p.rank, p.value).unwrap();
        }
    }
}

/// Render a result as plain text.
///
/// A withheld result lists the unrecognized readings and nothing else.
pub fn render(result: &AnalysisResult) -> String {
    let mut output = String::new();

    if result.withheld {
        writeln!(
            output,
            "Could not recognize these readings: {:?}",
            result.unrecognized
        )
        .unwrap();
        return output;
    }

    writeln!(output, "No. of readings: {}", result.readings).unwrap();
    for series in &result.series {
        write_series(&mut output, series);
    }

    output
}
