//! Markdown output generation for analysis results.
//!
//! This module provides functionality to generate markdown-formatted
//! summaries suitable for pasting into experiment notes.

use crate::result::AnalysisResult;
use std::fmt::Write;

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Generate a markdown summary table from an analysis result.
pub fn generate_summary(result: &AnalysisResult) -> String {
    let mut output = String::new();

    writeln!(output, "# {} summary", result.title).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", result.generated_at.to_rfc3339()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Readings: {}", result.readings).unwrap();
    writeln!(output).unwrap();

    if result.withheld {
        writeln!(output, "## Unrecognized readings").unwrap();
        writeln!(output).unwrap();
        for fields in &result.unrecognized {
            writeln!(output, "- `{}`", fields.join(",")).unwrap();
        }
        writeln!(output).unwrap();
        writeln!(output, "Statistics withheld.").unwrap();
        return output;
    }

    let ranks: Vec<f64> = result
        .series
        .iter()
        .find_map(|s| s.statistics.as_ref())
        .map(|stats| stats.percentiles.iter().map(|p| p.rank).collect())
        .unwrap_or_default();

    write!(output, "| Metric | Key | Unit | Count | Min | Max | Mean | Median | Std |").unwrap();
    for rank in &ranks {
        write!(output, " p{} |", rank).unwrap();
    }
    writeln!(output).unwrap();
    write!(output, "|--------|-----|------|-------|-----|-----|------|--------|-----|").unwrap();
    for _ in &ranks {
        write!(output, "-----|").unwrap();
    }
    writeln!(output).unwrap();

    for series in &result.series {
        let stats = series.statistics.as_ref();
        write!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            series.metric,
            if series.key.is_empty() { "-" } else { series.key.as_str() },
            series.unit,
            series.count,
            cell(stats.map(|s| s.min)),
            cell(stats.map(|s| s.max)),
            cell(stats.map(|s| s.mean)),
            cell(stats.map(|s| s.median)),
            cell(stats.map(|s| s.stddev)),
        )
        .unwrap();
        for rank in &ranks {
            write!(output, " {} |", cell(stats.and_then(|s| s.percentile(*rank)))).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Total series: {}", result.series.len()).unwrap();

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::SeriesSummary;
    use benchlog_core::{Metric, Percentile, SummaryStatistics};
    use chrono::Utc;

    #[test]
    fn test_summary_table() {
        let result = AnalysisResult {
            title: "network".to_string(),
            readings: 2,
            unrecognized: Vec::new(),
            withheld: false,
            series: vec![
                SeriesSummary {
                    metric: Metric::Bandwidth,
                    unit: "Mbit/s".to_string(),
                    key: "2015-10-16".to_string(),
                    count: 2,
                    statistics: Some(SummaryStatistics {
                        count: 2,
                        min: 9000.0,
                        max: 9600.0,
                        mean: 9300.0,
                        median: 9300.0,
                        stddev: 300.0,
                        percentiles: vec![Percentile { rank: 5.0, value: 9030.0 }],
                    }),
                },
                SeriesSummary {
                    metric: Metric::Bandwidth,
                    unit: "Mbit/s".to_string(),
                    key: "2015-10-17".to_string(),
                    count: 0,
                    statistics: None,
                },
            ],
            generated_at: Utc::now(),
        };

        let md = generate_summary(&result);
        assert!(md.starts_with("# network summary\n"));
        assert!(md.contains(" p5 |"));
        assert!(md.contains(
            "| bandwidth | 2015-10-16 | Mbit/s | 2 | 9000.00 | 9600.00 | 9300.00 | 9300.00 | 300.00 | 9030.00 |"
        ));
        assert!(md.contains("| bandwidth | 2015-10-17 | Mbit/s | 0 | - | - | - | - | - | - |"));
        assert!(md.contains("Total series: 2"));
    }

    #[test]
    fn test_withheld_summary() {
        let result = AnalysisResult {
            title: "disk".to_string(),
            readings: 1,
            unrecognized: vec![vec!["r".to_string(), " x".to_string()]],
            withheld: true,
            series: Vec::new(),
            generated_at: Utc::now(),
        };
        let md = generate_summary(&result);
        assert!(md.contains("- `r, x`"));
        assert!(md.contains("Statistics withheld."));
        assert!(!md.contains("| Metric |"));
    }
}
