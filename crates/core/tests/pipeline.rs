//! Manifest, ingest and summary working together on file-backed logs.

use benchlog_core::manifest::ManifestConfig;
use benchlog_core::{Error, Ingest, Manifest, Metric, PipelineConfig};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use tempfile::tempdir;

#[test]
fn test_daily_throughput_from_manifest() {
    let dir = tempdir().unwrap();
    let manifest_path = dir.path().join("README.md");
    fs::write(
        &manifest_path,
        "# Runs\n\n* 1 -- 9/10 -- 9am\n* 2 -- 9/12 -- 1pm\n* 3 -- 9/12 -- 11pm\n",
    )
    .unwrap();

    let config = PipelineConfig::default();
    let manifest = Manifest::parse(BufReader::new(File::open(&manifest_path).unwrap()), &config.manifest).unwrap();

    let logs = [
        ("1", "r, a, s, 1048576, 15, 1, 410.0\nw, a, s, 1048576, 15, 1, 390.0\n"),
        ("2", "r, a, s, 1048576, 15, 1, 420.0\n"),
        ("3", "r, a, s, 1048576, 15, 1, 430.0\nw, a, s, 1048576, 15, 1, 380.0\n"),
    ];

    let mut ingest: Ingest<NaiveDate> = Ingest::from_config(&config);
    for (run_id, content) in logs {
        let path = dir.path().join(format!("log_{run_id}.txt"));
        fs::write(&path, content).unwrap();
        let day = manifest.resolve(run_id).unwrap().date();
        ingest
            .ingest_reader(BufReader::new(File::open(&path).unwrap()), |_| day)
            .unwrap();
    }

    let ingested = ingest.finish_contiguous();
    let report = ingested.summarize(&config.percentiles).unwrap();
    assert_eq!(report.readings, 5);

    let reads: Vec<_> = report.series.iter().filter(|s| s.metric == Metric::Read).collect();
    let days: Vec<String> = reads.iter().map(|s| s.key.format("%m/%d").to_string()).collect();
    assert_eq!(days, vec!["09/10", "09/11", "09/12"]);
    assert!(reads[1].statistics.is_none());
    assert_eq!(reads[2].statistics.as_ref().unwrap().mean, 425.0);

    let writes: Vec<_> = report.series.iter().filter(|s| s.metric == Metric::Write).collect();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[2].statistics.as_ref().unwrap().max, 380.0);
}

#[test]
fn test_manifest_header_by_count() {
    let config = ManifestConfig {
        header_lines: 2,
        default_year: 2016,
        ..Default::default()
    };
    let text = "* Runs\n* ====\n* 4 -- 1/15 -- 12pm\n";
    let manifest = Manifest::parse(Cursor::new(text), &config).unwrap();
    let ts = manifest.resolve("4").unwrap();
    assert_eq!(ts, NaiveDate::from_ymd_opt(2016, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap());

    let err = Manifest::parse(Cursor::new(text), &ManifestConfig::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedManifestLine { line: 1, .. }));
}

#[test]
fn test_summaries_are_repeatable() {
    let config = PipelineConfig::default();
    let mut ingest = Ingest::from_config(&config);
    ingest
        .ingest_reader(Cursor::new("r, x, 3\nr, x, 1\nr, x, 2\n"), |r| r.signature.clone())
        .unwrap();
    let ingested = ingest.finish();

    let first = ingested.summarize(&config.percentiles).unwrap();
    let second = ingested.summarize(&config.percentiles).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.series[0].statistics.as_ref().unwrap().median, 2.0);
}
