//! Environment overrides of file configuration.
//!
//! Kept in its own test binary: the variables are process-wide and would
//! leak into the file-only configuration tests.

use benchlog_core::PipelineConfig;
use std::env;
use std::io::Write;

#[test]
fn test_environment_overrides_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "percentiles = [90.0]\n\n[manifest]\nheader_lines = 1\ndefault_year = 2017\n"
    )
    .unwrap();

    env::set_var("BENCHLOG_PERCENTILES", "5,50");
    env::set_var("BENCHLOG_MANIFEST__DEFAULT_YEAR", "2016");
    let loaded = PipelineConfig::load(Some(file.path()));
    env::remove_var("BENCHLOG_PERCENTILES");
    env::remove_var("BENCHLOG_MANIFEST__DEFAULT_YEAR");

    let config = loaded.unwrap();
    assert_eq!(config.percentiles, vec![5.0, 50.0]);
    assert_eq!(config.manifest.default_year, 2016);
    assert_eq!(config.manifest.header_lines, 1);

    let file_only = PipelineConfig::load(Some(file.path())).unwrap();
    assert_eq!(file_only.percentiles, vec![90.0]);
    assert_eq!(file_only.manifest.default_year, 2017);
}
