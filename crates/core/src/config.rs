// Copyright 2025 Benchlog Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `BENCHLOG_*` environment variables. Nested keys use a double
//! underscore, e.g. `BENCHLOG_MANIFEST__DEFAULT_YEAR=2016`.
//!
//! ```toml
//! delimiter = "comma"
//! percentiles = [5.0, 10.0, 50.0, 90.0, 95.0]
//!
//! [manifest]
//! marker = "*"
//! header_lines = 0
//! default_year = 2015
//!
//! [bandwidth]
//! gbit_factor = 1024.0
//! ```

use crate::bandwidth::BandwidthConfig;
use crate::error::{Error, Result};
use crate::manifest::ManifestConfig;
use crate::record::Delimiter;
use crate::stats::DEFAULT_PERCENTILES;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "BENCHLOG";

/// Complete configuration of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field separator of disk benchmark logs.
    pub delimiter: Delimiter,
    /// Percentiles included in every summary.
    pub percentiles: Vec<f64>,
    /// Manifest reading rules.
    pub manifest: ManifestConfig,
    /// Network unit normalization.
    pub bandwidth: BandwidthConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            manifest: ManifestConfig::default(),
            bandwidth: BandwidthConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from an optional file and the environment, then validate.
    ///
    /// A path that was given explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("percentiles")
                    .try_parsing(true),
            )
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(p) = self
            .percentiles
            .iter()
            .find(|p| !(0.0..=100.0).contains(*p))
        {
            return Err(Error::Config(format!("percentile {p} is outside [0, 100]")));
        }
        if !(self.bandwidth.gbit_factor > 0.0) {
            return Err(Error::Config(format!(
                "bandwidth.gbit_factor must be positive, got {}",
                self.bandwidth.gbit_factor
            )));
        }
        Ok(())
    }
}
