//! CLI for benchlog.
//!
//! This crate provides the command-line interface for summarizing disk and
//! network benchmark logs, including the `disk`, `network`, `timeline`
//! and `status` subcommands.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod input;

use anyhow::{bail, Context, Result};
use benchlog_core::{
    Delimiter, Ingest, Ingested, Manifest, PipelineConfig, SeriesKey,
};
use benchlog_report::{
    chart_series, emit_all, io as report_io, AnalysisResult, JsonSink, MarkdownSink, ReportSink,
    TextSink,
};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use input::{group_by_node, NodeLogs, RunInput};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Benchlog CLI.
#[derive(Parser, Debug)]
#[command(name = "benchlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML). Environment variables prefixed with
    /// `BENCHLOG_` override its values.
    #[arg(short, long, global = true, env = "BENCHLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Format of log events written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Format of diagnostic logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text on stdout.
    Text,
    /// Markdown table.
    Markdown,
    /// Pretty JSON file.
    Json,
}

/// Field separator override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DelimiterArg {
    /// Comma separated fields.
    Comma,
    /// Whitespace separated fields.
    Whitespace,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Whitespace => Delimiter::Whitespace,
        }
    }
}

/// Grouping used by the `timeline` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// One series per experiment signature.
    Label,
    /// One series per calendar day, gaps included.
    Date,
    /// One series per run timestamp.
    Timestamp,
}

/// Output options shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to this file instead of the default destination.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also export the raw series as JSON for charting.
    #[arg(long)]
    pub series_out: Option<PathBuf>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize disk benchmark logs, one series per operation.
    Disk {
        /// Log files to read.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Field separator override.
        #[arg(short, long, value_enum)]
        delimiter: Option<DelimiterArg>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Summarize disk benchmark runs over time using a run manifest.
    Timeline {
        /// Manifest listing when each run was taken.
        #[arg(short, long)]
        manifest: PathBuf,

        /// How readings are grouped.
        #[arg(short, long, value_enum, default_value_t = GroupBy::Label)]
        group_by: GroupBy,

        /// Runs as RUN=FILE pairs.
        #[arg(required = true)]
        runs: Vec<RunInput>,

        /// Field separator override.
        #[arg(short, long, value_enum)]
        delimiter: Option<DelimiterArg>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Summarize iperf logs; each file contributes its final bandwidth.
    Network {
        /// Log files, or RUN=FILE pairs when a manifest is given.
        #[arg(required = true)]
        inputs: Vec<RunInput>,

        /// Manifest used to group bandwidth by date.
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Sum the logs of each node directory (`result_<rank>/bandwidth_<peer>.log`)
        /// into one total outgoing bandwidth sample per node.
        #[arg(long)]
        per_node: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the effective configuration.
    Status,
}

/// Run the CLI with the process arguments.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);
    execute(cli)
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    // A second initialization (e.g. from tests) keeps the first subscriber.
    let _ = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
}

/// Execute a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Disk {
            files,
            delimiter,
            output,
        } => {
            apply_delimiter(&mut config, delimiter);
            let mut ingest: Ingest<()> = Ingest::from_config(&config);
            for path in &files {
                let found = ingest.ingest_reader(open(path)?, |_| ())?;
                info!(file = %path.display(), readings = found, "Read disk log");
            }
            finish(&config, "disk", ingest.finish(), &output)
        }

        Commands::Timeline {
            manifest,
            group_by,
            runs,
            delimiter,
            output,
        } => {
            apply_delimiter(&mut config, delimiter);
            let manifest = load_manifest(&manifest, &config)?;

            let mut resolved = Vec::with_capacity(runs.len());
            for input in &runs {
                let run_id = input.require_run_id()?;
                resolved.push((manifest.run(run_id)?, input.path.as_path()));
            }

            match group_by {
                GroupBy::Label => {
                    let mut ingest: Ingest<String> = Ingest::from_config(&config);
                    for (run, path) in &resolved {
                        let found = ingest.ingest_run(open(path)?, run, |r| r.signature.clone())?;
                        info!(run = %run.run_id, file = %path.display(), readings = found, "Read run log");
                    }
                    finish(&config, "timeline", ingest.finish(), &output)
                }
                GroupBy::Date => {
                    let mut ingest: Ingest<NaiveDate> = Ingest::from_config(&config);
                    for (run, path) in &resolved {
                        let day = run.timestamp.date();
                        let found = ingest.ingest_run(open(path)?, run, |_| day)?;
                        info!(run = %run.run_id, file = %path.display(), readings = found, "Read run log");
                    }
                    finish(&config, "timeline", ingest.finish_contiguous(), &output)
                }
                GroupBy::Timestamp => {
                    let mut ingest: Ingest<NaiveDateTime> = Ingest::from_config(&config);
                    for (run, path) in &resolved {
                        let found = ingest.ingest_run(open(path)?, run, |_| run.timestamp)?;
                        info!(run = %run.run_id, file = %path.display(), readings = found, "Read run log");
                    }
                    finish(&config, "timeline", ingest.finish(), &output)
                }
            }
        }

        Commands::Network {
            inputs,
            manifest,
            per_node,
            output,
        } => {
            let manifest = manifest
                .map(|path| load_manifest(&path, &config))
                .transpose()?;
            match manifest {
                Some(manifest) => {
                    let mut ingest: Ingest<NaiveDate> = Ingest::from_config(&config);
                    if per_node {
                        for node in group_by_node(&inputs) {
                            let run = manifest.run(node.require_run_id()?)?;
                            ingest_node(&mut ingest, &node, run.timestamp.date())?;
                        }
                    } else {
                        for input in &inputs {
                            let run = manifest.run(input.require_run_id()?)?;
                            let mbits = ingest
                                .ingest_bandwidth(open(&input.path)?, run.timestamp.date())
                                .with_context(|| format!("in {}", input.path.display()))?;
                            info!(run = %run.run_id, file = %input.path.display(), mbits, "Read bandwidth log");
                        }
                    }
                    finish(&config, "network", ingest.finish_contiguous(), &output)
                }
                None => {
                    let mut ingest: Ingest<()> = Ingest::from_config(&config);
                    if per_node {
                        for node in group_by_node(&inputs) {
                            ingest_node(&mut ingest, &node, ())?;
                        }
                    } else {
                        for input in &inputs {
                            let mbits = ingest
                                .ingest_bandwidth(open(&input.path)?, ())
                                .with_context(|| format!("in {}", input.path.display()))?;
                            info!(file = %input.path.display(), mbits, "Read bandwidth log");
                        }
                    }
                    finish(&config, "network", ingest.finish(), &output)
                }
            }
        }

        Commands::Status => {
            use colored::Colorize;

            println!("{}", "Benchlog".bold());
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            match &cli.config {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("Config file: (none, defaults and environment only)"),
            }
            println!();
            println!("{}", "Effective configuration:".bold());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn apply_delimiter(config: &mut PipelineConfig, delimiter: Option<DelimiterArg>) {
    if let Some(delimiter) = delimiter {
        config.delimiter = delimiter.into();
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn ingest_node<K: SeriesKey>(ingest: &mut Ingest<K>, node: &NodeLogs, key: K) -> Result<()> {
    let readers = node
        .files
        .iter()
        .map(|path| open(path))
        .collect::<Result<Vec<_>>>()?;
    let mbits = ingest
        .ingest_node_bandwidth(readers, key)
        .with_context(|| format!("in node {}", node.node.display()))?;
    info!(node = %node.node.display(), peers = node.files.len(), mbits, "Read node bandwidth logs");
    Ok(())
}

fn load_manifest(path: &Path, config: &PipelineConfig) -> Result<Manifest> {
    let manifest = Manifest::parse(open(path)?, &config.manifest)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    info!(manifest = %path.display(), runs = manifest.len(), "Loaded manifest");
    Ok(manifest)
}

fn sinks(title: &str, output: &OutputArgs) -> Result<Vec<Box<dyn ReportSink>>> {
    let sink: Box<dyn ReportSink> = match (output.format, &output.output) {
        (OutputFormat::Text, None) => Box::new(TextSink::stdout()),
        (OutputFormat::Text, Some(path)) => Box::new(TextSink::new(create(path)?)),
        (OutputFormat::Markdown, None) => Box::new(MarkdownSink::new(std::io::stdout())),
        (OutputFormat::Markdown, Some(path)) => Box::new(MarkdownSink::new(create(path)?)),
        (OutputFormat::Json, path) => {
            let path = path
                .clone()
                .unwrap_or_else(|| Path::new(report_io::OUTPUT_DIR).join(format!("{title}.json")));
            Box::new(JsonSink::new(path))
        }
    };
    Ok(vec![sink])
}

fn create(path: &Path) -> Result<File> {
    report_io::ensure_parent_dir(path)?;
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn finish<K: SeriesKey>(
    config: &PipelineConfig,
    title: &str,
    ingested: Ingested<K>,
    output: &OutputArgs,
) -> Result<()> {
    let report = ingested.summarize(&config.percentiles)?;
    let result = AnalysisResult::new(title, &report);

    if let Some(path) = &output.series_out {
        if result.withheld {
            warn!(path = %path.display(), "Skipping series export of untrusted input");
        } else {
            report_io::write_chart_series(&chart_series(&ingested.groups), path)
                .with_context(|| format!("failed to write series to {}", path.display()))?;
        }
    }

    let mut sinks = sinks(title, output)?;
    emit_all(&result, &mut sinks).context("failed to emit report")?;

    if result.withheld {
        bail!(
            "{} reading(s) could not be recognized; statistics withheld",
            result.unrecognized.len()
        );
    }
    Ok(())
}
