//! CLI arguments

use crate::config::DEFAULT_CONFIG_FILE;
use crate::output::Codec;
use crate::pipeline::Stage;
use clap::Parser;
use std::path::PathBuf;

/// Sparkify data lake ETL
///
/// Loads song metadata and user activity logs into a Parquet star schema.
#[derive(Parser, Debug)]
#[command(name = "sparkify-lake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (INI, `[AWS]` and optional `[PATHS]` sections)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Input base location (overrides `[PATHS] INPUT_DATA`)
    /// Supports: /path, s3a://bucket/path, s3://bucket/path, gs://bucket/path, az://container/path
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output base location (overrides `[PATHS] OUTPUT_DATA`)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Stages to run
    #[arg(short, long, value_enum, default_value_t = Stage::All)]
    pub stage: Stage,

    /// Replace existing output datasets instead of failing
    #[arg(long)]
    pub overwrite: bool,

    /// Parquet compression codec (overrides `[PARQUET] COMPRESSION`)
    #[arg(long, value_enum)]
    pub compression: Option<Codec>,

    /// Render timestamps in UTC instead of the host time zone
    #[arg(long)]
    pub utc: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
