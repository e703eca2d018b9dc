//! Tests for CLI module

use super::*;
use crate::config::{TimeZoneMode, DEFAULT_INPUT, DEFAULT_OUTPUT};
use crate::error::Error;
use crate::output::{Codec, SaveMode};
use crate::pipeline::Stage;
use clap::Parser;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("sparkify-lake").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_defaults() {
    let cli = parse(&[]);
    assert_eq!(cli.config.to_str(), Some("dl.cfg"));
    assert_eq!(cli.input, None);
    assert_eq!(cli.output, None);
    assert_eq!(cli.stage, Stage::All);
    assert_eq!(cli.compression, None);
    assert!(!cli.overwrite && !cli.utc && !cli.verbose);
}

#[test]
fn test_flags() {
    let cli = parse(&[
        "--input",
        "/data/in",
        "-o",
        "/data/out",
        "--stage",
        "logs",
        "--overwrite",
        "--utc",
        "-v",
    ]);
    assert_eq!(cli.input.as_deref(), Some("/data/in"));
    assert_eq!(cli.output.as_deref(), Some("/data/out"));
    assert_eq!(cli.stage, Stage::Logs);
    assert!(cli.overwrite && cli.utc && cli.verbose);
}

#[test]
fn test_compression_flag_overrides_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[PARQUET]\nCOMPRESSION=gzip").unwrap();
    let path = file.path().to_str().unwrap();

    let config = Runner::new(parse(&["--config", path]))
        .pipeline_config()
        .unwrap();
    assert_eq!(config.compression, Codec::Gzip);

    let config = Runner::new(parse(&["--config", path, "--compression", "zstd"]))
        .pipeline_config()
        .unwrap();
    assert_eq!(config.compression, Codec::Zstd);
}

#[test]
fn test_unknown_compression_rejected() {
    assert!(Cli::try_parse_from(["sparkify-lake", "--compression", "lz4"]).is_err());
}

#[test]
fn test_unknown_stage_rejected() {
    assert!(Cli::try_parse_from(["sparkify-lake", "--stage", "users"]).is_err());
}

#[test]
fn test_config_from_file_and_flags() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[AWS]\nAWS_ACCESS_KEY_ID=AKIA\nAWS_SECRET_ACCESS_KEY=secret\n\n[PATHS]\nINPUT_DATA=s3a://in/\nOUTPUT_DATA=s3a://out/"
    )
    .unwrap();
    let path = file.path().to_str().unwrap();

    let runner = Runner::new(parse(&["--config", path, "--output", "/tmp/lake", "--utc"]));
    let config = runner.pipeline_config().unwrap();

    assert_eq!(config.input, "s3a://in/");
    assert_eq!(config.output, "/tmp/lake");
    assert_eq!(config.time_zone, TimeZoneMode::Utc);
    assert_eq!(config.save_mode, SaveMode::ErrorIfExists);
    assert_eq!(
        config.credentials.map(|c| c.access_key_id),
        Some("AKIA".to_string())
    );
}

#[test]
fn test_missing_explicit_config_file() {
    let runner = Runner::new(parse(&["--config", "/nonexistent/dl.cfg"]));
    let err = runner.pipeline_config().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_overwrite_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.cfg");
    std::fs::write(&path, "").unwrap();

    let runner = Runner::new(parse(&[
        "--config",
        path.to_str().unwrap(),
        "--overwrite",
    ]));
    let config = runner.pipeline_config().unwrap();

    assert_eq!(config.save_mode, SaveMode::Overwrite);
    assert_eq!(config.input, DEFAULT_INPUT);
    assert_eq!(config.output, DEFAULT_OUTPUT);
    assert!(config.credentials.is_none());
}
