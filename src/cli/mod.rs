//! CLI module
//!
//! Command-line interface for running the ETL.
//!
//! # Flags
//!
//! - `--config` - INI config file with `[AWS]` credentials (default `dl.cfg`)
//! - `--input` / `--output` - base locations
//! - `--stage` - `all`, `songs` or `logs`
//! - `--overwrite` - replace existing datasets
//! - `--compression` - Parquet codec: `snappy`, `zstd`, `gzip` or `uncompressed`
//! - `--utc` - render timestamps in UTC

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;

#[cfg(test)]
mod tests;
