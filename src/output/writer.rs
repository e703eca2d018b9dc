//! Parquet writer options
//!
//! Translated into DataFusion's `TableParquetOptions` for every dataset write.

use crate::error::{Error, Result};
use datafusion::config::TableParquetOptions;
use parquet::basic::{GzipLevel, ZstdLevel};
use std::fmt;
use std::str::FromStr;

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Codec {
    /// Snappy (the Spark default)
    #[default]
    Snappy,
    /// Zstandard at its default level
    Zstd,
    /// Gzip at its default level
    Gzip,
    /// No compression
    Uncompressed,
}

impl Codec {
    /// Codec string understood by DataFusion
    fn option(self) -> String {
        match self {
            Codec::Snappy => "snappy".to_string(),
            Codec::Zstd => format!("zstd({})", ZstdLevel::default().compression_level()),
            Codec::Gzip => format!("gzip({})", GzipLevel::default().compression_level()),
            Codec::Uncompressed => "uncompressed".to_string(),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Codec::Snappy => "snappy",
            Codec::Zstd => "zstd",
            Codec::Gzip => "gzip",
            Codec::Uncompressed => "uncompressed",
        };
        f.write_str(name)
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <Codec as clap::ValueEnum>::from_str(s.trim(), true).map_err(|_| {
            Error::config(format!(
                "Unknown compression '{s}', valid values: snappy, zstd, gzip, uncompressed"
            ))
        })
    }
}

/// Configuration for Parquet writer
#[derive(Debug, Clone, Default)]
pub struct ParquetWriterConfig {
    compression: Codec,
}

impl ParquetWriterConfig {
    /// Create a config with the given codec
    pub fn new(compression: Codec) -> Self {
        Self { compression }
    }

    /// Compression codec
    pub fn compression(&self) -> Codec {
        self.compression
    }

    /// Options handed to `DataFrame::write_parquet`
    pub fn table_options(&self) -> TableParquetOptions {
        let mut options = TableParquetOptions::default();
        options.global.compression = Some(self.compression.option());
        options.global.created_by = format!("{} {}", crate::NAME, crate::VERSION);
        options
    }
}
