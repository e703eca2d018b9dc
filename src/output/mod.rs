//! Output module
//!
//! Handles partitioned Parquet dataset writes.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Parquet writer options and compression codecs (`ParquetWriterConfig`, `Codec`)
//! - Writing Hive-partitioned datasets to any `StorageLocation` (`DatasetWriter`)
//! - Save modes for existing datasets

mod dataset;
mod writer;

pub use dataset::{DatasetWriter, SaveMode, WriteSummary, SUCCESS_MARKER};
pub use writer::{Codec, ParquetWriterConfig};
