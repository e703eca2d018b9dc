//! Dataset writes
//!
//! Layout: `{dataset}/{col}={value}/.../<file>.parquet` plus an empty
//! `{dataset}/_SUCCESS` marker once every file is written. The Parquet files
//! themselves are produced by DataFusion; this layer applies the save mode
//! and records what landed.

use super::writer::ParquetWriterConfig;
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use arrow::array::AsArray;
use arrow::datatypes::{DataType, UInt64Type};
use bytes::Bytes;
use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::logical_expr::{cast, ident};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Marker object written after a successful dataset write
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// What to do when the target dataset already holds objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Fail with `WriteFailure`
    #[default]
    ErrorIfExists,
    /// Delete the existing objects first
    Overwrite,
}

/// Outcome of one dataset write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Data rows written
    pub rows: usize,
    /// Parquet files written
    pub files: usize,
    /// Distinct directories holding Parquet files
    pub partitions: usize,
}

/// Writes one table as a partitioned Parquet dataset
#[derive(Debug, Clone, Default)]
pub struct DatasetWriter {
    config: ParquetWriterConfig,
    save_mode: SaveMode,
}

impl DatasetWriter {
    /// Create a writer with the given Parquet options
    pub fn new(config: ParquetWriterConfig) -> Self {
        Self {
            config,
            save_mode: SaveMode::default(),
        }
    }

    /// Set the save mode
    #[must_use]
    pub fn with_save_mode(mut self, save_mode: SaveMode) -> Self {
        self.save_mode = save_mode;
        self
    }

    /// Write `frame` to `{dataset}` below `location`
    ///
    /// `partition_by` columns are moved from the file payload into the
    /// directory path, rendered as text.
    pub async fn write(
        &self,
        location: &StorageLocation,
        dataset: &str,
        frame: DataFrame,
        partition_by: &[&str],
    ) -> Result<WriteSummary> {
        self.prepare(location, dataset).await?;

        let target = location.url_of(&format!("{dataset}/"));
        let frame = partition_columns_as_text(frame, partition_by)?;
        let options = DataFrameWriteOptions::new()
            .with_partition_by(partition_by.iter().map(|c| (*c).to_string()).collect());
        debug!(
            dataset = %target,
            ?partition_by,
            compression = %self.config.compression(),
            "Writing dataset"
        );

        let counts = frame
            .write_parquet(&target, options, Some(self.config.table_options()))
            .await
            .map_err(|e| Error::write(&target, e.to_string()))?;

        let rows = counts
            .iter()
            .filter_map(|batch| batch.column_by_name("count"))
            .filter_map(|array| array.as_primitive_opt::<UInt64Type>())
            .flat_map(|array| array.iter().flatten())
            .sum::<u64>() as usize;

        let files: Vec<String> = location
            .list(dataset)
            .await?
            .into_iter()
            .filter(|path| path.ends_with(".parquet"))
            .collect();
        let partitions: BTreeSet<&str> = files
            .iter()
            .map(|path| path.rsplit_once('/').map_or("", |(dir, _)| dir))
            .collect();

        location
            .put(&format!("{dataset}/{SUCCESS_MARKER}"), Bytes::new())
            .await?;

        let summary = WriteSummary {
            rows,
            files: files.len(),
            partitions: partitions.len(),
        };
        info!(
            dataset = %target,
            rows = summary.rows,
            files = summary.files,
            partitions = summary.partitions,
            "Wrote dataset"
        );
        Ok(summary)
    }

    /// Apply the save mode to an existing dataset
    async fn prepare(&self, location: &StorageLocation, dataset: &str) -> Result<()> {
        if !location.has_objects(dataset).await? {
            return Ok(());
        }
        match self.save_mode {
            SaveMode::ErrorIfExists => Err(Error::write(
                location.url_of(dataset),
                "path already exists",
            )),
            SaveMode::Overwrite => {
                let removed = location.delete_prefix(dataset).await?;
                info!(dataset = %location.url_of(dataset), removed, "Overwriting dataset");
                Ok(())
            }
        }
    }
}

/// Cast non-text partition columns to `Utf8` so every value renders as a
/// directory name
fn partition_columns_as_text(frame: DataFrame, partition_by: &[&str]) -> Result<DataFrame> {
    let mut frame = frame;
    for name in partition_by {
        let data_type = frame
            .schema()
            .field_with_unqualified_name(name)?
            .data_type()
            .clone();
        if data_type != DataType::Utf8 {
            frame = frame.with_column(name, cast(ident(*name), DataType::Utf8))?;
        }
    }
    Ok(frame)
}
