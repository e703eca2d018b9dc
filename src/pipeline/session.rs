//! Shared run context

use crate::config::{PipelineConfig, TimeZoneMode};
use crate::error::{Error, Result};
use crate::output::{DatasetWriter, ParquetWriterConfig};
use crate::schema::JSON_EXTENSION;
use crate::storage::StorageLocation;
use arrow::datatypes::Schema;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::{NdJsonReadOptions, SessionContext};
use std::fmt;
use tracing::{debug, info};

/// Query session, input and output locations plus write policy, shared by
/// both stages
#[derive(Clone)]
pub struct Session {
    ctx: SessionContext,
    input: StorageLocation,
    output: StorageLocation,
    writer: DatasetWriter,
    time_zone: TimeZoneMode,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("writer", &self.writer)
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

impl Session {
    /// Open the configured locations
    ///
    /// The input must exist; a local output directory is created when
    /// missing. Credentials are taken from `config` only.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let credentials = config.credentials.as_ref();
        let input = StorageLocation::parse(&config.input, credentials)?;
        let output = StorageLocation::parse_or_create(&config.output, credentials)?;

        info!(
            input = %input.url(),
            output = %output.url(),
            save_mode = ?config.save_mode,
            time_zone = ?config.time_zone,
            compression = %config.compression,
            "Session created"
        );

        let writer = DatasetWriter::new(ParquetWriterConfig::new(config.compression))
            .with_save_mode(config.save_mode);
        Ok(Self::from_locations(input, output)
            .with_writer(writer)
            .with_time_zone(config.time_zone))
    }

    /// Build a session over already-opened locations
    pub fn from_locations(input: StorageLocation, output: StorageLocation) -> Self {
        let ctx = SessionContext::new();
        input.register(&ctx);
        output.register(&ctx);
        Self {
            ctx,
            input,
            output,
            writer: DatasetWriter::default(),
            time_zone: TimeZoneMode::default(),
        }
    }

    /// Replace the dataset writer
    #[must_use]
    pub fn with_writer(mut self, writer: DatasetWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Set the time zone used for `start_time`
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: TimeZoneMode) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Query context the locations are registered on
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Input base location
    pub fn input(&self) -> &StorageLocation {
        &self.input
    }

    /// Output base location
    pub fn output(&self) -> &StorageLocation {
        &self.output
    }

    /// Dataset writer
    pub fn writer(&self) -> &DatasetWriter {
        &self.writer
    }

    /// Time zone used for `start_time`
    pub fn time_zone(&self) -> TimeZoneMode {
        self.time_zone
    }

    /// Read every `.json` file below `dir` of the input with a fixed schema
    ///
    /// The records are decoded eagerly and held in memory, so malformed input
    /// fails here as a source error rather than halfway through a write.
    pub async fn read_json(&self, dir: &str, schema: &Schema) -> Result<DataFrame> {
        let url = self.input.url_of(dir);
        let exists = self
            .input
            .has_objects(dir)
            .await
            .map_err(|e| Error::source_read(&url, e.to_string()))?;
        if !exists {
            return Err(Error::source_read(&url, "no source files found"));
        }

        let options = NdJsonReadOptions::default()
            .schema(schema)
            .file_extension(JSON_EXTENSION);
        let frame = self
            .ctx
            .read_json(url.as_str(), options)
            .await
            .map_err(|e| Error::source_read(&url, e.to_string()))?;
        let frame = frame
            .cache()
            .await
            .map_err(|e| Error::source_read(&url, e.to_string()))?;

        debug!(source = %url, "Loaded source records");
        Ok(frame)
    }
}
