//! Error types for the data-lake ETL
//!
//! Every failure is fatal to the stage that raised it. Nothing is retried;
//! errors bubble up to `main`, which logs them and exits non-zero.

use datafusion::error::DataFusionError;
use thiserror::Error;

/// The main error type for the ETL pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Missing required config key: [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Failed to read source '{location}': {message}")]
    SourceReadFailure { location: String, message: String },

    #[error("Schema mismatch: {message}")]
    SchemaMismatch { message: String },

    // ============================================================================
    // Sink Errors
    // ============================================================================
    #[error("Failed to write '{location}': {message}")]
    WriteFailure { location: String, message: String },

    // ============================================================================
    // Library Errors
    // ============================================================================
    #[error("DataFusion error: {0}")]
    DataFusion(DataFusionError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing config key error
    pub fn config_missing(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ConfigMissing {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a source read error
    pub fn source_read(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceReadFailure {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailure {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl From<DataFusionError> for Error {
    fn from(e: DataFusionError) -> Self {
        match e {
            DataFusionError::SchemaError(e, _) => Error::schema(e.to_string()),
            other => Error::DataFusion(other),
        }
    }
}

/// Result type alias for the ETL pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config_missing("AWS", "AWS_ACCESS_KEY_ID");
        assert_eq!(
            err.to_string(),
            "Missing required config key: [AWS] AWS_ACCESS_KEY_ID"
        );

        let err = Error::write("s3://bucket/songs.parquet", "path already exists");
        assert_eq!(
            err.to_string(),
            "Failed to write 's3://bucket/songs.parquet': path already exists"
        );

        let err = Error::schema("missing column 'ts'");
        assert_eq!(err.to_string(), "Schema mismatch: missing column 'ts'");
    }

    #[test]
    fn test_datafusion_schema_error_is_schema_mismatch() {
        let err: Error = DataFusionError::SchemaError(
            datafusion::common::SchemaError::FieldNotFound {
                field: Box::new(datafusion::common::Column::from_name("ts")),
                valid_fields: vec![],
            },
            Box::new(None),
        )
        .into();
        assert!(matches!(err, Error::SchemaMismatch { .. }), "got {err}");

        let err: Error = DataFusionError::Execution("boom".to_string()).into();
        assert!(matches!(err, Error::DataFusion(_)));
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
