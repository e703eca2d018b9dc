//! Pipeline configuration
//!
//! The credentials file is INI-style:
//!
//! ```text
//! [AWS]
//! AWS_ACCESS_KEY_ID = AKIA...
//! AWS_SECRET_ACCESS_KEY = ...
//!
//! [PATHS]
//! INPUT_DATA = s3a://udacity-dend/
//! OUTPUT_DATA = s3a://jun-data-lake/
//!
//! [PARQUET]
//! COMPRESSION = snappy
//! ```
//!
//! Section and key names are matched case-insensitively. Values are handed
//! to the session explicitly; the process environment is never modified.

use crate::error::{Error, Result};
use crate::output::{Codec, SaveMode};
use configparser::ini::Ini;
use std::fmt;
use std::path::Path;

/// Default credentials file name
pub const DEFAULT_CONFIG_FILE: &str = "dl.cfg";

/// Default input base location
pub const DEFAULT_INPUT: &str = "s3a://udacity-dend/";

/// Default output base location
pub const DEFAULT_OUTPUT: &str = "s3a://jun-data-lake/";

/// Region of the public input bucket, used when none is configured
pub const DEFAULT_REGION: &str = "us-west-2";

// ============================================================================
// Config File
// ============================================================================

/// Parsed INI config file
#[derive(Debug, Clone)]
pub struct ConfigFile {
    ini: Ini,
}

impl ConfigFile {
    /// Read and parse a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Parse config file content
    ///
    /// Both `=` and `:` separate keys from values, and lines starting with
    /// `#` or `;` are comments. Values are taken verbatim, quotes included.
    pub fn parse(content: &str) -> Result<Self> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|e| Error::config(format!("Invalid config file: {e}")))?;
        Ok(Self { ini })
    }

    /// Whether a section is present
    pub fn has_section(&self, section: &str) -> bool {
        self.ini
            .sections()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(section))
    }

    /// Look up a value; empty values count as missing
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key).filter(|v| !v.is_empty())
    }

    /// Look up a value that must be present
    pub fn require(&self, section: &str, key: &str) -> Result<String> {
        self.get(section, key)
            .ok_or_else(|| Error::config_missing(section, key))
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// AWS credentials and endpoint overrides for S3 locations
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Optional region (defaults to [`DEFAULT_REGION`])
    pub region: Option<String>,
    /// Optional custom endpoint (S3-compatible stores)
    pub endpoint: Option<String>,
}

impl Credentials {
    /// Create credentials from a key pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: None,
            endpoint: None,
        }
    }

    /// Read credentials from the `[AWS]` section
    pub fn from_config(file: &ConfigFile) -> Result<Self> {
        Ok(Self {
            access_key_id: file.require("AWS", "AWS_ACCESS_KEY_ID")?,
            secret_access_key: file.require("AWS", "AWS_SECRET_ACCESS_KEY")?,
            region: file.get("AWS", "AWS_REGION"),
            endpoint: file.get("AWS", "AWS_ENDPOINT"),
        })
    }

    /// Configured region, or the region of the public input bucket
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Set the region
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ============================================================================
// Time Zone
// ============================================================================

/// Time zone used to render log timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneMode {
    /// Host local time zone
    #[default]
    Local,
    /// UTC
    Utc,
}

// ============================================================================
// Pipeline Config
// ============================================================================

/// Everything a run needs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Input base location (`s3a://bucket/`, `/local/dir`, ...)
    pub input: String,
    /// Output base location
    pub output: String,
    /// Credentials for S3 locations
    pub credentials: Option<Credentials>,
    /// What to do when an output dataset already exists
    pub save_mode: SaveMode,
    /// Time zone for `start_time` rendering
    pub time_zone: TimeZoneMode,
    /// Parquet compression codec
    pub compression: Codec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            credentials: None,
            save_mode: SaveMode::default(),
            time_zone: TimeZoneMode::default(),
            compression: Codec::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given input and output locations
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    /// Build a config from a parsed config file
    ///
    /// `[AWS]` is optional here; a missing key only becomes an error when an
    /// S3 location is opened.
    pub fn from_config_file(file: &ConfigFile) -> Result<Self> {
        let credentials = if file.has_section("AWS") {
            Some(Credentials::from_config(file)?)
        } else {
            None
        };
        let compression = match file.get("PARQUET", "COMPRESSION") {
            Some(name) => name.parse()?,
            None => Codec::default(),
        };

        Ok(Self {
            input: file
                .get("PATHS", "INPUT_DATA")
                .unwrap_or_else(|| DEFAULT_INPUT.to_string()),
            output: file
                .get("PATHS", "OUTPUT_DATA")
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            credentials,
            compression,
            ..Default::default()
        })
    }

    /// Set credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the save mode
    #[must_use]
    pub fn with_save_mode(mut self, save_mode: SaveMode) -> Self {
        self.save_mode = save_mode;
        self
    }

    /// Set the time zone mode
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: TimeZoneMode) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Set the Parquet compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: Codec) -> Self {
        self.compression = compression;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
# credentials
[AWS]
AWS_ACCESS_KEY_ID = AKIAEXAMPLE
AWS_SECRET_ACCESS_KEY=secret/key

[PATHS]
INPUT_DATA: /data/in/
"#;

    #[test]
    fn test_parse_sections() {
        let file = ConfigFile::parse(SAMPLE).unwrap();
        assert_eq!(
            file.get("AWS", "AWS_ACCESS_KEY_ID").as_deref(),
            Some("AKIAEXAMPLE")
        );
        assert_eq!(
            file.get("AWS", "AWS_SECRET_ACCESS_KEY").as_deref(),
            Some("secret/key")
        );
        assert_eq!(file.get("PATHS", "INPUT_DATA").as_deref(), Some("/data/in/"));
        assert_eq!(file.get("PATHS", "OUTPUT_DATA"), None);
        assert!(file.has_section("AWS"));
        assert!(!file.has_section("PARQUET"));
    }

    #[test]
    fn test_lower_case_keys_are_found() {
        let file =
            ConfigFile::parse("[AWS]\naws_access_key_id = x\naws_secret_access_key = y\n").unwrap();
        let creds = Credentials::from_config(&file).unwrap();
        assert_eq!(creds, Credentials::new("x", "y"));
    }

    #[test]
    fn test_section_names_ignore_case() {
        let file = ConfigFile::parse("[paths]\nOutput_Data = /tmp/out\n").unwrap();
        assert!(file.has_section("PATHS"));
        assert_eq!(file.get("PATHS", "OUTPUT_DATA").as_deref(), Some("/tmp/out"));
    }

    #[test]
    fn test_values_keep_quotes() {
        let file = ConfigFile::parse("[AWS]\nAWS_SECRET_ACCESS_KEY = 'quoted'\n").unwrap();
        assert_eq!(
            file.get("AWS", "AWS_SECRET_ACCESS_KEY").as_deref(),
            Some("'quoted'")
        );
    }

    #[test]
    fn test_credentials_missing_key() {
        let file = ConfigFile::parse("[AWS]\nAWS_ACCESS_KEY_ID = x\n").unwrap();
        let err = Credentials::from_config(&file).unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigMissing { ref key, .. } if key == "AWS_SECRET_ACCESS_KEY"
        ));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let file =
            ConfigFile::parse("[AWS]\nAWS_ACCESS_KEY_ID =\nAWS_SECRET_ACCESS_KEY = s\n").unwrap();
        assert!(Credentials::from_config(&file).is_err());
    }

    #[test]
    fn test_region_defaults_to_input_bucket_region() {
        let creds = Credentials::new("id", "secret");
        assert_eq!(creds.region_or_default(), "us-west-2");
        assert_eq!(creds.with_region("eu-west-1").region_or_default(), "eu-west-1");

        let file = ConfigFile::parse(SAMPLE).unwrap();
        let creds = Credentials::from_config(&file).unwrap();
        assert_eq!(creds.region_or_default(), DEFAULT_REGION);
    }

    #[test]
    fn test_pipeline_config_from_file() {
        let file = ConfigFile::parse(SAMPLE).unwrap();
        let config = PipelineConfig::from_config_file(&file).unwrap();
        assert_eq!(config.input, "/data/in/");
        assert_eq!(config.output, DEFAULT_OUTPUT);
        assert_eq!(
            config.credentials,
            Some(Credentials::new("AKIAEXAMPLE", "secret/key"))
        );
        assert_eq!(config.save_mode, SaveMode::ErrorIfExists);
        assert_eq!(config.compression, Codec::Snappy);
    }

    #[test]
    fn test_pipeline_config_without_aws_section() {
        let file = ConfigFile::parse("[PATHS]\nOUTPUT_DATA = /tmp/out\n").unwrap();
        let config = PipelineConfig::from_config_file(&file).unwrap();
        assert!(config.credentials.is_none());
        assert_eq!(config.output, "/tmp/out");
    }

    #[test]
    fn test_compression_from_file() {
        let file = ConfigFile::parse("[PARQUET]\ncompression = zstd\n").unwrap();
        let config = PipelineConfig::from_config_file(&file).unwrap();
        assert_eq!(config.compression, Codec::Zstd);

        let file = ConfigFile::parse("[PARQUET]\nCOMPRESSION = lzma\n").unwrap();
        let err = PipelineConfig::from_config_file(&file).unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "got {err}");
    }

    #[test]
    fn test_credentials_debug_masks_secret() {
        let creds = Credentials::new("id", "topsecret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("***"));
    }
}
