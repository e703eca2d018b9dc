//! CLI runner - executes a run

use crate::cli::commands::Cli;
use crate::config::{ConfigFile, PipelineConfig, TimeZoneMode, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result, ResultExt};
use crate::output::SaveMode;
use crate::pipeline::{self, RunReport, Session};
use std::path::Path;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected stages and print the report
    pub async fn run(&self) -> Result<()> {
        let config = self.pipeline_config()?;
        let session = Session::new(&config)?;
        let report = pipeline::run(&session, self.cli.stage).await?;
        self.output_report(&report)
    }

    /// Build the pipeline config from the config file and flags
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match self.load_config_file()? {
            Some(file) => PipelineConfig::from_config_file(&file)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.cli.input {
            config.input.clone_from(input);
        }
        if let Some(output) = &self.cli.output {
            config.output.clone_from(output);
        }
        if self.cli.overwrite {
            config = config.with_save_mode(SaveMode::Overwrite);
        }
        if let Some(codec) = self.cli.compression {
            config = config.with_compression(codec);
        }
        if self.cli.utc {
            config = config.with_time_zone(TimeZoneMode::Utc);
        }

        debug!(?config, "Resolved pipeline config");
        Ok(config)
    }

    /// Load the config file
    ///
    /// A missing default file is tolerated so local runs need no credentials;
    /// an explicitly named file must exist.
    fn load_config_file(&self) -> Result<Option<ConfigFile>> {
        let path = self.cli.config.as_path();
        if !path.exists() {
            if path == Path::new(DEFAULT_CONFIG_FILE) {
                info!(path = %path.display(), "No config file, continuing without credentials");
                return Ok(None);
            }
            return Err(Error::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        ConfigFile::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))
            .map(Some)
    }

    /// Print the run report as JSON
    fn output_report(&self, report: &RunReport) -> Result<()> {
        println!("{}", pipeline::report_json(report)?);
        Ok(())
    }
}
