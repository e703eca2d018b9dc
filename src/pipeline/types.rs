//! Pipeline types
//!
//! Stage selection and the reports emitted after each stage.

use crate::output::WriteSummary;
use crate::schema::Table;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Which stages to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Song catalog then event logs
    #[default]
    All,
    /// Song catalog only (`songs`, `artists`)
    Songs,
    /// Event logs only (`users`, `time`, `songplays`)
    Logs,
}

impl Stage {
    /// Whether the song catalog stage runs
    pub fn includes_songs(self) -> bool {
        matches!(self, Stage::All | Stage::Songs)
    }

    /// Whether the event log stage runs
    pub fn includes_logs(self) -> bool {
        matches!(self, Stage::All | Stage::Logs)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::All => "all",
            Stage::Songs => "songs",
            Stage::Logs => "logs",
        };
        f.write_str(name)
    }
}

/// Rows and files written for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    /// Output table
    pub table: Table,
    /// Rows written
    pub rows: usize,
    /// Parquet files written
    pub files: usize,
    /// Partition directories written
    pub partitions: usize,
}

/// Statistics from one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Stage that produced the report
    pub stage: Stage,
    /// Raw source rows read
    pub rows_read: usize,
    /// Tables written, in write order
    pub tables: Vec<TableReport>,
    /// NextSong rows with no catalog match
    pub unmatched_rows: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl StageReport {
    /// Create an empty report
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            rows_read: 0,
            tables: Vec::new(),
            unmatched_rows: 0,
            duration_ms: 0,
        }
    }

    /// Record a table write
    pub fn add_table(&mut self, table: Table, summary: &WriteSummary) {
        self.tables.push(TableReport {
            table,
            rows: summary.rows,
            files: summary.files,
            partitions: summary.partitions,
        });
    }

    /// Rows written for `table`, if it was written by this stage
    pub fn rows_written(&self, table: Table) -> Option<usize> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }

    /// Set duration from start time
    pub fn finish(&mut self, started: Instant) {
        self.duration_ms = started.elapsed().as_millis() as u64;
    }
}

/// Statistics from a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Stage reports in execution order
    pub stages: Vec<StageReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// Rows written for `table` by any stage
    pub fn rows_written(&self, table: Table) -> Option<usize> {
        self.stages.iter().find_map(|s| s.rows_written(table))
    }

    /// Total unmatched NextSong rows
    pub fn unmatched_rows(&self) -> usize {
        self.stages.iter().map(|s| s.unmatched_rows).sum()
    }
}
