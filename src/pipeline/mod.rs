//! Pipeline module
//!
//! The two loading stages and the run loop that sequences them.
//!
//! # Overview
//!
//! - `Session` - query context, input/output locations and write policy
//!   shared by the stages
//! - `process_song_data` - song catalog to `songs` and `artists`
//! - `process_log_data` - event logs to `users`, `time` and `songplays`
//! - `run` - runs the selected stages in order and collects a `RunReport`

mod logs;
mod session;
mod songs;
mod types;

pub use logs::{
    count_unmatched, extract_songplays, extract_time, extract_users, next_song_events,
    process_log_data,
};
pub use session::Session;
pub use songs::{extract_artists, extract_songs, process_song_data, read_song_catalog};
pub use types::{RunReport, Stage, StageReport, TableReport};

use crate::error::{Result, ResultExt};
use crate::schema::Table;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::ident;
use std::time::Instant;
use tracing::info;

/// Run the selected stages, song catalog first
pub async fn run(session: &Session, stage: Stage) -> Result<RunReport> {
    let started = Instant::now();
    let mut report = RunReport::default();
    info!(stage = %stage, "Starting run");

    if stage.includes_songs() {
        report.stages.push(process_song_data(session).await?);
    }
    if stage.includes_logs() {
        report.stages.push(process_log_data(session).await?);
    }

    report.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        stages = report.stages.len(),
        duration_ms = report.duration_ms,
        "Run complete"
    );
    Ok(report)
}

/// Keep one row per `key`
///
/// The kept row is the smallest by `key` and then by every other column in
/// order, so repeated runs over the same input keep the same rows.
fn dedup_on(frame: DataFrame, key: &str) -> Result<DataFrame> {
    let columns: Vec<String> = frame
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let select = columns.iter().map(ident).collect();
    let order = std::iter::once(key)
        .chain(columns.iter().map(String::as_str).filter(|c| *c != key))
        .map(|c| ident(c).sort(true, false))
        .collect();

    Ok(frame.distinct_on(vec![ident(key)], select, Some(order))?)
}

/// Write one table with its partitioning and record it in `report`
async fn write_table(
    session: &Session,
    table: Table,
    frame: DataFrame,
    report: &mut StageReport,
) -> Result<()> {
    let summary = session
        .writer()
        .write(
            session.output(),
            &table.dataset(),
            frame,
            table.partition_columns(),
        )
        .await?;
    report.add_table(table, &summary);
    Ok(())
}

/// Render a report as pretty JSON
pub fn report_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize run report")
}
