//! Event log stage: `users`, `time` and `songplays`

use super::session::Session;
use super::songs::read_song_catalog;
use super::types::{Stage, StageReport};
use super::{dedup_on, write_table};
use crate::config::TimeZoneMode;
use crate::error::Result;
use crate::schema::{log_schema, Table, LOG_DATA_DIR, NEXT_SONG_PAGE};
use crate::timestamp;
use arrow::datatypes::DataType;
use datafusion::dataframe::DataFrame;
use datafusion::functions_window::expr_fn::row_number;
use datafusion::logical_expr::{cast, when, Expr, ExprFunctionExt, JoinType, Partitioning};
use datafusion::prelude::{abs, col, ident, lit};
use std::time::Instant;
use tracing::{info, warn};

/// Log columns matched against catalog columns, pairwise
const LOG_JOIN_KEYS: [&str; 3] = ["song", "artist", "length"];
const CATALOG_JOIN_KEYS: [&str; 3] = ["title", "artist_name", "duration"];

/// Keep NextSong events and append their rendered `start_time`
pub fn next_song_events(logs: DataFrame, time_zone: TimeZoneMode) -> Result<DataFrame> {
    let events = logs
        .filter(col("page").eq(lit(NEXT_SONG_PAGE)))?
        .with_column("start_time", timestamp::start_time_expr("ts", time_zone))?;
    Ok(events)
}

/// Project the users table, one row per `user_id`
pub fn extract_users(events: DataFrame) -> Result<DataFrame> {
    let users = events.select(vec![
        ident("userId").alias("user_id"),
        ident("firstName").alias("first_name"),
        ident("lastName").alias("last_name"),
        col("gender"),
        col("level"),
    ])?;
    dedup_on(users, Table::Users.key())
}

/// Project the time table, one row per `start_time`
pub fn extract_time(events: DataFrame) -> Result<DataFrame> {
    let starts = events.select(vec![col("start_time")])?.distinct()?;

    let start_time = col("start_time");
    let mut columns = vec![start_time.clone()];
    columns.extend(
        timestamp::calendar_exprs(&start_time)
            .into_iter()
            .map(|(name, expr)| expr.alias(name)),
    );
    Ok(starts.select(columns)?)
}

/// Fold `-0.0` into `0.0`
///
/// Float join keys are hashed and compared by bit pattern.
fn zero_normalized(value: Expr) -> Result<Expr> {
    Ok(when(abs(value.clone()).eq(lit(0.0f64)), lit(0.0f64)).otherwise(value)?)
}

/// Event columns used to resolve a play, with `length` normalized
fn event_keys(events: DataFrame) -> Result<DataFrame> {
    Ok(events.with_column("length", zero_normalized(col("length"))?)?)
}

/// Catalog columns needed to resolve a play
fn catalog_keys(catalog: DataFrame) -> Result<DataFrame> {
    Ok(catalog.select(vec![
        col("title"),
        col("artist_name"),
        zero_normalized(col("duration"))?.alias("duration"),
        col("song_id"),
        col("artist_id"),
    ])?)
}

/// Join events to the song catalog and project the songplay facts
///
/// `songplay_id` numbers the join output from 0 in event order; rows dropped
/// afterwards leave gaps.
pub fn extract_songplays(events: DataFrame, catalog: DataFrame) -> Result<DataFrame> {
    let joined = event_keys(events)?.join(
        catalog_keys(catalog)?,
        JoinType::Inner,
        &LOG_JOIN_KEYS,
        &CATALOG_JOIN_KEYS,
        None,
    )?;

    let play_order = row_number()
        .order_by(vec![
            col("ts").sort(true, false),
            ident("sessionId").sort(true, false),
            ident("itemInSession").sort(true, false),
            col("song_id").sort(true, false),
        ])
        .build()?;
    let numbered = joined.with_column("songplay_id", play_order)?;

    let songplays = numbered
        .select(vec![
            (cast(col("songplay_id"), DataType::Int64) - lit(1i64)).alias("songplay_id"),
            col("start_time"),
            ident("userId").alias("user_id"),
            col("level"),
            col("song_id"),
            col("artist_id"),
            ident("sessionId").alias("session_id"),
            col("location"),
            ident("userAgent").alias("user_agent"),
        ])?
        .filter(col("user_id").is_not_null().and(col("user_id").not_eq(lit(""))))?;
    dedup_on(songplays, Table::Songplays.key())
}

/// NextSong events that match no catalog song
pub async fn count_unmatched(events: DataFrame, catalog: DataFrame) -> Result<usize> {
    let unmatched = event_keys(events)?.join(
        catalog_keys(catalog)?,
        JoinType::LeftAnti,
        &LOG_JOIN_KEYS,
        &CATALOG_JOIN_KEYS,
        None,
    )?;
    Ok(unmatched.count().await?)
}

/// Run the event log stage
///
/// The song catalog is re-read here so the stage can run on its own.
pub async fn process_log_data(session: &Session) -> Result<StageReport> {
    let started = Instant::now();
    let mut report = StageReport::new(Stage::Logs);
    info!(input = %session.input().url(), "Processing log data");

    let logs = session.read_json(LOG_DATA_DIR, &log_schema()).await?;
    report.rows_read = logs.clone().count().await?;

    let events = next_song_events(logs, session.time_zone())?;
    let event_count = events.clone().count().await?;
    info!(
        events = event_count,
        skipped = report.rows_read - event_count,
        "Filtered NextSong events"
    );

    let users = extract_users(events.clone())?;
    write_table(session, Table::Users, users, &mut report).await?;

    let time = extract_time(events.clone())?;
    write_table(session, Table::Time, time, &mut report).await?;

    let catalog = read_song_catalog(session).await?;
    report.unmatched_rows = count_unmatched(events.clone(), catalog.clone()).await?;
    if report.unmatched_rows > 0 {
        warn!(
            unmatched = report.unmatched_rows,
            events = event_count,
            "NextSong events without a catalog match"
        );
    }

    let songplays = extract_songplays(events, catalog)?;
    let start_time = col("start_time");
    let songplays = songplays.repartition(Partitioning::Hash(
        timestamp::year_month_exprs(&start_time),
        session.context().copied_config().target_partitions(),
    ))?;
    write_table(session, Table::Songplays, songplays, &mut report).await?;

    report.finish(started);
    info!(
        rows_read = report.rows_read,
        unmatched = report.unmatched_rows,
        duration_ms = report.duration_ms,
        "Log data processed"
    );
    Ok(report)
}
