//! Song catalog stage: `songs` and `artists`

use super::session::Session;
use super::types::{Stage, StageReport};
use super::{dedup_on, write_table};
use crate::error::Result;
use crate::schema::{song_schema, Table, SONG_DATA_DIR};
use datafusion::dataframe::DataFrame;
use datafusion::prelude::col;
use std::time::Instant;
use tracing::info;

/// Read the raw song catalog below the session input
pub async fn read_song_catalog(session: &Session) -> Result<DataFrame> {
    session.read_json(SONG_DATA_DIR, &song_schema()).await
}

/// Project the songs table, one row per `song_id`
pub fn extract_songs(catalog: DataFrame) -> Result<DataFrame> {
    let songs = catalog.select(vec![
        col("song_id"),
        col("title"),
        col("artist_id"),
        col("year"),
        col("duration"),
    ])?;
    dedup_on(songs, Table::Songs.key())
}

/// Project the artists table, one row per `artist_id`
pub fn extract_artists(catalog: DataFrame) -> Result<DataFrame> {
    let artists = catalog.select(vec![
        col("artist_id"),
        col("artist_name").alias("name"),
        col("artist_location").alias("location"),
        col("artist_latitude").alias("latitude"),
        col("artist_longitude").alias("longitude"),
    ])?;
    dedup_on(artists, Table::Artists.key())
}

/// Run the song catalog stage
pub async fn process_song_data(session: &Session) -> Result<StageReport> {
    let started = Instant::now();
    let mut report = StageReport::new(Stage::Songs);
    info!(input = %session.input().url(), "Processing song data");

    let catalog = read_song_catalog(session).await?;
    report.rows_read = catalog.clone().count().await?;

    let songs = extract_songs(catalog.clone())?;
    write_table(session, Table::Songs, songs, &mut report).await?;

    let artists = extract_artists(catalog)?;
    write_table(session, Table::Artists, artists, &mut report).await?;

    report.finish(started);
    info!(
        rows_read = report.rows_read,
        duration_ms = report.duration_ms,
        "Song data processed"
    );
    Ok(report)
}
