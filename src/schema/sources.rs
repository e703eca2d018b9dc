//! Arrow schemas of the raw JSON sources

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::{Arc, LazyLock};

/// Directory of song metadata files below the input base
/// (`song_data/<A>/<B>/<C>/<track>.json`)
pub const SONG_DATA_DIR: &str = "song_data/";

/// Directory of activity log files below the input base
/// (`log_data/<year>/<month>/<date>-events.json`)
pub const LOG_DATA_DIR: &str = "log_data/";

/// Extension of source files; anything else below the data directories is
/// ignored
pub const JSON_EXTENSION: &str = ".json";

/// Page value marking a song play event
pub const NEXT_SONG_PAGE: &str = "NextSong";

static SONG_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("num_songs", DataType::Int64, true),
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("artist_latitude", DataType::Float64, true),
        Field::new("artist_longitude", DataType::Float64, true),
        Field::new("artist_location", DataType::Utf8, true),
        Field::new("artist_name", DataType::Utf8, true),
        Field::new("song_id", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("duration", DataType::Float64, true),
        Field::new("year", DataType::Int64, true),
    ]))
});

static LOG_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("artist", DataType::Utf8, true),
        Field::new("auth", DataType::Utf8, true),
        Field::new("firstName", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("itemInSession", DataType::Int64, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("length", DataType::Float64, true),
        Field::new("level", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("method", DataType::Utf8, true),
        Field::new("page", DataType::Utf8, true),
        Field::new("registration", DataType::Float64, true),
        Field::new("sessionId", DataType::Int64, true),
        Field::new("song", DataType::Utf8, true),
        Field::new("status", DataType::Int64, true),
        Field::new("ts", DataType::Int64, true),
        Field::new("userAgent", DataType::Utf8, true),
        Field::new("userId", DataType::Utf8, true),
    ]))
});

/// Schema of one song metadata record
pub fn song_schema() -> SchemaRef {
    Arc::clone(&SONG_SCHEMA)
}

/// Schema of one activity log record
///
/// `userId` is textual in the source (empty for logged-out events).
pub fn log_schema() -> SchemaRef {
    Arc::clone(&LOG_SCHEMA)
}
