//! Schema module
//!
//! Fixed Arrow schemas of the raw JSON sources and the layout policy of the
//! output star schema (dataset names, natural keys, partition columns).

mod sources;
mod tables;

pub use sources::{
    log_schema, song_schema, JSON_EXTENSION, LOG_DATA_DIR, NEXT_SONG_PAGE, SONG_DATA_DIR,
};
pub use tables::Table;
