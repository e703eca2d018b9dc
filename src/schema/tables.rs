//! Output tables of the star schema

use serde::Serialize;
use std::fmt;

/// One of the five output datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Song dimension
    Songs,
    /// Artist dimension
    Artists,
    /// User dimension
    Users,
    /// Time dimension
    Time,
    /// Song play facts
    Songplays,
}

impl Table {
    /// Table name
    pub fn name(self) -> &'static str {
        match self {
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Users => "users",
            Table::Time => "time",
            Table::Songplays => "songplays",
        }
    }

    /// Dataset directory below the output base
    pub fn dataset(self) -> String {
        format!("{}.parquet", self.name())
    }

    /// Natural key the table is deduplicated on
    pub fn key(self) -> &'static str {
        match self {
            Table::Songs => "song_id",
            Table::Artists => "artist_id",
            Table::Users => "user_id",
            Table::Time | Table::Songplays => "start_time",
        }
    }

    /// Hive partition columns, outermost first
    pub fn partition_columns(self) -> &'static [&'static str] {
        match self {
            Table::Songs => &["year", "artist_id"],
            Table::Time => &["year", "month"],
            Table::Songplays => &["start_time"],
            Table::Artists | Table::Users => &[],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
