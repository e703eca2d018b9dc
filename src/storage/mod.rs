//! Storage module
//!
//! Thin layer over `object_store`. Locations are registered on the query
//! engine's session for reads and writes, and used directly for dataset
//! housekeeping (existence checks, overwrite cleanup, `_SUCCESS` markers).
//!
//! # Overview
//!
//! - `StorageLocation` - a base URL (S3, GCS, Azure or local) with list/put/delete

mod location;

pub use location::StorageLocation;
