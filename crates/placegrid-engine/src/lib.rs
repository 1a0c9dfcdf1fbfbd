//! Grid-tiling search-and-merge engine.
//!
//! Turns one (latitude, longitude, category) query into a deduplicated list
//! of points-of-interest: [`grid`] tiles the surrounding area into
//! overlapping sub-regions, [`search`] issues one provider text-search per
//! tile (memoized through [`cache`]), [`format`] maps raw provider records
//! into the stable output schema, and [`geocode`] resolves free-text
//! addresses into a coordinate plus a suggested search envelope.

mod error;

pub mod cache;
pub mod format;
pub mod geocode;
pub mod grid;
pub mod search;

pub use error::SearchError;
pub use search::{SearchEngine, SearchOutcome, SearchParams, SearchPolicy};
