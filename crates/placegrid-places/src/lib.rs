//! HTTP client for the Google Places `searchText` API.
//!
//! Wraps `reqwest` with typed request/response structs, a declarative field
//! mask, and a bounded retry policy that distinguishes retryable transport
//! and 5xx failures from non-retryable 4xx rejections.

mod client;
mod error;
mod retry;
mod types;

pub use client::{CircleBias, PlacesClient, GEOCODE_FIELD_MASK, SEARCH_FIELD_MASK};
pub use error::PlacesError;
pub use types::{LatLng, LocalizedText, OpeningHours, Place, SearchTextResponse, Viewport};
