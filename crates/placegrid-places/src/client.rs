//! HTTP client for the Places `searchText` endpoint.
//!
//! Builds the provider request (text query, optional circular location
//! bias, result cap, declarative field mask), sends it with the bounded
//! retry policy from [`crate::retry`], and deserializes the response into
//! the typed structs from [`crate::types`]. Transport certificates are
//! always verified; there is no opt-out.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{Place, SearchTextResponse};

const DEFAULT_BASE_URL: &str = "https://places.googleapis.com";
const SEARCH_TEXT_PATH: &str = "v1/places:searchText";

/// Field mask for grid-tile searches: every field the place formatter
/// consumes, so no second details round-trip is needed in steady state.
pub const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.location,places.rating,places.userRatingCount,places.types,\
places.nationalPhoneNumber,places.internationalPhoneNumber,places.websiteUri,\
places.priceLevel,places.businessStatus,places.shortFormattedAddress,\
places.currentOpeningHours";

/// Field mask for address resolution: coordinate, viewport, and address only.
pub const GEOCODE_FIELD_MASK: &str =
    "places.formattedAddress,places.location,places.types,places.viewport";

/// A circular location bias: search near this center, within this radius.
#[derive(Debug, Clone, Copy)]
pub struct CircleBias {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

/// Client for the Places `searchText` API.
///
/// Manages the HTTP client, API key, base URL, and retry budget. Use
/// [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests. Clone-cheap and free of shared
/// mutable state.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_attempts: u32,
    backoff_base_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextSearchRequest<'a> {
    text_query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_bias: Option<LocationBias>,
    max_result_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_code: Option<&'a str>,
}

#[derive(Serialize)]
struct LocationBias {
    circle: Circle,
}

#[derive(Serialize)]
struct Circle {
    center: Center,
    radius: f64,
}

#[derive(Serialize)]
struct Center {
    latitude: f64,
    longitude: f64,
}

impl PlacesClient {
    /// Creates a new client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_attempts: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            max_attempts,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Rejected`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_attempts: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("placegrid/0.1 (grid-tiling-search)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends the endpoint path rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_attempts,
            backoff_base_ms,
        })
    }

    /// Runs one text search against the provider, with bounded retry.
    ///
    /// `query` is used verbatim as the free-text search keyword; `bias`
    /// restricts results to a circle when present (tile searches) and is
    /// omitted for address resolution. `field_mask` declares which place
    /// fields the response must carry.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Rejected`] on a 4xx response — returned after a
    ///   single attempt, never retried.
    /// - [`PlacesError::Http`] on transport failure or 5xx after the retry
    ///   budget is exhausted.
    /// - [`PlacesError::Deserialize`] if the response body does not match
    ///   the expected shape.
    pub async fn search_text(
        &self,
        query: &str,
        bias: Option<&CircleBias>,
        max_results: u32,
        region_code: Option<&str>,
        field_mask: &str,
    ) -> Result<Vec<Place>, PlacesError> {
        retry_with_backoff(self.max_attempts, self.backoff_base_ms, || {
            self.attempt_search(query, bias, max_results, region_code, field_mask)
        })
        .await
    }

    async fn attempt_search(
        &self,
        query: &str,
        bias: Option<&CircleBias>,
        max_results: u32,
        region_code: Option<&str>,
        field_mask: &str,
    ) -> Result<Vec<Place>, PlacesError> {
        let body = TextSearchRequest {
            text_query: query,
            location_bias: bias.map(|b| LocationBias {
                circle: Circle {
                    center: Center {
                        latitude: b.latitude,
                        longitude: b.longitude,
                    },
                    radius: b.radius_m,
                },
            }),
            max_result_count: max_results,
            region_code,
        };

        let url = self.search_url()?;
        let response = self
            .client
            .post(url.clone())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", field_mask)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::Rejected { status, body });
        }
        let response = response.error_for_status()?;

        let text = response.text().await?;
        let parsed: SearchTextResponse =
            serde_json::from_str(&text).map_err(|e| PlacesError::Deserialize {
                context: format!("searchText(query={query})"),
                source: e,
            })?;
        Ok(parsed.places)
    }

    fn search_url(&self) -> Result<Url, PlacesError> {
        self.base_url
            .join(SEARCH_TEXT_PATH)
            .map_err(|e| PlacesError::Rejected {
                status: StatusCode::BAD_REQUEST,
                body: format!("invalid search URL: {e}"),
            })
    }
}
