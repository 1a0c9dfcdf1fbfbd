//! The composition root: grid plan, per-tile cache/fetch/format, merge.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use placegrid_places::{CircleBias, PlacesClient, PlacesError, SEARCH_FIELD_MASK};
use serde::Serialize;

use crate::cache::{tile_fingerprint, TileCache};
use crate::format::{format_place, FormattedPlace};
use crate::grid::{self, RadiusPolicy};
use crate::SearchError;

/// Engine-wide policy knobs, set once at startup from configuration.
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    pub radius_policy: RadiusPolicy,
    pub default_category: String,
    pub cache_ttl: Duration,
    /// Grid defaults echoed to the front-end by the geocode endpoint.
    pub default_grid_size: u32,
    pub default_overlap: f64,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            radius_policy: RadiusPolicy::HalfStep,
            default_category: "hotels".to_string(),
            cache_ttl: Duration::from_secs(3600),
            default_grid_size: 3,
            default_overlap: 0.4,
        }
    }
}

/// One search query, fully resolved to numbers by the caller.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub area_size_m: f64,
    pub grid_size: u32,
    pub overlap: f64,
    pub max_results_per_tile: u32,
    /// Soft deadline: tiles not yet visited when it passes are skipped and
    /// the places accumulated so far are returned. Partial results beat
    /// total failure for a best-effort aggregator.
    pub deadline: Option<Instant>,
}

/// Parameters echoed back to the caller in the response metadata.
#[derive(Debug, Clone, Serialize)]
pub struct EchoedParameters {
    pub latitude: f64,
    pub longitude: f64,
    pub area_size_km: f64,
    pub cell_radius_m: f64,
    pub keywords: Vec<String>,
    pub grid_size: u32,
    pub overlap: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMetadata {
    pub total_results: usize,
    pub search_parameters: EchoedParameters,
    pub timestamp: DateTime<Utc>,
}

/// Merged, deduplicated search response: places in first-discovery order
/// plus generation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<FormattedPlace>,
    pub metadata: SearchMetadata,
}

/// Grid-tiling search orchestrator.
///
/// Holds the provider client and the injected tile cache; both are shared
/// across requests and safe for concurrent use.
pub struct SearchEngine {
    client: PlacesClient,
    cache: Arc<dyn TileCache>,
    policy: SearchPolicy,
}

impl SearchEngine {
    #[must_use]
    pub fn new(client: PlacesClient, cache: Arc<dyn TileCache>, policy: SearchPolicy) -> Self {
        Self {
            client,
            cache,
            policy,
        }
    }

    pub(crate) fn client(&self) -> &PlacesClient {
        &self.client
    }

    pub(crate) fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    /// Runs the grid search and merges per-tile results.
    ///
    /// Tiles are visited sequentially in row-major order. For each tile the
    /// cache is consulted first; on a miss the provider is queried and the
    /// newly discovered places (possibly none) are written back under the
    /// tile fingerprint. Duplicate identifiers across tiles resolve
    /// first-write-wins, which keeps results stable across traversal order.
    /// A failing tile is logged and contributes zero places.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for out-of-range coordinates, grid size, or overlap.
    /// Upstream failures never escalate to a request-level error.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchOutcome, SearchError> {
        validate_coordinates(params.latitude, params.longitude)?;

        let category = sanitize_category(
            params.category.as_deref(),
            &self.policy.default_category,
        );
        let tiles = grid::plan(
            params.latitude,
            params.longitude,
            params.area_size_m,
            params.grid_size,
            params.overlap,
            self.policy.radius_policy,
        )?;
        let step = grid::step_meters(params.area_size_m, params.grid_size, params.overlap);

        let mut results: Vec<FormattedPlace> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for tile in &tiles {
            if let Some(deadline) = params.deadline {
                if Instant::now() >= deadline {
                    tracing::warn!(
                        i = tile.i,
                        j = tile.j,
                        collected = results.len(),
                        "search deadline passed; returning partial results"
                    );
                    break;
                }
            }

            let key = tile_fingerprint(
                params.latitude,
                params.longitude,
                params.area_size_m,
                &category,
                &category,
                tile.i,
                tile.j,
            );

            if let Some(cached) = self.cache.get(&key).await {
                tracing::debug!(i = tile.i, j = tile.j, hits = cached.len(), "tile cache hit");
                for place in cached {
                    if seen.insert(place.place_id.clone()) {
                        results.push(place);
                    }
                }
                continue;
            }

            let bias = CircleBias {
                latitude: tile.latitude,
                longitude: tile.longitude,
                radius_m: tile.radius_m,
            };
            let tile_places = match self
                .client
                .search_text(
                    &category,
                    Some(&bias),
                    params.max_results_per_tile,
                    None,
                    SEARCH_FIELD_MASK,
                )
                .await
            {
                Ok(places) => {
                    let mut fresh = Vec::new();
                    for raw in &places {
                        if raw.id.is_empty() || seen.contains(&raw.id) {
                            continue;
                        }
                        let formatted = format_place(raw, None);
                        seen.insert(formatted.place_id.clone());
                        results.push(formatted.clone());
                        fresh.push(formatted);
                    }
                    fresh
                }
                Err(err) => {
                    log_tile_failure(tile.i, tile.j, &err);
                    // A failed tile memoizes as empty so the upstream is not
                    // hammered again for it within the TTL window.
                    Vec::new()
                }
            };
            self.cache.put(&key, tile_places, self.policy.cache_ttl).await;
        }

        Ok(SearchOutcome {
            metadata: SearchMetadata {
                total_results: results.len(),
                search_parameters: EchoedParameters {
                    latitude: params.latitude,
                    longitude: params.longitude,
                    area_size_km: params.area_size_m / 1000.0,
                    cell_radius_m: self.policy.radius_policy.cell_radius_m(step),
                    keywords: vec![category],
                    grid_size: params.grid_size,
                    overlap: params.overlap,
                },
                timestamp: Utc::now(),
            },
            results,
        })
    }

    /// One-result probe against the provider, used by the health endpoint.
    pub async fn probe(&self) -> bool {
        self.client
            .search_text(
                &self.policy.default_category,
                None,
                1,
                None,
                SEARCH_FIELD_MASK,
            )
            .await
            .is_ok()
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), SearchError> {
    if !latitude.is_finite() || latitude.abs() > 90.0 {
        return Err(SearchError::InvalidInput(
            "latitude must be a number in [-90, 90]".to_string(),
        ));
    }
    if !longitude.is_finite() || longitude.abs() > 180.0 {
        return Err(SearchError::InvalidInput(
            "longitude must be a number in [-180, 180]".to_string(),
        ));
    }
    Ok(())
}

/// Trims whitespace and stray `;`/`=` punctuation seen in malformed query
/// strings, falling back to the default category when nothing is left.
#[must_use]
pub fn sanitize_category(raw: Option<&str>, default: &str) -> String {
    let cleaned = raw
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == ';' || c == '=')
        .trim();
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

fn log_tile_failure(i: u32, j: u32, err: &PlacesError) {
    match err {
        // 4xx usually means a request-construction defect; make it loud.
        PlacesError::Rejected { .. } => {
            tracing::error!(i, j, error = %err, "provider rejected tile request; treating tile as empty");
        }
        _ => {
            tracing::warn!(i, j, error = %err, "tile search failed; treating tile as empty");
        }
    }
}
