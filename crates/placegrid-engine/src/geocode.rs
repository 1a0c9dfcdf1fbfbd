//! Free-text address resolution: the degenerate single-tile search.
//!
//! One provider text-search with no location bias; the first candidate
//! wins. The suggested search envelope comes from the candidate's viewport
//! when the provider supplies one, otherwise from a fixed-radius fallback.

use placegrid_places::GEOCODE_FIELD_MASK;
use serde::Serialize;

use crate::grid;
use crate::search::SearchEngine;
use crate::SearchError;

/// Clamp range for the viewport-derived equivalent circular area.
pub const MIN_AREA_SIZE_M: f64 = 1000.0;
pub const MAX_AREA_SIZE_M: f64 = 5000.0;

/// Roughly 5 km of latitude, used when the candidate has no viewport.
const FALLBACK_BOUNDS_DEG: f64 = 0.045;
const FALLBACK_AREA_SIZE_M: f64 = 5000.0;

const NOT_FOUND_MSG: &str = "Address geocoding failed or no location found";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoundsCorner {
    pub lat: f64,
    pub lng: f64,
}

/// Suggested bounding box for the search area around a resolved address.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Bounds {
    pub northeast: BoundsCorner,
    pub southwest: BoundsCorner,
}

/// Search-area suggestion the front-end feeds back into the grid search.
#[derive(Debug, Clone, Serialize)]
pub struct AreaInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub grid_size: u32,
    pub overlap: f64,
    pub area_size: f64,
}

/// A resolved free-text address.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAddress {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bounds: Bounds,
    pub area_info: AreaInfo,
}

impl SearchEngine {
    /// Resolves `address` to a coordinate and a suggested search envelope.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty address. `NotFound` when the provider
    /// returns no candidate, the candidate lacks a coordinate, or the
    /// single geocode attempt fails upstream (after the client's bounded
    /// retries) — upstream failures do not escalate past this boundary.
    pub async fn resolve(
        &self,
        address: &str,
        region_code: Option<&str>,
    ) -> Result<ResolvedAddress, SearchError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(SearchError::InvalidInput(
                "address must not be empty".to_string(),
            ));
        }

        let candidates = self
            .client()
            .search_text(address, None, 1, region_code, GEOCODE_FIELD_MASK)
            .await
            .map_err(|err| {
                tracing::warn!(address, error = %err, "geocode lookup failed");
                SearchError::NotFound(NOT_FOUND_MSG.to_string())
            })?;

        let Some(candidate) = candidates.first() else {
            return Err(SearchError::NotFound(NOT_FOUND_MSG.to_string()));
        };
        let Some(location) = candidate.location else {
            return Err(SearchError::NotFound(
                "Failed to obtain coordinates from address".to_string(),
            ));
        };

        let viewport_corners = candidate
            .viewport
            .as_ref()
            .and_then(|v| v.low.zip(v.high));
        let (bounds, area_size) = match viewport_corners {
            Some((low, high)) => {
                let bounds = Bounds {
                    northeast: BoundsCorner {
                        lat: high.latitude,
                        lng: high.longitude,
                    },
                    southwest: BoundsCorner {
                        lat: low.latitude,
                        lng: low.longitude,
                    },
                };
                (bounds, viewport_area_size(low, high, location.latitude))
            }
            None => {
                let bounds = Bounds {
                    northeast: BoundsCorner {
                        lat: location.latitude + FALLBACK_BOUNDS_DEG,
                        lng: location.longitude + FALLBACK_BOUNDS_DEG,
                    },
                    southwest: BoundsCorner {
                        lat: location.latitude - FALLBACK_BOUNDS_DEG,
                        lng: location.longitude - FALLBACK_BOUNDS_DEG,
                    },
                };
                (bounds, FALLBACK_AREA_SIZE_M)
            }
        };

        let formatted_address = candidate
            .formatted_address
            .clone()
            .unwrap_or_else(|| address.to_string());

        Ok(ResolvedAddress {
            latitude: location.latitude,
            longitude: location.longitude,
            bounds,
            area_info: AreaInfo {
                kind: candidate
                    .types
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                name: formatted_address.clone(),
                grid_size: self.policy().default_grid_size,
                overlap: self.policy().default_overlap,
                area_size,
            },
            formatted_address,
        })
    }
}

/// Equivalent circular area radius from the viewport: half the planar
/// diagonal, using the same meters/degree approximation as the grid
/// planner, clamped to a sane city-scale range.
fn viewport_area_size(
    low: placegrid_places::LatLng,
    high: placegrid_places::LatLng,
    center_lat: f64,
) -> f64 {
    let dlat_m = grid::lat_meters(high.latitude - low.latitude);
    let dlng_m = grid::lng_meters(high.longitude - low.longitude, center_lat);
    let diagonal = dlat_m.hypot(dlng_m);
    (diagonal / 2.0).clamp(MIN_AREA_SIZE_M, MAX_AREA_SIZE_M)
}

#[cfg(test)]
mod tests {
    use super::*;
    use placegrid_places::LatLng;

    #[test]
    fn tiny_viewport_clamps_to_minimum() {
        let low = LatLng {
            latitude: 13.0820,
            longitude: 80.2700,
        };
        let high = LatLng {
            latitude: 13.0825,
            longitude: 80.2705,
        };
        let area = viewport_area_size(low, high, 13.0822);
        assert!((area - MIN_AREA_SIZE_M).abs() < f64::EPSILON);
    }

    #[test]
    fn huge_viewport_clamps_to_maximum() {
        let low = LatLng {
            latitude: 12.8,
            longitude: 80.0,
        };
        let high = LatLng {
            latitude: 13.3,
            longitude: 80.5,
        };
        let area = viewport_area_size(low, high, 13.05);
        assert!((area - MAX_AREA_SIZE_M).abs() < f64::EPSILON);
    }

    #[test]
    fn mid_size_viewport_is_half_the_diagonal() {
        // A box ~0.03 degrees on each side is a few kilometers across; the
        // resulting radius must sit strictly inside the clamp range.
        let low = LatLng {
            latitude: 13.00,
            longitude: 80.00,
        };
        let high = LatLng {
            latitude: 13.03,
            longitude: 80.03,
        };
        let area = viewport_area_size(low, high, 13.015);
        assert!(area > MIN_AREA_SIZE_M && area < MAX_AREA_SIZE_M);

        let dlat = grid::lat_meters(0.03);
        let dlng = grid::lng_meters(0.03, 13.015);
        let expected = dlat.hypot(dlng) / 2.0;
        assert!((area - expected).abs() < 1e-9);
    }
}
