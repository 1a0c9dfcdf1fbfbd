use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use placegrid_engine::geocode::{AreaInfo, Bounds, ResolvedAddress};

use super::{map_search_error, require_engine, ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    address: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeocodeResponse {
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Serialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
    area_info: AreaInfo,
}

#[derive(Debug, Serialize)]
struct Geometry {
    location: LocationPoint,
    bounds: Bounds,
}

#[derive(Debug, Serialize)]
struct LocationPoint {
    lat: f64,
    lng: f64,
}

pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let rid = req_id.0;

    let Some(address) = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Err(ApiError::new(
            rid,
            "bad_request",
            "query parameter 'address' is required",
        ));
    };

    let engine = require_engine(&state, &rid)?;
    let region = query
        .region
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&state.defaults.region_code);

    let resolved = engine
        .resolve(address, Some(region))
        .await
        .map_err(|e| map_search_error(rid.clone(), &e))?;

    Ok(Json(GeocodeResponse {
        results: vec![into_result(resolved)],
    }))
}

fn into_result(resolved: ResolvedAddress) -> GeocodeResult {
    GeocodeResult {
        formatted_address: resolved.formatted_address,
        geometry: Geometry {
            location: LocationPoint {
                lat: resolved.latitude,
                lng: resolved.longitude,
            },
            bounds: resolved.bounds,
        },
        area_info: resolved.area_info,
    }
}
