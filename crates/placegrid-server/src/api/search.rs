use std::str::FromStr;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use placegrid_engine::{SearchOutcome, SearchParams};

use super::{map_search_error, require_engine, ApiError, AppState};
use crate::middleware::RequestId;

/// Raw query string, parsed by hand so malformed numbers produce the
/// shared error envelope instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    latitude: Option<String>,
    longitude: Option<String>,
    address: Option<String>,
    category: Option<String>,
    area_size: Option<String>,
    grid_size: Option<String>,
    overlap: Option<String>,
}

enum Center {
    Point { latitude: f64, longitude: f64 },
    Address(String),
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let rid = req_id.0;
    let defaults = &state.defaults;

    let grid_size: u32 = parse_or(&rid, "grid_size", query.grid_size.as_deref(), defaults.grid_size)?;
    let overlap: f64 = parse_or(&rid, "overlap", query.overlap.as_deref(), defaults.overlap)?;
    let area_size: Option<f64> = query
        .area_size
        .as_deref()
        .map(|raw| parse_required(&rid, "area_size", raw))
        .transpose()?;

    let lat_raw = query.latitude.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let lng_raw = query.longitude.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let address = query.address.as_deref().map(str::trim).filter(|s| !s.is_empty());

    // Explicit coordinates win; the address is only resolved when the
    // coordinate pair is incomplete.
    let center = if let (Some(lat), Some(lng)) = (lat_raw, lng_raw) {
        Center::Point {
            latitude: parse_required(&rid, "latitude", lat)?,
            longitude: parse_required(&rid, "longitude", lng)?,
        }
    } else if let Some(address) = address {
        Center::Address(address.to_owned())
    } else {
        Center::Point {
            latitude: parse_required(&rid, "latitude", required(&rid, "latitude", lat_raw)?)?,
            longitude: parse_required(&rid, "longitude", required(&rid, "longitude", lng_raw)?)?,
        }
    };

    let engine = require_engine(&state, &rid)?;

    let (latitude, longitude, area_size_m) = match center {
        Center::Point {
            latitude,
            longitude,
        } => (latitude, longitude, area_size.unwrap_or(defaults.area_size_m)),
        Center::Address(address) => {
            let resolved = engine
                .resolve(&address, Some(&defaults.region_code))
                .await
                .map_err(|e| map_search_error(rid.clone(), &e))?;
            // An explicit area_size beats the resolver's suggestion.
            let area = area_size.unwrap_or(resolved.area_info.area_size);
            (resolved.latitude, resolved.longitude, area)
        }
    };

    let params = SearchParams {
        latitude,
        longitude,
        category: query.category,
        area_size_m,
        grid_size,
        overlap,
        max_results_per_tile: defaults.max_results_per_tile,
        deadline: None,
    };

    let outcome = engine
        .search(&params)
        .await
        .map_err(|e| map_search_error(rid.clone(), &e))?;
    Ok(Json(outcome))
}

fn required<'a>(rid: &str, name: &str, raw: Option<&'a str>) -> Result<&'a str, ApiError> {
    raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        ApiError::new(
            rid.to_owned(),
            "bad_request",
            format!("query parameter '{name}' is required (or pass 'address')"),
        )
    })
}

fn parse_required<T: FromStr>(rid: &str, name: &str, raw: &str) -> Result<T, ApiError> {
    raw.trim().parse().map_err(|_| {
        ApiError::new(
            rid.to_owned(),
            "bad_request",
            format!("query parameter '{name}' is not a valid number: '{raw}'"),
        )
    })
}

fn parse_or<T: FromStr>(
    rid: &str,
    name: &str,
    raw: Option<&str>,
    default: T,
) -> Result<T, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_required(rid, name, raw),
        None => Ok(default),
    }
}
