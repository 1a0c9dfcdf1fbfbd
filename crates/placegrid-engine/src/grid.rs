//! Pure geometry: decompose a search area into overlapping grid tiles.
//!
//! Meter offsets are converted to degrees with the standard small-angle
//! flat-earth approximation, which is accurate at city scale. No I/O.

use std::str::FromStr;

use crate::SearchError;

/// Mean Earth radius in meters, shared by the grid planner and the
/// geocode viewport estimate.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Upper bound on the grid dimension. A 100x100 plan is already 10 000
/// provider calls per search; anything larger is an input error, not a
/// workload this service will fan out.
pub const MAX_GRID_SIZE: u32 = 100;

/// One cell of the search grid: its indices, center, and search radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Row-major grid indices in `[0, grid_size)`.
    pub i: u32,
    pub j: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

/// Per-tile search radius as a fraction of the inter-tile step.
///
/// One policy applies to every tile of a search and is echoed in the
/// response metadata; mixing fractions across call sites is a defect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RadiusPolicy {
    /// `step / 2`: tiles touch, overlap comes from the grid overlap factor.
    #[default]
    HalfStep,
    /// `0.7 x step`: legacy wide mode with extra cross-tile overlap.
    WideOverlap,
}

impl RadiusPolicy {
    #[must_use]
    pub fn cell_radius_m(self, step_m: f64) -> f64 {
        match self {
            RadiusPolicy::HalfStep => step_m / 2.0,
            RadiusPolicy::WideOverlap => step_m * 0.7,
        }
    }
}

impl FromStr for RadiusPolicy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "half-step" => Ok(RadiusPolicy::HalfStep),
            "wide-overlap" => Ok(RadiusPolicy::WideOverlap),
            other => Err(SearchError::InvalidInput(format!(
                "unknown radius policy '{other}'"
            ))),
        }
    }
}

/// Inter-tile step in meters: `area_radius * (1 - overlap) * 2 / grid_size`.
#[must_use]
pub fn step_meters(area_radius_m: f64, grid_size: u32, overlap: f64) -> f64 {
    area_radius_m * (1.0 - overlap) * 2.0 / f64::from(grid_size)
}

/// Plans the `grid_size x grid_size` tile set around `(center_lat, center_lng)`.
///
/// Tiles are produced deterministically in row-major `(i, j)` order. The
/// centering term uses integer division, so for odd grids the middle tile
/// sits exactly on the query center.
///
/// # Errors
///
/// `InvalidInput` when `grid_size` is outside `[1, MAX_GRID_SIZE]`,
/// `overlap` is outside `[0, 1)`, or the area radius is not a positive
/// finite number.
pub fn plan(
    center_lat: f64,
    center_lng: f64,
    area_radius_m: f64,
    grid_size: u32,
    overlap: f64,
    policy: RadiusPolicy,
) -> Result<Vec<Tile>, SearchError> {
    if grid_size < 1 {
        return Err(SearchError::InvalidInput(
            "grid_size must be at least 1".to_string(),
        ));
    }
    if grid_size > MAX_GRID_SIZE {
        return Err(SearchError::InvalidInput(format!(
            "grid_size must be at most {MAX_GRID_SIZE}"
        )));
    }
    if !(0.0..1.0).contains(&overlap) {
        return Err(SearchError::InvalidInput(
            "overlap must be in [0, 1)".to_string(),
        ));
    }
    if !area_radius_m.is_finite() || area_radius_m <= 0.0 {
        return Err(SearchError::InvalidInput(
            "area_size must be a positive number of meters".to_string(),
        ));
    }

    let step = step_meters(area_radius_m, grid_size, overlap);
    let radius_m = policy.cell_radius_m(step);
    let half = grid_size / 2;

    let mut tiles = Vec::with_capacity(grid_size as usize * grid_size as usize);
    for i in 0..grid_size {
        for j in 0..grid_size {
            let offset_x = step * (f64::from(i) - f64::from(half));
            let offset_y = step * (f64::from(j) - f64::from(half));

            tiles.push(Tile {
                i,
                j,
                latitude: center_lat + lat_degrees(offset_y),
                longitude: center_lng + lng_degrees(offset_x, center_lat),
                radius_m,
            });
        }
    }
    Ok(tiles)
}

/// Meters of northward displacement to degrees of latitude.
#[must_use]
pub fn lat_degrees(d_m: f64) -> f64 {
    (d_m / EARTH_RADIUS_M).to_degrees()
}

/// Meters of eastward displacement to degrees of longitude at `lat0_deg`.
#[must_use]
pub fn lng_degrees(d_m: f64, lat0_deg: f64) -> f64 {
    (d_m / (EARTH_RADIUS_M * lat0_deg.to_radians().cos())).to_degrees()
}

/// Degrees of latitude back to meters — inverse of [`lat_degrees`].
#[must_use]
pub fn lat_meters(deg: f64) -> f64 {
    deg.to_radians() * EARTH_RADIUS_M
}

/// Degrees of longitude back to meters at `lat0_deg` — inverse of
/// [`lng_degrees`].
#[must_use]
pub fn lng_meters(deg: f64, lat0_deg: f64) -> f64 {
    deg.to_radians() * EARTH_RADIUS_M * lat0_deg.to_radians().cos()
}
