//! Places API response types.
//!
//! All types model the JSON structures returned by the Places `searchText`
//! endpoint. Field presence depends on the request's field mask, so every
//! field except the identifier is optional; the identifier itself defaults
//! to an empty string for masks that do not request it (the geocode mask).

use serde::Deserialize;

/// Top-level envelope for a `searchText` response.
///
/// The provider omits the `places` key entirely when a tile has no
/// matches, hence the default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextResponse {
    #[serde(default)]
    pub places: Vec<Place>,
}

/// One point-of-interest record as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub short_formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub national_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub website_uri: Option<String>,
    #[serde(default)]
    pub price_level: Option<String>,
    #[serde(default)]
    pub business_status: Option<String>,
    #[serde(default)]
    pub current_opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

/// A localized string, e.g. a place's display name.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Weekly opening-hours structure. Only the fields the formatter consumes
/// are modelled; dated open/close periods are deliberately not requested.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_descriptions: Vec<String>,
}

/// Geographic viewport for a resolved place, when the provider supplies one.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub low: Option<LatLng>,
    #[serde(default)]
    pub high: Option<LatLng>,
}
