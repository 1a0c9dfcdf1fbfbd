//! Maps raw provider place records into the stable output schema.
//!
//! A deterministic, total transformation: any well-formed [`Place`] formats
//! without failure, with missing optional fields degrading to documented
//! sentinels. No network or cache access.

use placegrid_places::Place;
use serde::{Deserialize, Serialize};

const NAME_DEFAULT: &str = "Unnamed Place";
const ADDRESS_DEFAULT: &str = "Address not available";
const NOT_AVAILABLE: &str = "Not available";
const HOURS_DEFAULT: &str = "Hours not available";
const BUSINESS_STATUS_DEFAULT: &str = "OPERATIONAL";
const PRIMARY_TYPE_DEFAULT: &str = "Place";

/// A place coordinate; either component may be absent in the raw record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The system's canonical representation of one point of interest.
///
/// Deserialize is derived as well because cached tile entries round-trip
/// through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedPlace {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub location: Coordinate,
    pub rating: Option<f64>,
    pub user_ratings_total: u32,
    pub types: Vec<String>,
    pub phone_number: String,
    pub website: String,
    pub price_level: Option<String>,
    pub business_status: String,
    pub opening_hours: Vec<String>,
    pub current_status: String,
    pub is_open: bool,
    pub primary_type: String,
    pub short_address: String,
    pub has_phone: bool,
}

/// Formats one raw place record, optionally enriched by a supplementary
/// details record fetched separately.
///
/// Resolution rules:
/// - phone: raw national, then raw international, then the same two fields
///   from `details`;
/// - website: `details` first, then raw;
/// - opening hours: the provider's `openNow` flag decides `is_open` and the
///   status label ("Open" / "Check hours" / "Hours not available") — the
///   time-window scan over dated periods is intentionally not used on the
///   serving path;
/// - `primary_type`: first category tag, underscores to spaces, title-cased.
#[must_use]
pub fn format_place(raw: &Place, details: Option<&Place>) -> FormattedPlace {
    let full_address = raw
        .formatted_address
        .clone()
        .unwrap_or_else(|| ADDRESS_DEFAULT.to_string());

    let phone_number = raw
        .national_phone_number
        .clone()
        .or_else(|| raw.international_phone_number.clone())
        .or_else(|| details.and_then(|d| d.national_phone_number.clone()))
        .or_else(|| details.and_then(|d| d.international_phone_number.clone()));
    let has_phone = phone_number.is_some();

    let website = details
        .and_then(|d| d.website_uri.clone())
        .or_else(|| raw.website_uri.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let opening_hours = raw
        .current_opening_hours
        .as_ref()
        .or_else(|| details.and_then(|d| d.current_opening_hours.as_ref()));
    let weekday_texts = opening_hours
        .map(|h| h.weekday_descriptions.clone())
        .unwrap_or_default();
    let open_now = opening_hours.and_then(|h| h.open_now).unwrap_or(false);
    let current_status = if open_now {
        "Open".to_string()
    } else if weekday_texts.is_empty() {
        HOURS_DEFAULT.to_string()
    } else {
        "Check hours".to_string()
    };

    let short_source = raw
        .short_formatted_address
        .as_deref()
        .unwrap_or(&full_address);
    let short_address = short_source
        .split(',')
        .next()
        .unwrap_or(short_source)
        .to_string();

    FormattedPlace {
        place_id: raw.id.clone(),
        name: raw
            .display_name
            .as_ref()
            .and_then(|n| n.text.clone())
            .unwrap_or_else(|| NAME_DEFAULT.to_string()),
        formatted_address: full_address,
        location: Coordinate {
            latitude: raw.location.map(|l| l.latitude),
            longitude: raw.location.map(|l| l.longitude),
        },
        rating: raw.rating,
        user_ratings_total: raw.user_rating_count.unwrap_or(0),
        types: raw.types.clone(),
        phone_number: phone_number.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        website,
        price_level: raw.price_level.clone(),
        business_status: raw
            .business_status
            .clone()
            .unwrap_or_else(|| BUSINESS_STATUS_DEFAULT.to_string()),
        opening_hours: weekday_texts,
        current_status,
        is_open: open_now,
        primary_type: raw
            .types
            .first()
            .map(|t| title_case(&t.replace('_', " ")))
            .unwrap_or_else(|| PRIMARY_TYPE_DEFAULT.to_string()),
        short_address,
        has_phone,
    }
}

/// Uppercases the first letter of every whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_place(id: &str, types: &[&str]) -> Place {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "types": types,
        }))
        .expect("minimal place deserializes")
    }

    fn full_place() -> Place {
        serde_json::from_value(serde_json::json!({
            "id": "ChIJfull",
            "displayName": { "text": "Grand Plaza Hotel" },
            "formattedAddress": "1 Plaza Road, Erode, Tamil Nadu",
            "shortFormattedAddress": "1 Plaza Road, Erode",
            "location": { "latitude": 11.27, "longitude": 77.58 },
            "rating": 4.3,
            "userRatingCount": 812,
            "types": ["lodging", "hotel"],
            "nationalPhoneNumber": "0424 225 0000",
            "internationalPhoneNumber": "+91 424 225 0000",
            "websiteUri": "https://grandplaza.example.com",
            "priceLevel": "PRICE_LEVEL_MODERATE",
            "businessStatus": "OPERATIONAL",
            "currentOpeningHours": {
                "openNow": true,
                "weekdayDescriptions": ["Monday: Open 24 hours"]
            }
        }))
        .expect("full place deserializes")
    }

    #[test]
    fn formatting_is_total_over_a_minimal_record() {
        let place = minimal_place("ChIJmin", &["tourist_attraction"]);
        let formatted = format_place(&place, None);

        assert_eq!(formatted.place_id, "ChIJmin");
        assert_eq!(formatted.name, "Unnamed Place");
        assert_eq!(formatted.formatted_address, "Address not available");
        assert_eq!(formatted.phone_number, "Not available");
        assert!(!formatted.has_phone);
        assert_eq!(formatted.website, "Not available");
        assert_eq!(formatted.business_status, "OPERATIONAL");
        assert!(formatted.opening_hours.is_empty());
        assert_eq!(formatted.current_status, "Hours not available");
        assert!(!formatted.is_open);
        assert_eq!(formatted.primary_type, "Tourist Attraction");
        assert_eq!(formatted.short_address, "Address not available");
        assert_eq!(formatted.user_ratings_total, 0);
        assert_eq!(formatted.location.latitude, None);
    }

    #[test]
    fn no_category_tags_defaults_primary_type_to_place() {
        let place = minimal_place("ChIJnotags", &[]);
        let formatted = format_place(&place, None);
        assert_eq!(formatted.primary_type, "Place");
        assert!(formatted.types.is_empty());
    }

    #[test]
    fn full_record_formats_all_fields() {
        let formatted = format_place(&full_place(), None);
        assert_eq!(formatted.name, "Grand Plaza Hotel");
        assert_eq!(formatted.phone_number, "0424 225 0000");
        assert!(formatted.has_phone);
        assert_eq!(formatted.website, "https://grandplaza.example.com");
        assert_eq!(formatted.short_address, "1 Plaza Road");
        assert_eq!(formatted.primary_type, "Lodging");
        assert!(formatted.is_open);
        assert_eq!(formatted.current_status, "Open");
        assert_eq!(formatted.user_ratings_total, 812);
        assert_eq!(formatted.location.latitude, Some(11.27));
    }

    #[test]
    fn phone_prefers_raw_international_over_details_national() {
        let mut raw = full_place();
        raw.national_phone_number = None;
        let details: Place = serde_json::from_value(serde_json::json!({
            "id": "ChIJfull",
            "nationalPhoneNumber": "0424 999 9999"
        }))
        .expect("details");

        let formatted = format_place(&raw, Some(&details));
        assert_eq!(formatted.phone_number, "+91 424 225 0000");
    }

    #[test]
    fn phone_falls_back_to_details_when_raw_has_none() {
        let raw = minimal_place("ChIJphone", &["lodging"]);
        let details: Place = serde_json::from_value(serde_json::json!({
            "id": "ChIJphone",
            "internationalPhoneNumber": "+91 424 999 9999"
        }))
        .expect("details");

        let formatted = format_place(&raw, Some(&details));
        assert_eq!(formatted.phone_number, "+91 424 999 9999");
        assert!(formatted.has_phone);
    }

    #[test]
    fn website_prefers_details_over_raw() {
        let raw = full_place();
        let details: Place = serde_json::from_value(serde_json::json!({
            "id": "ChIJfull",
            "websiteUri": "https://detail.example.com"
        }))
        .expect("details");

        let formatted = format_place(&raw, Some(&details));
        assert_eq!(formatted.website, "https://detail.example.com");
    }

    #[test]
    fn closed_place_with_hours_says_check_hours() {
        let mut raw = full_place();
        if let Some(hours) = raw.current_opening_hours.as_mut() {
            hours.open_now = Some(false);
        }
        let formatted = format_place(&raw, None);
        assert!(!formatted.is_open);
        assert_eq!(formatted.current_status, "Check hours");
    }

    #[test]
    fn formatted_place_round_trips_through_json() {
        // Cache entries are serialized FormattedPlace lists; the schema must
        // survive a round trip unchanged.
        let formatted = format_place(&full_place(), None);
        let json = serde_json::to_string(&formatted).expect("serialize");
        let back: FormattedPlace = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, formatted);
    }

    #[test]
    fn title_case_handles_multi_word_tags() {
        assert_eq!(title_case("tourist attraction"), "Tourist Attraction");
        assert_eq!(title_case("lodging"), "Lodging");
        assert_eq!(title_case(""), "");
    }
}
