use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use reqwest::Client;
use tracing::warn;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

// Embedded Google map URLs carry coordinates in either order.
static LAT_LNG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!3d(-?\d+(?:\.\d+)?)!4d(-?\d+(?:\.\d+)?)").unwrap());
static LNG_LAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!2d(-?\d+(?:\.\d+)?)!3d(-?\d+(?:\.\d+)?)").unwrap());

/// Which address component becomes the city, most specific first.
const CITY_PRIORITY: &[&str] = &[
    "city",
    "town",
    "village",
    "hamlet",
    "state_district",
    "county",
    "state",
];

/// Extract (lat, lng) from a map widget src attribute. The `!3d..!4d..`
/// encoding wins over `!2d..!3d..` when both are present.
pub fn parse_map_coords(src: &str) -> Option<(f64, f64)> {
    if let Some(caps) = LAT_LNG_RE.captures(src) {
        let lat = caps[1].parse().ok()?;
        let lng = caps[2].parse().ok()?;
        return Some((lat, lng));
    }
    if let Some(caps) = LNG_LAT_RE.captures(src) {
        let lng = caps[1].parse().ok()?;
        let lat = caps[2].parse().ok()?;
        return Some((lat, lng));
    }
    None
}

#[derive(Debug, Clone, Default)]
pub struct GeoAddress {
    pub city: Option<String>,
    pub location: Option<String>,
}

/// Reverse-geocode a coordinate pair. Every failure mode logs and returns
/// None; the caller proceeds without location enrichment.
pub async fn reverse_geocode(client: &Client, lat: f64, lng: f64) -> Option<GeoAddress> {
    match try_reverse_geocode(client, lat, lng).await {
        Ok(address) => Some(address),
        Err(e) => {
            warn!("Reverse geocode for ({}, {}) failed: {}", lat, lng, e);
            None
        }
    }
}

async fn try_reverse_geocode(client: &Client, lat: f64, lng: f64) -> Result<GeoAddress> {
    let response = client
        .get(NOMINATIM_URL)
        .query(&[
            ("format", "json".to_string()),
            ("lat", lat.to_string()),
            ("lon", lng.to_string()),
        ])
        .send()
        .await
        .context("Geocode request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("Geocode lookup returned {}", status);
    }

    let body: serde_json::Value = response
        .json()
        .await
        .context("Geocode response was not JSON")?;

    Ok(address_from_response(&body))
}

/// Pick city and location fields out of a reverse-geocode response.
fn address_from_response(body: &serde_json::Value) -> GeoAddress {
    let Some(address) = body.get("address").and_then(|a| a.as_object()) else {
        return GeoAddress::default();
    };

    let city = CITY_PRIORITY
        .iter()
        .find_map(|key| address.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.to_string());

    let location = address
        .get("suburb")
        .or_else(|| address.get("neighbourhood"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    GeoAddress { city, location }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lat_lng_encoding() {
        let src = "https://maps.google.com/maps?pb=!1m14!3d17.4325!4d78.3871!5e0";
        assert_eq!(parse_map_coords(src), Some((17.4325, 78.3871)));
    }

    #[test]
    fn lng_lat_encoding() {
        let src = "https://www.google.com/maps/embed?pb=!1m10!2d77.5946!3d12.9716";
        assert_eq!(parse_map_coords(src), Some((12.9716, 77.5946)));
    }

    #[test]
    fn lat_lng_wins_when_both_match() {
        // !2d..!3d.. also matches inside, but !3d..!4d.. has priority
        let src = "embed?pb=!2d77.5946!3d12.9716!4d78.0001";
        assert_eq!(parse_map_coords(src), Some((12.9716, 78.0001)));
    }

    #[test]
    fn no_coords() {
        assert_eq!(parse_map_coords("https://example.com/contact"), None);
    }

    #[test]
    fn city_priority() {
        let body = serde_json::json!({
            "address": {"state": "Telangana", "town": "Gachibowli", "suburb": "Nanakramguda"}
        });
        let addr = address_from_response(&body);
        assert_eq!(addr.city.as_deref(), Some("Gachibowli"));
        assert_eq!(addr.location.as_deref(), Some("Nanakramguda"));
    }

    #[test]
    fn missing_address_object() {
        let addr = address_from_response(&serde_json::json!({"error": "Unable to geocode"}));
        assert!(addr.city.is_none());
        assert!(addr.location.is_none());
    }
}
