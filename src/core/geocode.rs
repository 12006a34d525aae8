//! Address → coordinates lookup against a Nominatim-compatible endpoint.
//!
//! Geocoding is best effort: a failed lookup leaves the site without
//! coordinates and tells the user, it never aborts the operation.

use crate::config::GeocodingConfig;
use crate::errors::{AppError, AppResult};
use crate::models::coordinates::Coordinates;
use crate::ui::messages::warning;
use serde::Deserialize;
use std::time::Duration;

pub trait Geocoder {
    /// `Ok(None)` when the service answered but knows no such address.
    fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>>;
}

pub struct NominatimGeocoder {
    agent: ureq::Agent,
    endpoint: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn from_config(cfg: &GeocodingConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_connect(Some(Duration::from_secs(5)))
                .timeout_global(Some(Duration::from_secs(10)))
                .build(),
        );

        Self {
            agent,
            endpoint: cfg.endpoint.clone(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>> {
        let mut resp = self
            .agent
            .get(&self.endpoint)
            .query("q", address)
            .query("format", "json")
            .query("limit", "1")
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        let places: Vec<Place> = resp
            .body_mut()
            .read_json()
            .map_err(|e| AppError::Geocoding(format!("unexpected response: {e}")))?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        let lat = place.lat.parse::<f64>();
        let lon = place.lon.parse::<f64>();

        match (lat, lon) {
            (Ok(lat), Ok(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(AppError::Geocoding(format!(
                "invalid coordinates '{}', '{}'",
                place.lat, place.lon
            ))),
        }
    }
}

/// Resolve an address, turning every failure into `None` plus a warning.
pub fn resolve_coordinates(geocoder: &dyn Geocoder, address: &str) -> Option<Coordinates> {
    if address.trim().is_empty() {
        return None;
    }

    match geocoder.geocode(address) {
        Ok(Some(coords)) => Some(coords),
        Ok(None) => {
            warning(format!(
                "Address '{}' could not be located; coordinates left empty.",
                address
            ));
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, address, "geocoding failed");
            warning(format!(
                "Geocoding failed for '{}' ({}); coordinates left empty.",
                address, e
            ));
            None
        }
    }
}
