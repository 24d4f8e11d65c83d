//! # Place Name Geocoding
//!
//! Resolves a free-form place name ("Los Angeles, CA") to observer coordinates
//! through the OpenStreetMap Nominatim search API. Only the best match is used.

use crate::{LocationError, ObserverLocation};
use log::info;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Public Nominatim search endpoint.
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim's usage policy requires an identifying user agent.
const USER_AGENT: &str = "lunar_observer";

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid geocoder response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("location not found: {0}")]
    NotFound(String),

    #[error("geocoder returned malformed `{0}`")]
    Malformed(&'static str),

    #[error(transparent)]
    OutOfRange(#[from] LocationError),
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub location: ObserverLocation,
    /// Full display address reported by the geocoder
    pub address: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim search client.
#[derive(Debug, Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    search_url: String,
}

impl Geocoder {
    pub fn new(timeout: Duration) -> Result<Self, GeocodeError> {
        Self::with_search_url(NOMINATIM_SEARCH_URL, timeout)
    }

    pub fn with_search_url(search_url: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Geocoder {
            http,
            search_url: search_url.to_string(),
        })
    }

    /// Look up `query` and return the best match.
    pub async fn locate(&self, query: &str) -> Result<Place, GeocodeError> {
        info!("Finding coordinates for {}", query);
        let body = self
            .http
            .get(&self.search_url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_search_response(query, &body)
    }
}

/// Pick the first hit of a Nominatim JSON search response.
///
/// ```
/// use lunar_observer_lib::geocode::parse_search_response;
///
/// let body = r#"[{"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, France"}]"#;
/// let place = parse_search_response("Paris", body).unwrap();
/// assert_eq!(place.location.latitude, 48.8566);
/// assert_eq!(place.address, "Paris, France");
/// ```
pub fn parse_search_response(query: &str, body: &str) -> Result<Place, GeocodeError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)?;
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?;

    let latitude: f64 = hit
        .lat
        .trim()
        .parse()
        .map_err(|_| GeocodeError::Malformed("lat"))?;
    let longitude: f64 = hit
        .lon
        .trim()
        .parse()
        .map_err(|_| GeocodeError::Malformed("lon"))?;

    let address = if hit.display_name.is_empty() {
        query.to_string()
    } else {
        hit.display_name
    };

    Ok(Place {
        location: ObserverLocation::new(latitude, longitude)?,
        address,
    })
}
