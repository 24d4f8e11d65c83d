//! # Astronomy API Ephemeris Fetching
//!
//! This module handles all network operations for fetching the Moon's position and
//! phase from the AstronomyAPI service, and validates the response into a strongly
//! typed [`RawEphemeris`] before anything reaches the computational core.
//!
//! ## Data Source
//!
//! ### AstronomyAPI positions endpoint
//! - **URL**: `{base_url}bodies/positions/moon`
//! - **Auth**: HTTP basic auth with application ID and secret
//! - **Query**: observer latitude/longitude, elevation 0, the moment's date and time
//! - **Format**: JSON; numeric values may arrive as numbers or numeric strings
//!
//! ### Data Processing Pipeline
//! 1. **Cache**: [`fetch_cached`] checks [`EphemerisCache`] first
//! 2. **Fetch**: HTTP GET with a whole-request timeout
//! 3. **Parse**: [`parse_positions_response`] maps the typed schema to [`RawEphemeris`]
//! 4. **Validate**: absent or malformed fields become [`EphemerisError::IncompleteInput`]
//!
//! ## Error Handling
//!
//! - **Network failures**: connection, TLS and timeout errors surface as `Http`
//! - **Server errors**: any non-2xx status surfaces as `Status`
//! - **Body errors**: non-JSON bodies surface as `Decode`
//! - **Data contract**: a missing field names its JSON path in `IncompleteInput`
//!
//! No retry loop: callers decide what to do on failure.

use crate::cache::{CacheKey, EphemerisCache};
use crate::calendar::Moment;
use crate::config::ApiConfig;
use crate::{ObserverLocation, RawEphemeris};
use chrono::Utc;
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while obtaining ephemeris data.
#[derive(Error, Debug)]
pub enum EphemerisError {
    /// HTTP request failed (network, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("astronomy API request failed: {0}")]
    Status(StatusCode),

    /// The body was not the expected JSON document
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field is absent or not a usable number
    #[error("incomplete ephemeris data: missing or malformed `{0}`")]
    IncompleteInput(&'static str),

    /// No application ID / secret configured
    #[error("astronomy API credentials are not configured")]
    MissingCredentials,
}

/// Client for the AstronomyAPI moon positions endpoint.
#[derive(Debug, Clone)]
pub struct AstronomyApiClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl AstronomyApiClient {
    /// Build a client from configuration. Fails without credentials.
    pub fn new(config: &ApiConfig) -> Result<Self, EphemerisError> {
        if !config.has_credentials() {
            return Err(EphemerisError::MissingCredentials);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(AstronomyApiClient {
            http,
            base_url: config.base_url.trim().to_string(),
            app_id: config.app_id.trim().to_string(),
            app_secret: config.app_secret.trim().to_string(),
        })
    }

    /// Full URL of the positions endpoint.
    pub fn positions_url(&self) -> String {
        format!("{}/bodies/positions/moon", self.base_url.trim_end_matches('/'))
    }

    /// Fetch the Moon's state for `observer` at `moment`, bypassing any cache.
    pub async fn fetch(
        &self,
        observer: &ObserverLocation,
        moment: &Moment,
    ) -> Result<RawEphemeris, EphemerisError> {
        let date = moment.datetime().format("%Y-%m-%d").to_string();
        let time = moment.datetime().format("%H:%M:%S").to_string();
        info!("Fetching lunar data for {} at {} {}", observer, date, time);

        let response = self
            .http
            .get(self.positions_url())
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .query(&[
                ("latitude", observer.latitude.to_string()),
                ("longitude", observer.longitude.to_string()),
                ("elevation", "0".to_string()),
                ("from_date", date.clone()),
                ("to_date", date),
                ("time", time),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EphemerisError::Status(status));
        }

        let body = response.text().await?;
        parse_positions_response(&body)
    }
}

/// Cache-first fetch: serve a fresh cached response, otherwise hit the API and
/// remember the result.
pub async fn fetch_cached(
    client: &AstronomyApiClient,
    cache: &mut EphemerisCache,
    observer: &ObserverLocation,
    moment: &Moment,
) -> Result<RawEphemeris, EphemerisError> {
    let key = CacheKey::new(observer, moment);
    if let Some(hit) = cache.get(&key, Utc::now()) {
        debug!("Cache hit for {}", key.as_str());
        return Ok(hit.clone());
    }

    debug!("Cache miss for {}", key.as_str());
    let fresh = client.fetch(observer, moment).await?;
    cache.insert(key, fresh.clone(), Utc::now());
    Ok(fresh)
}

// -- Response schema --
//
// Every field is optional so that a missing value is reported by name instead
// of as a generic decode error.

#[derive(Debug, Deserialize)]
struct PositionsResponse {
    data: Option<PositionsData>,
}

#[derive(Debug, Deserialize)]
struct PositionsData {
    table: Option<PositionsTable>,
}

#[derive(Debug, Deserialize)]
struct PositionsTable {
    #[serde(default)]
    rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    cells: Vec<BodyCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyCell {
    distance: Option<Distance>,
    position: Option<Position>,
    extra_info: Option<ExtraInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Distance {
    from_earth: Option<DistanceValues>,
}

#[derive(Debug, Deserialize)]
struct DistanceValues {
    km: Option<Numeric>,
    au: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
struct Position {
    horizontal: Option<Horizontal>,
    equatorial: Option<Equatorial>,
}

#[derive(Debug, Deserialize)]
struct Horizontal {
    altitude: Option<Degrees>,
    azimuth: Option<Degrees>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Equatorial {
    right_ascension: Option<Hours>,
    declination: Option<Degrees>,
}

#[derive(Debug, Deserialize)]
struct Degrees {
    degrees: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
struct Hours {
    hours: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
struct ExtraInfo {
    phase: Option<PhaseInfo>,
}

#[derive(Debug, Deserialize)]
struct PhaseInfo {
    string: Option<String>,
    // The service spells this field "angel"
    #[serde(alias = "angle")]
    angel: Option<Numeric>,
    fraction: Option<Numeric>,
}

/// A JSON number, or a string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> Option<f64> {
        let v = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

fn required(value: Option<&Numeric>, field: &'static str) -> Result<f64, EphemerisError> {
    value
        .and_then(Numeric::value)
        .ok_or(EphemerisError::IncompleteInput(field))
}

/// Validate an AstronomyAPI positions body into a [`RawEphemeris`].
///
/// Only the first row's first cell is used (one body, one instant).
///
/// # Example
/// ```
/// use lunar_observer_lib::ephemeris::{parse_positions_response, EphemerisError};
///
/// let err = parse_positions_response(r#"{"data": {"table": {"rows": []}}}"#).unwrap_err();
/// assert!(matches!(err, EphemerisError::IncompleteInput("data.table.rows[0]")));
/// ```
pub fn parse_positions_response(body: &str) -> Result<RawEphemeris, EphemerisError> {
    use EphemerisError::IncompleteInput;

    let response: PositionsResponse = serde_json::from_str(body)?;
    let table = response
        .data
        .and_then(|d| d.table)
        .ok_or(IncompleteInput("data.table"))?;
    let row = table
        .rows
        .into_iter()
        .next()
        .ok_or(IncompleteInput("data.table.rows[0]"))?;
    let cell = row
        .cells
        .into_iter()
        .next()
        .ok_or(IncompleteInput("data.table.rows[0].cells[0]"))?;

    let phase = cell
        .extra_info
        .and_then(|e| e.phase)
        .ok_or(IncompleteInput("extraInfo.phase"))?;
    let phase_angle_deg = required(phase.angel.as_ref(), "extraInfo.phase.angel")?;
    let illumination_fraction = required(phase.fraction.as_ref(), "extraInfo.phase.fraction")?;
    if !(0.0..=1.0).contains(&illumination_fraction) {
        return Err(IncompleteInput("extraInfo.phase.fraction"));
    }

    let from_earth = cell
        .distance
        .and_then(|d| d.from_earth)
        .ok_or(IncompleteInput("distance.fromEarth"))?;
    let distance_km = required(from_earth.km.as_ref(), "distance.fromEarth.km")?;
    if distance_km <= 0.0 {
        return Err(IncompleteInput("distance.fromEarth.km"));
    }
    let distance_au = from_earth.au.as_ref().and_then(Numeric::value);

    let position = cell.position.ok_or(IncompleteInput("position"))?;
    let horizontal = position
        .horizontal
        .ok_or(IncompleteInput("position.horizontal"))?;
    let altitude_deg = required(
        horizontal.altitude.as_ref().and_then(|a| a.degrees.as_ref()),
        "position.horizontal.altitude.degrees",
    )?;
    let azimuth_deg = required(
        horizontal.azimuth.as_ref().and_then(|a| a.degrees.as_ref()),
        "position.horizontal.azimuth.degrees",
    )?;

    let equatorial = position
        .equatorial
        .ok_or(IncompleteInput("position.equatorial"))?;
    let right_ascension_hours = required(
        equatorial
            .right_ascension
            .as_ref()
            .and_then(|r| r.hours.as_ref()),
        "position.equatorial.rightAscension.hours",
    )?;
    let declination_deg = required(
        equatorial.declination.as_ref().and_then(|d| d.degrees.as_ref()),
        "position.equatorial.declination.degrees",
    )?;

    Ok(RawEphemeris {
        phase_angle_deg,
        illumination_fraction,
        phase_name: phase.string,
        distance_km,
        distance_au,
        altitude_deg,
        azimuth_deg,
        right_ascension_hours,
        declination_deg,
    })
}
