//! # Lunar Observer Core Library
//!
//! This library computes the Moon's apparent state for an observer standing at a
//! given place and time: phase, illumination, age, distance, angular size,
//! libration, bright-limb orientation, compass direction and the next principal
//! phase.
//!
//! ## Design Philosophy
//!
//! ### Pure Computational Core
//! - **Stateless**: every calculation in [`angles`], [`calendar`], [`phase`] and
//!   [`lunar`] is a closed-form function of its arguments
//! - **Total**: out-of-range angles are wrapped into `[0, 360)` instead of rejected
//! - **Thread-safe by construction**: no shared mutable state, no I/O, no locking
//!
//! ### Thin I/O Shell
//! Raw ephemeris values (altitude, azimuth, phase angle, distance) come from an
//! external astronomy service through [`ephemeris`], optionally served from
//! [`cache`]. Place names are resolved by [`geocode`]. The shell validates the
//! data contract and hands a strongly typed [`RawEphemeris`] to the core.
//!
//! ### Data Flow
//! 1. **Locate**: place name → [`ObserverLocation`] (or coordinates given directly)
//! 2. **Fetch**: cache-first lookup, then HTTP → [`RawEphemeris`]
//! 3. **Derive**: [`report::LunarReport::compute`] runs every core calculation
//! 4. **Present**: [`renderer`] text output or JSON via `serde`
//!
//! ## Core Types
//!
//! The library exports two primary input records:
//! - [`ObserverLocation`]: validated geographic coordinates of the observer
//! - [`RawEphemeris`]: the externally supplied lunar position and phase data

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Module declarations
pub mod angles;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod ephemeris;
pub mod geocode;
pub mod lunar;
pub mod phase;
pub mod renderer;
pub mod report;

/// Rejected observer coordinates.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum LocationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Geographic position of the observer in decimal degrees.
///
/// Hemisphere letters are never stored; they are derived from the sign of each
/// coordinate when the location is displayed.
///
/// # Example
/// ```
/// use lunar_observer_lib::ObserverLocation;
///
/// let la = ObserverLocation::new(34.0522, -118.2437).unwrap();
/// assert_eq!(la.to_string(), "34.0522° N, 118.2437° W");
///
/// assert!(ObserverLocation::new(91.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    /// Latitude, positive north (-90 to +90)
    pub latitude: f64,
    /// Longitude, positive east (-180 to +180)
    pub longitude: f64,
}

impl ObserverLocation {
    /// Build a location, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// `'N'` for the northern hemisphere (including the equator), `'S'` otherwise.
    pub fn latitude_hemisphere(&self) -> char {
        if self.latitude >= 0.0 {
            'N'
        } else {
            'S'
        }
    }

    /// `'E'` east of Greenwich (including the prime meridian), `'W'` otherwise.
    pub fn longitude_hemisphere(&self) -> char {
        if self.longitude >= 0.0 {
            'E'
        } else {
            'W'
        }
    }
}

impl fmt::Display for ObserverLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4}° {}, {:.4}° {}",
            self.latitude.abs(),
            self.latitude_hemisphere(),
            self.longitude.abs(),
            self.longitude_hemisphere()
        )
    }
}

/// Lunar state as reported by the external astronomy service.
///
/// This is read-only input to the core. Field presence and basic sanity
/// (finite numbers, positive distance) are checked during ingestion in
/// [`ephemeris`], so the core can assume well-formed values.
///
/// # Example
/// ```
/// use lunar_observer_lib::RawEphemeris;
///
/// let raw = RawEphemeris {
///     phase_angle_deg: 180.0,
///     illumination_fraction: 1.0,
///     phase_name: Some("Full Moon".to_string()),
///     distance_km: 384_400.0,
///     distance_au: None,
///     altitude_deg: 30.0,
///     azimuth_deg: 140.0,
///     right_ascension_hours: 12.5,
///     declination_deg: -4.2,
/// };
/// assert!(raw.is_above_horizon());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEphemeris {
    /// Sun–Moon–Earth phase angle, 0 = new, 180 = full
    pub phase_angle_deg: f64,
    /// Illuminated fraction of the disc (0–1)
    pub illumination_fraction: f64,
    /// Phase name supplied by the service, if any
    pub phase_name: Option<String>,
    /// Geocentric distance in kilometres
    pub distance_km: f64,
    /// Geocentric distance in astronomical units, if supplied
    pub distance_au: Option<f64>,
    /// Topocentric altitude above the horizon
    pub altitude_deg: f64,
    /// Topocentric azimuth, clockwise from north
    pub azimuth_deg: f64,
    /// Right ascension in hours
    pub right_ascension_hours: f64,
    /// Declination in degrees
    pub declination_deg: f64,
}

impl RawEphemeris {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude_deg > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_accepts_boundaries() {
        assert!(ObserverLocation::new(90.0, 180.0).is_ok());
        assert!(ObserverLocation::new(-90.0, -180.0).is_ok());
        assert!(ObserverLocation::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_location_rejects_out_of_range() {
        assert_eq!(
            ObserverLocation::new(-90.5, 0.0),
            Err(LocationError::LatitudeOutOfRange(-90.5))
        );
        assert_eq!(
            ObserverLocation::new(10.0, 181.0),
            Err(LocationError::LongitudeOutOfRange(181.0))
        );
        assert!(ObserverLocation::new(f64::NAN, 0.0).is_err());
        assert!(ObserverLocation::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_hemisphere_letters_follow_sign() {
        let sydney = ObserverLocation::new(-33.8688, 151.2093).unwrap();
        assert_eq!(sydney.latitude_hemisphere(), 'S');
        assert_eq!(sydney.longitude_hemisphere(), 'E');
        assert_eq!(sydney.to_string(), "33.8688° S, 151.2093° E");

        let origin = ObserverLocation::new(0.0, 0.0).unwrap();
        assert_eq!(origin.to_string(), "0.0000° N, 0.0000° E");
    }
}
