//! Libration, bright-limb orientation and size/distance scalars.
//!
//! Low-precision lunar theory: fundamental arguments are linear in Julian
//! centuries T since J2000.0 and the libration series keeps only its largest
//! periodic terms. Accuracy is a few tenths of a degree, enough to tilt and
//! shift a rendered disc but not for selenographic work.

use crate::angles::normalize_degrees;
use crate::calendar::centuries_since_j2000;
use serde::Serialize;

/// A mean orbital element `epoch_deg + rate_deg_per_century * T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElement {
    pub epoch_deg: f64,
    pub rate_deg_per_century: f64,
}

impl MeanElement {
    /// Value at `t` Julian centuries, reduced into `[0, 360)`.
    pub fn at(self, t: f64) -> f64 {
        normalize_degrees(self.epoch_deg + self.rate_deg_per_century * t)
    }
}

/// Mean longitude of the Moon (L).
pub const MOON_MEAN_LONGITUDE: MeanElement = MeanElement {
    epoch_deg: 218.316,
    rate_deg_per_century: 481_267.881,
};

/// Mean anomaly of the Moon (M).
pub const MOON_MEAN_ANOMALY: MeanElement = MeanElement {
    epoch_deg: 134.963,
    rate_deg_per_century: 477_198.868,
};

/// Mean anomaly of the Sun (M′).
pub const SUN_MEAN_ANOMALY: MeanElement = MeanElement {
    epoch_deg: 357.529,
    rate_deg_per_century: 35_999.050,
};

/// Argument of latitude of the Moon (F).
pub const MOON_ARGUMENT_OF_LATITUDE: MeanElement = MeanElement {
    epoch_deg: 93.272,
    rate_deg_per_century: 483_202.019,
};

/// Longitude of the Moon's ascending node (Ω).
pub const MOON_ASCENDING_NODE: MeanElement = MeanElement {
    epoch_deg: 125.045,
    rate_deg_per_century: -1_934.136,
};

/// Amplitudes (degrees) of the longitudinal libration terms.
pub mod longitude_terms {
    /// sin(M − 2F)
    pub const M_MINUS_2F: f64 = -1.274;
    /// sin(−2F)
    pub const MINUS_2F: f64 = 0.658;
    /// sin(M′)
    pub const SUN_ANOMALY: f64 = -0.186;
    /// sin(2M − 2F)
    pub const TWO_M_MINUS_2F: f64 = -0.059;
    /// sin(M − 2F + M′)
    pub const M_MINUS_2F_PLUS_SUN: f64 = -0.057;
}

/// Amplitudes (degrees) of the latitudinal libration terms.
pub mod latitude_terms {
    /// sin(F − 2F)
    pub const F_MINUS_2F: f64 = -0.173;
    /// sin(M − F − 2F)
    pub const M_MINUS_F_MINUS_2F: f64 = -0.055;
    /// sin(M + F − 2F)
    pub const M_PLUS_F_MINUS_2F: f64 = -0.046;
    /// sin(F + 2F)
    pub const F_PLUS_2F: f64 = 0.033;
}

/// Diurnal libration scale per degree of observer longitude.
pub const DIURNAL_LONGITUDE_FACTOR: f64 = 0.0003;
/// Diurnal libration scale per degree of observer latitude.
pub const DIURNAL_LATITUDE_FACTOR: f64 = 0.0002;

/// Fundamental arguments in degrees, each reduced into `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundamentalArguments {
    pub mean_longitude: f64,
    pub moon_anomaly: f64,
    pub sun_anomaly: f64,
    pub argument_of_latitude: f64,
    pub ascending_node: f64,
}

impl FundamentalArguments {
    pub fn at_julian_day(jd: f64) -> Self {
        let t = centuries_since_j2000(jd);
        Self {
            mean_longitude: MOON_MEAN_LONGITUDE.at(t),
            moon_anomaly: MOON_MEAN_ANOMALY.at(t),
            sun_anomaly: SUN_MEAN_ANOMALY.at(t),
            argument_of_latitude: MOON_ARGUMENT_OF_LATITUDE.at(t),
            ascending_node: MOON_ASCENDING_NODE.at(t),
        }
    }
}

/// Apparent libration of the lunar disc, all values in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LibrationResult {
    /// Periodic plus diurnal libration in longitude
    pub longitude_deg: f64,
    /// Periodic plus diurnal libration in latitude
    pub latitude_deg: f64,
    /// Magnitude of the combined (longitude, latitude) offset
    pub total_deg: f64,
    pub longitudinal_deg: f64,
    pub latitudinal_deg: f64,
    pub diurnal_longitude_deg: f64,
    pub diurnal_latitude_deg: f64,
}

/// Libration for a Julian Day and observer position.
///
/// The diurnal part is a linear placeholder for topocentric parallax, not a
/// rigorous correction.
pub fn libration(jd: f64, observer_longitude: f64, observer_latitude: f64) -> LibrationResult {
    let args = FundamentalArguments::at_julian_day(jd);
    let m = args.moon_anomaly.to_radians();
    let ms = args.sun_anomaly.to_radians();
    let f = args.argument_of_latitude.to_radians();

    let longitudinal = longitude_terms::M_MINUS_2F * (m - 2.0 * f).sin()
        + longitude_terms::MINUS_2F * (-2.0 * f).sin()
        + longitude_terms::SUN_ANOMALY * ms.sin()
        + longitude_terms::TWO_M_MINUS_2F * (2.0 * m - 2.0 * f).sin()
        + longitude_terms::M_MINUS_2F_PLUS_SUN * (m - 2.0 * f + ms).sin();

    // Arguments kept in their published form; F - 2F is not folded into -F.
    let latitudinal = latitude_terms::F_MINUS_2F * (f - 2.0 * f).sin()
        + latitude_terms::M_MINUS_F_MINUS_2F * (m - f - 2.0 * f).sin()
        + latitude_terms::M_PLUS_F_MINUS_2F * (m + f - 2.0 * f).sin()
        + latitude_terms::F_PLUS_2F * (f + 2.0 * f).sin();

    let diurnal_longitude = observer_longitude * DIURNAL_LONGITUDE_FACTOR;
    let diurnal_latitude = observer_latitude * DIURNAL_LATITUDE_FACTOR;

    let longitude_deg = longitudinal + diurnal_longitude;
    let latitude_deg = latitudinal + diurnal_latitude;

    LibrationResult {
        longitude_deg,
        latitude_deg,
        total_deg: longitude_deg.hypot(latitude_deg),
        longitudinal_deg: longitudinal,
        latitudinal_deg: latitudinal,
        diurnal_longitude_deg: diurnal_longitude,
        diurnal_latitude_deg: diurnal_latitude,
    }
}

/// Below this |cos(altitude)| the Moon is treated as being at the zenith or nadir.
const ZENITH_COS_TOLERANCE: f64 = 1e-9;
/// Both atan2 arguments below this magnitude make the angle undefined.
const DEGENERATE_ATAN2_TOLERANCE: f64 = 1e-12;

/// Orientation of the bright limb as seen by the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationResult {
    /// Position angle of the bright limb in `[0, 360)`
    pub position_angle_deg: f64,
}

/// Position angle of the bright limb from observer latitude and the Moon's
/// horizontal coordinates, all in degrees.
///
/// Returns 0.0 when the geometry is degenerate (Moon at the zenith or nadir,
/// or both atan2 arguments vanish). This is an approximation of the
/// singularity, not a treatment of it.
pub fn bright_limb_position_angle(latitude_deg: f64, azimuth_deg: f64, altitude_deg: f64) -> f64 {
    let lat = latitude_deg.to_radians();
    let az = azimuth_deg.to_radians();
    let alt = altitude_deg.to_radians();

    if alt.cos().abs() < ZENITH_COS_TOLERANCE {
        return 0.0;
    }

    let y = lat.cos() * az.sin();
    let x = lat.sin() * alt.cos() - lat.cos() * alt.sin() * az.cos();

    if !x.is_finite()
        || !y.is_finite()
        || (x.abs() < DEGENERATE_ATAN2_TOLERANCE && y.abs() < DEGENERATE_ATAN2_TOLERANCE)
    {
        return 0.0;
    }

    normalize_degrees(y.atan2(x).to_degrees())
}

pub fn orientation(latitude_deg: f64, azimuth_deg: f64, altitude_deg: f64) -> OrientationResult {
    OrientationResult {
        position_angle_deg: bright_limb_position_angle(latitude_deg, azimuth_deg, altitude_deg),
    }
}

/// Apparent diameter of the Moon at the mean distance.
pub const REFERENCE_ANGULAR_DIAMETER_DEG: f64 = 0.5;
/// Mean Earth–Moon distance.
pub const MEAN_EARTH_MOON_DISTANCE_KM: f64 = 384_400.0;
/// Speed of light in vacuum.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Angular diameter scaled by inverse distance (first-order approximation).
pub fn angular_diameter_deg(distance_km: f64) -> f64 {
    REFERENCE_ANGULAR_DIAMETER_DEG * (MEAN_EARTH_MOON_DISTANCE_KM / distance_km)
}

/// One-way light travel time from the Moon, in seconds.
pub fn light_travel_time_s(distance_km: f64) -> f64 {
    distance_km / SPEED_OF_LIGHT_KM_S
}
