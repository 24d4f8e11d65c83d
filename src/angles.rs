//! # Angle Reduction and Compass Directions
//!
//! Every angle that leaves the core is reduced into `[0, 360)`. Compass labels
//! use the 16-point rose, 22.5° per sector, with sector 0 centred on north.
//!
//! ## Rounding at Sector Boundaries
//! An azimuth exactly halfway between two points (11.25°, 33.75°, ...) is
//! rounded half-to-even on the sector index, so 11.25° maps to `N` and 33.75°
//! maps to `NE`. Because the sector count (16) is even, the same rule holds
//! after any whole-turn shift of the input.

/// Degrees in a full turn.
pub const FULL_TURN_DEG: f64 = 360.0;

/// Width of one compass sector (360 / 16).
const COMPASS_SECTOR_DEG: f64 = 22.5;

/// 16-point compass rose, clockwise from north.
pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Reduce any finite angle into `[0, 360)`.
///
/// ```
/// use lunar_observer_lib::angles::normalize_degrees;
///
/// assert_eq!(normalize_degrees(-90.0), 270.0);
/// assert_eq!(normalize_degrees(720.0), 0.0);
/// ```
pub fn normalize_degrees(angle: f64) -> f64 {
    let reduced = angle.rem_euclid(FULL_TURN_DEG);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if reduced >= FULL_TURN_DEG {
        0.0
    } else {
        reduced
    }
}

/// Map an azimuth (any real number of degrees) to its 16-point compass label.
///
/// ```
/// use lunar_observer_lib::angles::compass_direction;
///
/// assert_eq!(compass_direction(90.0), "E");
/// assert_eq!(compass_direction(-22.5), "NNW");
/// ```
pub fn compass_direction(azimuth_deg: f64) -> &'static str {
    let sectors = (azimuth_deg / COMPASS_SECTOR_DEG).round_ties_even();
    let index = sectors.rem_euclid(COMPASS_POINTS.len() as f64) as usize;
    COMPASS_POINTS[index % COMPASS_POINTS.len()]
}
