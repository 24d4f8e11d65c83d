//! # Civil Date-Time to Julian Day
//!
//! Converts a proleptic-Gregorian civil date-time into a continuous Julian Day
//! number, the time argument of every periodic series in [`crate::lunar`].
//!
//! The day count uses the standard integer algorithm with floor division, so
//! it stays correct for years before -4800 where the intermediate year term
//! turns negative. The fractional part is referenced to noon: 12:00:00 on a
//! civil date is an integral Julian Day.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Julian Day of the J2000.0 epoch (2000-01-01 12:00).
pub const J2000_JD: f64 = 2_451_545.0;

/// Days in a Julian century.
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const HOURS_PER_DAY: f64 = 24.0;
const MINUTES_PER_DAY: f64 = 1_440.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// The instant of an observation as a naive civil date-time.
///
/// The Julian Day is always derived on demand and never stored alongside.
///
/// # Example
/// ```
/// use lunar_observer_lib::calendar::Moment;
///
/// let j2000 = Moment::from_ymd_hms(2000, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(j2000.julian_day(), 2_451_545.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Moment(pub NaiveDateTime);

impl Moment {
    /// Current local wall-clock time.
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Build from calendar fields; `None` for an impossible date or time.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)
            .map(Self)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn julian_day(&self) -> f64 {
        julian_day(&self.0)
    }
}

impl From<NaiveDateTime> for Moment {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Integral Julian Day Number of a proleptic-Gregorian date (the JD at noon).
pub fn julian_day_number(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;

    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32_045
}

/// Julian Day of a civil date and time of day.
pub fn julian_day_from_parts(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> f64 {
    let jdn = julian_day_number(year as i64, month as i64, day as i64);
    let day_fraction = (hour as f64 - 12.0) / HOURS_PER_DAY
        + minute as f64 / MINUTES_PER_DAY
        + second as f64 / SECONDS_PER_DAY;
    jdn as f64 + day_fraction
}

/// Julian Day of a naive date-time. Sub-second precision is dropped.
pub fn julian_day(datetime: &NaiveDateTime) -> f64 {
    julian_day_from_parts(
        datetime.year(),
        datetime.month(),
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        datetime.second(),
    )
}

/// Julian centuries elapsed since J2000.0.
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_j2000_epoch_is_exact() {
        assert_eq!(julian_day_from_parts(2000, 1, 1, 12, 0, 0), J2000_JD);
        assert_eq!(centuries_since_j2000(J2000_JD), 0.0);
    }

    #[test]
    fn test_midnight_is_half_day_before_noon() {
        assert_eq!(julian_day_from_parts(2000, 1, 1, 0, 0, 0), 2_451_544.5);
        assert_eq!(julian_day_from_parts(1999, 12, 31, 12, 0, 0), 2_451_544.0);
    }

    #[test]
    fn test_known_dates() {
        // Meeus, Astronomical Algorithms, example 7.a
        assert_abs_diff_eq!(
            julian_day_from_parts(1957, 10, 4, 19, 26, 24),
            2_436_116.31,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            julian_day_from_parts(1987, 4, 10, 19, 21, 0),
            2_446_896.30625,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            julian_day_from_parts(2024, 10, 19, 18, 30, 15),
            2_460_603.271_006_944_6,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_julian_period_origin() {
        // JD 0 is -4713-11-24 12:00 in the proleptic Gregorian calendar
        assert_eq!(julian_day_number(-4713, 11, 24), 0);
        assert_eq!(julian_day_from_parts(-4713, 11, 24, 12, 0, 0), 0.0);
        assert_eq!(julian_day_from_parts(-4713, 11, 24, 0, 0, 0), -0.5);
    }

    #[test]
    fn test_floor_division_before_4800_bce() {
        // Intermediate year term crosses zero between these dates
        let y0 = julian_day_number(-4800, 3, 1);
        let y_minus_1 = julian_day_number(-4801, 3, 1);
        assert_eq!(y0, -32_044);
        // -4800 is a Gregorian leap year, so the span includes Feb 29
        assert_eq!(y0 - y_minus_1, 366);

        // Day-to-day continuity across the boundary
        assert_eq!(
            julian_day_number(-4800, 3, 1) - julian_day_number(-4800, 2, 29),
            1
        );
        assert_eq!(
            julian_day_number(-4801, 1, 1) - julian_day_number(-4802, 12, 31),
            1
        );
        assert_eq!(
            julian_day_number(-6000, 1, 1) - julian_day_number(-6001, 1, 1),
            365
        );
    }

    #[test]
    fn test_monotonic_in_wall_clock_time() {
        let mut previous = f64::NEG_INFINITY;
        for year in [-5000, -4801, -1, 0, 1, 1582, 1900, 2000, 2100] {
            for month in 1..=12 {
                let jd = julian_day_from_parts(year, month, 1, 0, 0, 0);
                assert!(jd > previous, "JD must increase at {}-{}", year, month);
                previous = jd;
            }
        }
    }

    #[test]
    fn test_moment_derives_julian_day() {
        let moment = Moment::from_ymd_hms(2024, 10, 19, 18, 30, 15).unwrap();
        assert_eq!(
            moment.julian_day(),
            julian_day_from_parts(2024, 10, 19, 18, 30, 15)
        );
        assert_eq!(moment.to_string(), "2024-10-19 18:30:15");
        assert!(Moment::from_ymd_hms(2023, 2, 29, 0, 0, 0).is_none());
    }
}
