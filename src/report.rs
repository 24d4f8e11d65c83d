//! # Lunar Report Assembly
//!
//! [`LunarReport`] is the single flat record handed to presentation layers.
//! It is built once per query from an observer, a moment and the raw
//! ephemeris, and every derived field comes from the pure core modules.

use crate::angles::compass_direction;
use crate::calendar::Moment;
use crate::lunar::{self, LibrationResult, OrientationResult};
use crate::phase::{self, MoonPhase, NextPhaseInfo, PhaseDescriptor};
use crate::{ObserverLocation, RawEphemeris};
use log::debug;
use serde::Serialize;

/// Where the Moon sits in the observer's sky.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkyPosition {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    /// 16-point compass label of the azimuth
    pub direction: &'static str,
    pub above_horizon: bool,
    pub right_ascension_hours: f64,
    pub declination_deg: f64,
}

/// Distance to the Moon in a few units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistanceInfo {
    pub km: f64,
    pub au: Option<f64>,
    pub light_seconds: f64,
}

/// Fully derived lunar state for one observer at one moment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LunarReport {
    pub observer: ObserverLocation,
    /// Resolved place name, when the location came from geocoding
    pub place: Option<String>,
    pub moment: Moment,
    pub julian_day: f64,
    pub phase: PhaseDescriptor,
    pub next_phase: NextPhaseInfo,
    pub position: SkyPosition,
    pub distance: DistanceInfo,
    pub angular_diameter_deg: f64,
    pub libration: LibrationResult,
    pub orientation: OrientationResult,
}

impl LunarReport {
    /// Run every core calculation for `observer` at `moment`.
    ///
    /// # Example
    /// ```
    /// use lunar_observer_lib::calendar::Moment;
    /// use lunar_observer_lib::phase::MoonPhase;
    /// use lunar_observer_lib::report::LunarReport;
    /// use lunar_observer_lib::{ObserverLocation, RawEphemeris};
    ///
    /// let raw = RawEphemeris {
    ///     phase_angle_deg: 180.0,
    ///     illumination_fraction: 0.99,
    ///     phase_name: None,
    ///     distance_km: 384_400.0,
    ///     distance_au: None,
    ///     altitude_deg: 20.0,
    ///     azimuth_deg: 90.0,
    ///     right_ascension_hours: 6.0,
    ///     declination_deg: 23.0,
    /// };
    /// let observer = ObserverLocation::new(0.0, 0.0).unwrap();
    /// let moment = Moment::from_ymd_hms(2000, 1, 1, 12, 0, 0).unwrap();
    ///
    /// let report = LunarReport::compute(observer, moment, &raw);
    /// assert_eq!(report.phase.name, MoonPhase::FullMoon);
    /// assert_eq!(report.position.direction, "E");
    /// assert_eq!(report.angular_diameter_deg, 0.5);
    /// ```
    pub fn compute(observer: ObserverLocation, moment: Moment, raw: &RawEphemeris) -> Self {
        let julian_day = moment.julian_day();
        let phase = phase::describe(raw.phase_angle_deg, raw.illumination_fraction);
        cross_check_phase_name(raw.phase_name.as_deref(), phase.name);

        LunarReport {
            observer,
            place: None,
            moment,
            julian_day,
            next_phase: phase::next_principal_phase(raw.phase_angle_deg),
            phase,
            position: SkyPosition {
                altitude_deg: raw.altitude_deg,
                azimuth_deg: raw.azimuth_deg,
                direction: compass_direction(raw.azimuth_deg),
                above_horizon: raw.is_above_horizon(),
                right_ascension_hours: raw.right_ascension_hours,
                declination_deg: raw.declination_deg,
            },
            distance: DistanceInfo {
                km: raw.distance_km,
                au: raw.distance_au,
                light_seconds: lunar::light_travel_time_s(raw.distance_km),
            },
            angular_diameter_deg: lunar::angular_diameter_deg(raw.distance_km),
            libration: lunar::libration(julian_day, observer.longitude, observer.latitude),
            orientation: lunar::orientation(observer.latitude, raw.azimuth_deg, raw.altitude_deg),
        }
    }

    /// Attach the human-readable place the observer coordinates came from.
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }
}

/// The angle-derived name wins; disagreement with the service is only logged.
fn cross_check_phase_name(supplied: Option<&str>, derived: MoonPhase) {
    let Some(name) = supplied else {
        return;
    };
    match MoonPhase::from_name(name) {
        Some(phase) if phase == derived => {}
        Some(phase) => debug!(
            "Service reports phase {} but angle classifies as {}",
            phase, derived
        ),
        None => debug!("Unrecognised phase name from service: {:?}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn waxing_gibbous() -> RawEphemeris {
        RawEphemeris {
            phase_angle_deg: 135.0,
            illumination_fraction: 0.854,
            phase_name: Some("Waxing Gibbous".to_string()),
            distance_km: 370_000.0,
            distance_au: Some(0.002_473),
            altitude_deg: 45.0,
            azimuth_deg: 120.0,
            right_ascension_hours: 20.5,
            declination_deg: -18.25,
        }
    }

    fn los_angeles() -> ObserverLocation {
        ObserverLocation::new(34.0522, -118.2437).unwrap()
    }

    #[test]
    fn test_report_combines_core_outputs() {
        let raw = waxing_gibbous();
        let moment = Moment::from_ymd_hms(2024, 10, 19, 18, 30, 15).unwrap();
        let report = LunarReport::compute(los_angeles(), moment, &raw);

        assert_eq!(report.julian_day, moment.julian_day());
        assert_eq!(report.phase.name, MoonPhase::WaxingGibbous);
        assert_relative_eq!(report.phase.illumination_percent, 85.4, epsilon = 1e-9);
        assert_eq!(report.next_phase.name, MoonPhase::FullMoon);
        assert_eq!(report.position.direction, "ESE");
        assert!(report.position.above_horizon);
        assert_eq!(report.distance.au, Some(0.002_473));
        assert_relative_eq!(
            report.distance.light_seconds,
            370_000.0 / 299_792.458,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            report.angular_diameter_deg,
            0.5 * 384_400.0 / 370_000.0,
            epsilon = 1e-12
        );
        assert_eq!(
            report.libration,
            lunar::libration(moment.julian_day(), -118.2437, 34.0522)
        );
        assert_relative_eq!(
            report.orientation.position_angle_deg,
            46.167_196_253_683_38,
            epsilon = 1e-9
        );
        assert_eq!(report.place, None);
    }

    #[test]
    fn test_derived_name_wins_over_supplied_name() {
        let mut raw = waxing_gibbous();
        raw.phase_name = Some("Full Moon".to_string());
        let moment = Moment::from_ymd_hms(2024, 10, 19, 0, 0, 0).unwrap();
        let report = LunarReport::compute(los_angeles(), moment, &raw);
        assert_eq!(report.phase.name, MoonPhase::WaxingGibbous);
    }

    #[test]
    fn test_below_horizon_and_place() {
        let mut raw = waxing_gibbous();
        raw.altitude_deg = -12.0;
        let moment = Moment::from_ymd_hms(2024, 10, 19, 0, 0, 0).unwrap();
        let report =
            LunarReport::compute(los_angeles(), moment, &raw).with_place("Los Angeles, CA");
        assert!(!report.position.above_horizon);
        assert_eq!(report.place.as_deref(), Some("Los Angeles, CA"));
    }

    #[test]
    fn test_report_serializes_phase_names() {
        let moment = Moment::from_ymd_hms(2024, 10, 19, 0, 0, 0).unwrap();
        let report = LunarReport::compute(los_angeles(), moment, &waxing_gibbous());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["phase"]["name"], "Waxing Gibbous");
        assert_eq!(json["next_phase"]["name"], "Full Moon");
        assert_eq!(json["position"]["direction"], "ESE");
        assert_eq!(json["moment"], "2024-10-19T00:00:00");
    }
}
