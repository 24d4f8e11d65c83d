//! # Phase Classification and Next-Phase Prediction
//!
//! The phase angle runs from 0° (new) through 180° (full) back to 360°; the
//! Moon waxes over the first half and wanes over the second.
//!
//! ## Classification Bins
//! The circle is cut into eight 45° bins centred on the multiples of 45°, so
//! each principal phase owns the angles within ±22.5° of its nominal angle:
//!
//! | Bin               | Angles (lower bound inclusive) |
//! |-------------------|--------------------------------|
//! | New Moon          | [337.5, 360) ∪ [0, 22.5)       |
//! | Waxing Crescent   | [22.5, 67.5)                   |
//! | First Quarter     | [67.5, 112.5)                  |
//! | Waxing Gibbous    | [112.5, 157.5)                 |
//! | Full Moon         | [157.5, 202.5)                 |
//! | Waning Gibbous    | [202.5, 247.5)                 |
//! | Last Quarter      | [247.5, 292.5)                 |
//! | Waning Crescent   | [292.5, 337.5)                 |
//!
//! ## Lunar Age
//! Age scales the phase angle linearly over a mean synodic month of 29.53 days.
//! Orbital eccentricity is ignored, so the age can be off by several hours.

use crate::angles::{normalize_degrees, FULL_TURN_DEG};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53;

/// Width of one named phase bin.
const PHASE_BIN_DEG: f64 = 45.0;

/// The eight named phases, in cyclic order from new moon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    #[serde(rename = "New Moon")]
    NewMoon,
    #[serde(rename = "Waxing Crescent")]
    WaxingCrescent,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing Gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full Moon")]
    FullMoon,
    #[serde(rename = "Waning Gibbous")]
    WaningGibbous,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    #[serde(rename = "Waning Crescent")]
    WaningCrescent,
}

impl MoonPhase {
    /// All phases in cyclic order; index `i` is centred on `45 * i` degrees.
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// Classify a phase angle (any real number of degrees).
    ///
    /// ```
    /// use lunar_observer_lib::phase::MoonPhase;
    ///
    /// assert_eq!(MoonPhase::from_angle(90.0), MoonPhase::FirstQuarter);
    /// assert_eq!(MoonPhase::from_angle(-10.0), MoonPhase::NewMoon);
    /// ```
    pub fn from_angle(phase_angle_deg: f64) -> Self {
        let shifted = normalize_degrees(phase_angle_deg + PHASE_BIN_DEG / 2.0);
        let index = (shifted / PHASE_BIN_DEG).floor() as usize;
        Self::ALL[index % Self::ALL.len()]
    }

    /// Parse a display name such as `"Waxing Gibbous"` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|phase| phase.name().eq_ignore_ascii_case(wanted))
    }

    pub fn name(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    /// Emoji glyph for the phase.
    pub fn symbol(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the display needs to know about the current phase.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseDescriptor {
    /// Named phase, serialised as its display name
    pub name: MoonPhase,
    pub symbol: &'static str,
    /// Illuminated percentage of the disc (0–100)
    pub illumination_percent: f64,
    /// Days since the last new moon
    pub age_days: f64,
    /// Phase angle the descriptor was derived from
    pub angle_deg: f64,
}

/// Describe the phase from the service's phase angle and illuminated fraction.
///
/// Illumination is taken from the supplied fraction, not recomputed from the angle.
pub fn describe(phase_angle_deg: f64, illumination_fraction: f64) -> PhaseDescriptor {
    let name = MoonPhase::from_angle(phase_angle_deg);
    PhaseDescriptor {
        name,
        symbol: name.symbol(),
        illumination_percent: illumination_percent(illumination_fraction),
        age_days: lunar_age_days(phase_angle_deg),
        angle_deg: phase_angle_deg,
    }
}

/// Days since new moon: `angle / 360 * 29.53`.
pub fn lunar_age_days(phase_angle_deg: f64) -> f64 {
    phase_angle_deg / FULL_TURN_DEG * SYNODIC_MONTH_DAYS
}

pub fn illumination_percent(illumination_fraction: f64) -> f64 {
    illumination_fraction * 100.0
}

/// The four principal phases and their nominal angles.
const PRINCIPAL_PHASES: [(MoonPhase, f64); 4] = [
    (MoonPhase::NewMoon, 0.0),
    (MoonPhase::FirstQuarter, 90.0),
    (MoonPhase::FullMoon, 180.0),
    (MoonPhase::LastQuarter, 270.0),
];

/// The next principal phase and how far away it is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NextPhaseInfo {
    pub name: MoonPhase,
    pub days_until: f64,
}

/// Predict the next principal phase strictly after the current angle.
///
/// Sitting exactly on a principal phase points at the following one, a full
/// quarter-cycle away. Past last quarter the prediction wraps to new moon at 360°.
///
/// ```
/// use lunar_observer_lib::phase::{next_principal_phase, MoonPhase};
///
/// let next = next_principal_phase(350.0);
/// assert_eq!(next.name, MoonPhase::NewMoon);
/// assert!((next.days_until - 0.8203).abs() < 1e-4);
/// ```
pub fn next_principal_phase(phase_angle_deg: f64) -> NextPhaseInfo {
    let current = normalize_degrees(phase_angle_deg);

    let (name, target) = PRINCIPAL_PHASES
        .into_iter()
        .filter(|&(_, angle)| angle > current)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((MoonPhase::NewMoon, FULL_TURN_DEG));

    NextPhaseInfo {
        name,
        days_until: (target - current) * SYNODIC_MONTH_DAYS / FULL_TURN_DEG,
    }
}
