//! # Lunar Report Rendering
//!
//! Turns a [`LunarReport`] into terminal text. The output is laid out in
//! sections (phase, position, distance, libration) followed by a small ASCII
//! drawing of the lit disc.
//!
//! ## Colour
//! ANSI escape codes are emitted only when [`DisplayConfig::enable_color`] is
//! set. With colour disabled the output is plain ASCII apart from the degree
//! sign and the phase symbol, which makes it safe for log files and pipes.

use crate::config::DisplayConfig;
use crate::report::LunarReport;

/// Rows used for the moon drawing inside [`format_report`].
const MOON_ROWS: usize = 10;

/// ANSI escape sequences, or empty strings when colour is off.
#[derive(Debug, Clone, Copy)]
struct Palette {
    reset: &'static str,
    bold: &'static str,
    cyan: &'static str,
    yellow: &'static str,
    green: &'static str,
    red: &'static str,
}

impl Palette {
    fn new(enable_color: bool) -> Self {
        if enable_color {
            Palette {
                reset: "\x1b[0m",
                bold: "\x1b[1m",
                cyan: "\x1b[36m",
                yellow: "\x1b[33m",
                green: "\x1b[32m",
                red: "\x1b[31m",
            }
        } else {
            Palette {
                reset: "",
                bold: "",
                cyan: "",
                yellow: "",
                green: "",
                red: "",
            }
        }
    }
}

/// Format a full report for the terminal.
pub fn format_report(report: &LunarReport, display: &DisplayConfig) -> String {
    let c = Palette::new(display.enable_color);
    let heading = |title: &str| format!("{}{}:{}", c.bold, title, c.reset);

    let mut lines = vec![
        format!("{}{}LUNAR OBSERVER - MOON DATA{}", c.bold, c.cyan, c.reset),
        "=".repeat(display.terminal_width),
        format!("Date: {}", report.moment),
        format!("Julian Day: {:.5}", report.julian_day),
    ];
    if let Some(place) = &report.place {
        lines.push(format!("Place: {}", place));
    }
    lines.push(format!("Location: {}", report.observer));

    let phase = &report.phase;
    lines.push(String::new());
    lines.push(format!("{} {} {}", heading("Moon Phase"), phase.symbol, phase.name));
    lines.push(format!("Illumination: {:.1}%", phase.illumination_percent));
    lines.push(format!("Lunar Age: {:.1} days", phase.age_days));
    lines.push(format!(
        "Next: {}{}{} in {:.1} days",
        c.yellow, report.next_phase.name, c.reset, report.next_phase.days_until
    ));

    let position = &report.position;
    let (visibility, visibility_color) = if position.above_horizon {
        ("Above horizon", c.green)
    } else {
        ("Below horizon", c.red)
    };
    lines.push(String::new());
    lines.push(heading("Position"));
    lines.push(format!(
        "Altitude: {:.2}° ({}{}{})",
        position.altitude_deg, visibility_color, visibility, c.reset
    ));
    lines.push(format!(
        "Azimuth: {:.2}° ({})",
        position.azimuth_deg, position.direction
    ));
    lines.push(format!(
        "RA {:.3}h, Dec {:.2}°",
        position.right_ascension_hours, position.declination_deg
    ));

    lines.push(String::new());
    lines.push(heading("Distance"));
    lines.push(format!("{} km", group_thousands(report.distance.km)));
    if let Some(au) = report.distance.au {
        lines.push(format!("{:.6} AU", au));
    }
    lines.push(format!("{:.2} light seconds", report.distance.light_seconds));

    lines.push(String::new());
    lines.push(heading("Angular Diameter"));
    lines.push(format!("{:.4}°", report.angular_diameter_deg));

    let libration = &report.libration;
    lines.push(String::new());
    lines.push(heading("Libration"));
    lines.push(format!(
        "Longitude: {:+.3}°  Latitude: {:+.3}°  Total: {:.3}°",
        libration.longitude_deg, libration.latitude_deg, libration.total_deg
    ));
    lines.push(format!(
        "Bright limb position angle: {:.1}°",
        report.orientation.position_angle_deg
    ));

    lines.push(String::new());
    lines.push(heading("Moon Visualization"));
    lines.push(ascii_moon(
        phase.illumination_percent,
        phase.angle_deg,
        display.terminal_width / 2,
        MOON_ROWS,
        display.enable_color,
    ));

    lines.join("\n")
}

/// Draw the Moon as a `width` x `height` character grid.
///
/// A waxing moon (phase angle in [0, 180]) is lit on the right, a waning one
/// on the left. The glyph density of the lit half follows the illumination:
/// at or above 99% it is solid, at or below 1% it is blank.
///
/// ```
/// use lunar_observer_lib::renderer::ascii_moon;
///
/// let full = ascii_moon(100.0, 180.0, 8, 4, false);
/// assert_eq!(full.lines().count(), 4);
/// assert!(full.contains('#'));
/// assert!(!ascii_moon(0.5, 5.0, 8, 4, false).contains('#'));
/// ```
pub fn ascii_moon(
    illumination_percent: f64,
    phase_angle_deg: f64,
    width: usize,
    height: usize,
    color: bool,
) -> String {
    let waxing = (0.0..=180.0).contains(&phase_angle_deg);
    let fraction = illumination_percent / 100.0;

    let (filled, partial): (&str, &[&str]) = if color {
        ("█", &["▏", "▎", "▍", "▌", "▋", "▊", "▉"])
    } else {
        ("#", &[".", ":", "-", "=", "+", "*"])
    };
    let lit_glyph = if fraction >= 0.99 {
        filled
    } else if fraction <= 0.01 {
        " "
    } else {
        let idx = ((fraction * partial.len() as f64) as usize).min(partial.len() - 1);
        partial[idx]
    };

    let mut rows = Vec::with_capacity(height);
    for y in 0..height {
        let ny = (y as f64 / height as f64) * 2.0 - 1.0;
        let row: String = (0..width)
            .map(|x| {
                let nx = (x as f64 / width as f64) * 2.0 - 1.0;
                if nx.hypot(ny) > 1.0 {
                    return " ";
                }
                let lit = if waxing { nx >= 0.0 } else { nx <= 0.0 };
                if lit {
                    lit_glyph
                } else {
                    " "
                }
            })
            .collect();
        rows.push(row);
    }
    rows.join("\n")
}

/// Whole kilometres with comma thousands separators.
fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        grouped.insert(0, '-');
    }
    grouped
}
