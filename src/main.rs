//! # Lunar Observer Application Entry Point
//!
//! This binary wires the library together: it resolves the observer location,
//! fetches the Moon's raw ephemeris (cache first), derives the full report and
//! prints it as terminal text or JSON.
//!
//! ```text
//! lunar-observer [--location <name>] [--lat <deg> --lon <deg>]
//!                [--json] [--no-color] [--config <path>]
//! ```

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use log::warn;
use lunar_observer_lib::cache::EphemerisCache;
use lunar_observer_lib::calendar::Moment;
use lunar_observer_lib::config::Config;
use lunar_observer_lib::ephemeris::{self, AstronomyApiClient};
use lunar_observer_lib::geocode::Geocoder;
use lunar_observer_lib::renderer::format_report;
use lunar_observer_lib::report::LunarReport;
use lunar_observer_lib::ObserverLocation;
use std::env;
use std::path::PathBuf;

const USAGE: &str = "usage: lunar-observer [--location <name>] [--lat <deg> --lon <deg>] \
[--json] [--no-color] [--config <path>]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub json: bool,
    pub no_color: bool,
    pub config_path: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut lat = None;
        let mut lon = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--location" => parsed.location = Some(value_for(&arg, args.next())?),
                "--lat" => lat = Some(number_for(&arg, args.next())?),
                "--lon" => lon = Some(number_for(&arg, args.next())?),
                "--config" => parsed.config_path = Some(value_for(&arg, args.next())?.into()),
                "--json" => parsed.json = true,
                "--no-color" => parsed.no_color = true,
                "-h" | "--help" => parsed.help = true,
                other => bail!("unknown argument `{}`\n{}", other, USAGE),
            }
        }

        parsed.coordinates = match (lat, lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            (None, None) => None,
            _ => bail!("--lat and --lon must be given together"),
        };
        Ok(parsed)
    }
}

fn value_for(flag: &str, value: Option<String>) -> anyhow::Result<String> {
    value.with_context(|| format!("{} needs a value", flag))
}

fn number_for(flag: &str, value: Option<String>) -> anyhow::Result<f64> {
    let raw = value_for(flag, value)?;
    raw.trim()
        .parse()
        .with_context(|| format!("{} expects a number, got `{}`", flag, raw))
}

/// Resolve where the observer stands.
///
/// Explicit coordinates skip geocoding. Otherwise the place name (from the
/// command line or the config) is geocoded, falling back to the configured
/// coordinates when the lookup fails.
async fn resolve_observer(
    args: &CliArgs,
    config: &Config,
) -> anyhow::Result<(ObserverLocation, Option<String>)> {
    if let Some((lat, lon)) = args.coordinates {
        let observer = ObserverLocation::new(lat, lon).context("invalid --lat/--lon")?;
        return Ok((observer, None));
    }

    let name = args
        .location
        .clone()
        .unwrap_or_else(|| config.observer.location.clone());

    let geocoded = match Geocoder::new(config.api.timeout()) {
        Ok(geocoder) => geocoder.locate(&name).await,
        Err(e) => Err(e),
    };
    match geocoded {
        Ok(place) => Ok((place.location, Some(place.address))),
        Err(e) if args.location.is_some() => {
            Err(e).with_context(|| format!("could not locate `{}`", name))
        }
        Err(e) => {
            warn!("Geocoding {} failed ({}), using configured coordinates", name, e);
            let observer =
                ObserverLocation::new(config.observer.latitude, config.observer.longitude)
                    .context("invalid [observer] coordinates in config")?;
            Ok((observer, Some(name)))
        }
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse(env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = match &args.config_path {
        Some(path) => Config::load_from_path(path).with_env_overrides(),
        None => Config::load(),
    };
    if args.no_color {
        config.display.enable_color = false;
    }

    let client = AstronomyApiClient::new(&config.api).context(
        "set ASTRONOMY_APP_ID and ASTRONOMY_APP_SECRET or fill [api] in lunar-config.toml",
    )?;
    let mut cache = EphemerisCache::load_from_path(&config.cache.path, config.cache.ttl());
    let moment = Moment::now();

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;
    let (observer, place, raw) = rt.block_on(async {
        let (observer, place) = resolve_observer(&args, &config).await?;
        let raw = ephemeris::fetch_cached(&client, &mut cache, &observer, &moment)
            .await
            .context("failed to fetch lunar data")?;
        anyhow::Ok((observer, place, raw))
    })?;

    cache.purge_expired(chrono::Utc::now());
    if let Err(e) = cache.save_to_path(&config.cache.path) {
        warn!("Could not write cache to {}: {}", config.cache.path, e);
    }

    let mut report = LunarReport::compute(observer, moment, &raw);
    if let Some(place) = place {
        report = report.with_place(place);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report, &config.display));
    }
    Ok(())
}
