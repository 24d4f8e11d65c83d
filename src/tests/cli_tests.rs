//! Command line parsing tests.

use crate::CliArgs;
use std::path::PathBuf;

fn parse(args: &[&str]) -> anyhow::Result<CliArgs> {
    CliArgs::parse(args.iter().map(|a| a.to_string()))
}

#[test]
fn no_arguments_uses_defaults() {
    let args = parse(&[]).unwrap();
    assert_eq!(args, CliArgs::default());
}

#[test]
fn all_flags_are_recognised() {
    let args = parse(&[
        "--location",
        "Tokyo, Japan",
        "--json",
        "--no-color",
        "--config",
        "/etc/lunar.toml",
    ])
    .unwrap();
    assert_eq!(args.location.as_deref(), Some("Tokyo, Japan"));
    assert!(args.json);
    assert!(args.no_color);
    assert_eq!(args.config_path, Some(PathBuf::from("/etc/lunar.toml")));
    assert_eq!(args.coordinates, None);
}

#[test]
fn coordinates_come_as_a_pair() {
    let args = parse(&["--lat", "-33.8688", "--lon", "151.2093"]).unwrap();
    assert_eq!(args.coordinates, Some((-33.8688, 151.2093)));

    assert!(parse(&["--lat", "10"]).is_err());
    assert!(parse(&["--lon", "10"]).is_err());
}

#[test]
fn bad_input_is_rejected() {
    assert!(parse(&["--lat", "north", "--lon", "0"]).is_err());
    assert!(parse(&["--location"]).is_err());
    assert!(parse(&["--stdout"]).is_err());
}

#[test]
fn help_flag() {
    assert!(parse(&["--help"]).unwrap().help);
    assert!(parse(&["-h"]).unwrap().help);
}
