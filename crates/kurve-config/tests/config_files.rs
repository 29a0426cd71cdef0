//! Loading configurations from files and using the built interpolators.

use std::io::Write;

use approx::assert_relative_eq;
use kurve_config::prelude::*;
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_single_config_from_toml_file() {
    let file = write_temp(
        ".toml",
        r#"
name = "USD.ZERO"
interpolator = "HymanMonotoneCubicSpline"
left_extrapolator = "FlatExtrapolator"
right_extrapolator = "LinearExtrapolator"
sensitivity = "FiniteDifference"
"#,
    );

    let config = InterpolationConfig::from_file(file.path()).unwrap();
    assert_eq!(config.sensitivity, SensitivityMode::FiniteDifference);

    let combined = config.build().unwrap();
    let bundle = combined
        .data_bundle(&[1.0, 2.0, 5.0, 10.0], &[0.02, 0.025, 0.03, 0.032])
        .unwrap();
    assert_relative_eq!(combined.interpolate(&bundle, 0.5).unwrap(), 0.02);
    let sens = combined.node_sensitivities(&bundle, 3.0).unwrap();
    assert_relative_eq!(sens.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_single_config_from_json_file() {
    let file = write_temp(
        ".json",
        r#"{
            "name": "EUR.DF",
            "interpolator": "LogLinear",
            "left_extrapolator": "QuadraticLeftExtrapolator",
            "quadratic_anchor": 1.0
        }"#,
    );

    let config = InterpolationConfig::from_file(file.path()).unwrap();
    let combined = config.build().unwrap();
    let bundle = combined
        .data_bundle(&[0.25, 1.0, 3.0], &[0.995, 0.98, 0.94])
        .unwrap();

    assert_relative_eq!(combined.interpolate(&bundle, 0.0).unwrap(), 1.0, epsilon = 1e-14);
    assert!(matches!(
        combined.interpolate(&bundle, 4.0),
        Err(kurve_interp::InterpolationError::NoExtrapolator { .. })
    ));
}

#[test]
fn test_config_set_from_file() {
    let file = write_temp(
        ".toml",
        r#"
[[configs]]
name = "DESK.A"
interpolator = "NotAKnotCubicSpline"
left_extrapolator = "LinearExtrapolator"
right_extrapolator = "LinearExtrapolator"

[[configs]]
name = "DESK.B"
interpolator = "ClampedCubicSpline"
end_derivatives = [0.0, 0.01]
knot_tolerance = 1e-12
"#,
    );

    let set = InterpolationConfigSet::new();
    assert_eq!(set.load_file(file.path()).unwrap(), 2);
    assert_eq!(set.names().unwrap().len(), 7);

    let clamped = set.build("DESK.B").unwrap();
    let bundle = clamped
        .data_bundle(&[0.0, 1.0, 2.0, 4.0], &[1.0, 1.2, 1.3, 1.5])
        .unwrap();
    assert_relative_eq!(clamped.first_derivative(&bundle, 0.0).unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(clamped.first_derivative(&bundle, 4.0).unwrap(), 0.01, epsilon = 1e-12);
}

#[test]
fn test_malformed_files() {
    let file = write_temp(".json", r#"{ "name": "X", "interpolator": 3 }"#);
    assert!(matches!(
        InterpolationConfig::from_file(file.path()),
        Err(ConfigError::Deserialization(_))
    ));

    assert!(matches!(
        InterpolationConfig::from_file("/definitely/not/here.toml"),
        Err(ConfigError::Io(_))
    ));
}
