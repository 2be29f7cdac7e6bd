//! Configuration layering tests
//!
//! Environment variables are supplied through an explicit map so tests never
//! touch the process environment.

use roomwalk_audio::resampling::ResamplingQuality;
use roomwalk_audio::OutputFormat;
use roomwalk_cli::{ConfigError, InputArgs, RenderConfig};
use roomwalk_core::EnvironmentSpec;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn env(vars: &[(&str, &str)]) -> config::Environment {
    let map: config::Map<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    config::Environment::with_prefix("ROOMWALK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(Some(map))
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("walk.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

const WALK: &str = r#"
dry = "voice.wav"
output = "walk.wav"

[[environments]]
ir = "corridor.wav"
start = 2.0
duration = 1.5

[[environments]]
ir = "cathedral.wav"

[render]
quality = "balanced"
format = "pcm24"
"#;

#[test]
fn loads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, WALK);

    let config = RenderConfig::load_with_env(Some(&path), env(&[])).unwrap();

    assert_eq!(config.dry, Some(PathBuf::from("voice.wav")));
    assert_eq!(config.output, Some(PathBuf::from("walk.wav")));
    assert_eq!(
        config.environments,
        vec![
            EnvironmentSpec::new("corridor.wav", 2.0, 1.5),
            EnvironmentSpec::new("cathedral.wav", 0.0, 0.0),
        ]
    );
    assert_eq!(config.render.quality, ResamplingQuality::Balanced);
    assert_eq!(config.render.format, OutputFormat::Pcm24);
    assert!((config.render.target_peak - 0.9).abs() < f32::EPSILON);
    assert!(config.render.parallel);
    assert!(config.validate().is_ok());
}

#[test]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, WALK);

    let config = RenderConfig::load_with_env(
        Some(&path),
        env(&[
            ("ROOMWALK_OUTPUT", "elsewhere.wav"),
            ("ROOMWALK_RENDER__TARGET_PEAK", "0.5"),
            ("ROOMWALK_RENDER__PARALLEL", "false"),
        ]),
    )
    .unwrap();

    assert_eq!(config.output, Some(PathBuf::from("elsewhere.wav")));
    assert!((config.render.target_peak - 0.5).abs() < f32::EPSILON);
    assert!(!config.render.parallel);
    assert_eq!(config.environments.len(), 2);
}

#[test]
fn flags_override_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, WALK);

    let mut config = RenderConfig::load_with_env(
        Some(&path),
        env(&[("ROOMWALK_RENDER__TARGET_PEAK", "0.5")]),
    )
    .unwrap();

    let args = InputArgs {
        target_peak: Some(0.7),
        environments: vec![EnvironmentSpec::new("booth.wav", 0.0, 0.0)],
        ..InputArgs::default()
    };
    args.apply_to(&mut config);

    assert!((config.render.target_peak - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.environments, vec![EnvironmentSpec::new("booth.wav", 0.0, 0.0)]);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let result = RenderConfig::load_with_env(Some(Path::new("/nonexistent/walk.toml")), env(&[]));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn empty_configuration_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");

    let config = RenderConfig::load_with_env(Some(&path), env(&[])).unwrap();

    assert_eq!(config, RenderConfig::default());
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn unknown_quality_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[render]\nquality = \"ludicrous\"\n");

    assert!(RenderConfig::load_with_env(Some(&path), env(&[])).is_err());
}
