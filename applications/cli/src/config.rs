/// Render configuration
use crate::error::{ConfigError, Result};
use roomwalk_audio::pipeline::{RenderJob, RenderOptions};
use roomwalk_audio::resampling::ResamplingQuality;
use roomwalk_audio::{OutputFormat, WavSink};
use roomwalk_core::EnvironmentSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "roomwalk.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "ROOMWALK";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Dry signal file
    #[serde(default)]
    pub dry: Option<PathBuf>,

    /// Rendered output file
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Environments in walking order
    #[serde(default)]
    pub environments: Vec<EnvironmentSpec>,

    #[serde(default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub quality: ResamplingQuality,

    #[serde(default = "default_target_peak")]
    pub target_peak: f32,

    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            quality: ResamplingQuality::default(),
            target_peak: default_target_peak(),
            parallel: default_parallel(),
            format: OutputFormat::default(),
        }
    }
}

impl From<&RenderSettings> for RenderOptions {
    fn from(settings: &RenderSettings) -> Self {
        RenderOptions {
            quality: settings.quality,
            target_peak: settings.target_peak,
            parallel: settings.parallel,
        }
    }
}

impl RenderSettings {
    /// WAV writer for the configured sample format
    pub fn sink(&self) -> WavSink {
        WavSink::new(self.format)
    }
}

fn default_target_peak() -> f32 {
    RenderOptions::default().target_peak
}

fn default_parallel() -> bool {
    true
}

impl RenderConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `roomwalk.toml` in the
    /// working directory is used if present. Variables prefixed with
    /// `ROOMWALK_` override file values, with `__` separating nested keys
    /// (`ROOMWALK_RENDER__TARGET_PEAK=0.8`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment_source())
    }

    /// Load with an explicit environment source
    pub fn load_with_env(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(environment);

        let config = settings.build()?;
        let loaded: Self = config.try_deserialize()?;

        tracing::debug!(
            file = ?path,
            environments = loaded.environments.len(),
            "Loaded configuration"
        );

        Ok(loaded)
    }

    /// Validate everything a render needs
    pub fn validate(&self) -> Result<()> {
        self.validate_inputs()?;

        if self.output.as_deref().map_or(true, |p| p.as_os_str().is_empty()) {
            return Err(ConfigError::invalid(
                "output path is required (set `output` or pass --output)",
            ));
        }

        Ok(())
    }

    /// Validate the inputs, leaving the output path optional
    pub fn validate_inputs(&self) -> Result<()> {
        if self.dry.as_deref().map_or(true, |p| p.as_os_str().is_empty()) {
            return Err(ConfigError::invalid(
                "dry signal path is required (set `dry` or pass --dry)",
            ));
        }

        if self.environments.is_empty() {
            return Err(ConfigError::invalid(
                "at least one environment is required (add [[environments]] or pass --env)",
            ));
        }

        if let Some(env) = self.environments.iter().find(|e| e.ir.as_os_str().is_empty()) {
            return Err(ConfigError::invalid(format!(
                "environment starting at {}s has no impulse response path",
                env.transition.start_secs
            )));
        }

        let peak = self.render.target_peak;
        if !(peak > 0.0 && peak <= 1.0) {
            return Err(ConfigError::invalid(format!(
                "target_peak must be in (0, 1], got {peak}"
            )));
        }

        Ok(())
    }

    /// Validate and convert into a render job
    pub fn into_job(self) -> Result<RenderJob> {
        self.validate()?;
        Ok(self.job())
    }

    /// Validate the inputs and convert into a job whose output may be unset
    pub fn into_plan_job(self) -> Result<RenderJob> {
        self.validate_inputs()?;
        Ok(self.job())
    }

    fn job(self) -> RenderJob {
        let options = RenderOptions::from(&self.render);
        RenderJob::new(
            self.dry.unwrap_or_default(),
            self.environments,
            self.output.unwrap_or_default(),
        )
        .with_options(options)
    }
}

fn environment_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Parse an `IR:START:DURATION` command-line environment
///
/// A bare `IR` is accepted with zero timing, which suits the last
/// environment whose timing is never used. Timing is only read when the text
/// after the last colon is a number, so `C:\irs\hall.wav` is a bare path.
pub fn parse_environment(value: &str) -> Result<EnvironmentSpec> {
    let invalid = |reason: &str| ConfigError::Environment {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("expected IR:START:DURATION"));
    }
    let has_timing = value
        .rsplit_once(':')
        .is_some_and(|(_, last)| last.trim().parse::<f64>().is_ok());
    if !has_timing {
        return Ok(EnvironmentSpec::new(value, 0.0, 0.0));
    }

    // Split from the right so the IR path may itself contain colons
    let mut parts = value.rsplitn(3, ':');
    let (Some(duration), Some(start), Some(ir)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected IR:START:DURATION"));
    };
    if ir.is_empty() {
        return Err(invalid("impulse response path is empty"));
    }

    let seconds = |field: &str, text: &str| -> Result<f64> {
        match text.trim().parse::<f64>() {
            Ok(secs) if secs.is_finite() => Ok(secs),
            _ => Err(invalid(&format!("{field} '{text}' is not a number of seconds"))),
        }
    };

    Ok(EnvironmentSpec::new(
        ir,
        seconds("start", start)?,
        seconds("duration", duration)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_environment() {
        let env = parse_environment("rooms/hall.wav:1.5:0.25").unwrap();
        assert_eq!(env, EnvironmentSpec::new("rooms/hall.wav", 1.5, 0.25));
    }

    #[test]
    fn parses_bare_ir() {
        let env = parse_environment("cave.flac").unwrap();
        assert_eq!(env, EnvironmentSpec::new("cave.flac", 0.0, 0.0));
    }

    #[test]
    fn ir_path_may_contain_colons() {
        let env = parse_environment(r"C:\irs\hall.wav:2:1").unwrap();
        assert_eq!(env.ir, PathBuf::from(r"C:\irs\hall.wav"));
        assert_eq!(env.transition.start_secs, 2.0);
        assert_eq!(env.transition.duration_secs, 1.0);
    }

    #[test]
    fn bare_windows_path_keeps_drive_colon() {
        let env = parse_environment(r"C:\irs\hall.wav").unwrap();
        assert_eq!(env.ir, PathBuf::from(r"C:\irs\hall.wav"));
        assert_eq!(env.transition.start_secs, 0.0);
        assert_eq!(env.transition.duration_secs, 0.0);
    }

    #[test]
    fn rejects_malformed_environments() {
        for value in ["", "hall.wav:1", "hall.wav:soon:1", ":1:1", "hall.wav:1:inf"] {
            assert!(parse_environment(value).is_err(), "{value:?} should be rejected");
        }
    }

    #[test]
    fn default_settings() {
        let settings = RenderSettings::default();
        assert_eq!(settings.quality, ResamplingQuality::High);
        assert!((settings.target_peak - 0.9).abs() < f32::EPSILON);
        assert!(settings.parallel);
        assert_eq!(settings.format, OutputFormat::Pcm16);
    }

    fn valid() -> RenderConfig {
        RenderConfig {
            dry: Some(PathBuf::from("dry.wav")),
            output: Some(PathBuf::from("out.wav")),
            environments: vec![EnvironmentSpec::new("room.wav", 0.0, 0.0)],
            render: RenderSettings::default(),
        }
    }

    #[test]
    fn validation() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.dry = None;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.output = None;
        assert!(config.validate().is_err());
        assert!(config.validate_inputs().is_ok());

        let mut config = valid();
        config.environments.clear();
        assert!(config.validate().is_err());

        for peak in [0.0, -1.0, 1.01] {
            let mut config = valid();
            config.render.target_peak = peak;
            assert!(config.validate().is_err(), "target peak {peak}");
        }
    }

    #[test]
    fn job_carries_options() {
        let mut config = valid();
        config.render.parallel = false;
        config.render.format = OutputFormat::Float32;

        assert_eq!(config.render.sink().format(), OutputFormat::Float32);
        let job = config.into_job().unwrap();
        assert!(!job.options.parallel);
        assert_eq!(job.output, PathBuf::from("out.wav"));
    }
}
