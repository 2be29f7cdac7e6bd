//! Sample rate conversion for impulse responses
//!
//! Impulse responses recorded at a different rate than the dry signal are
//! converted before convolution. Conversion is offline: the whole IR is
//! processed at once, the resampler's measured delay is removed, and the output
//! holds exactly `ceil(len * output_rate / input_rate)` samples.
//!
//! ## Example
//!
//! ```rust
//! use roomwalk_audio::resampling::{Resampler, ResamplingQuality};
//!
//! let mut resampler = Resampler::new(48000, 44100, ResamplingQuality::Balanced).unwrap();
//! let output = resampler.resample(&vec![0.0; 4800]).unwrap();
//! assert_eq!(output.len(), 4410);
//! ```

mod rubato_backend;

use roomwalk_core::{AudioSignal, SampleRate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub use rubato_backend::RubatoResampler;

/// Highest sample rate accepted by the resampler
const MAX_SAMPLE_RATE: u32 = 1_000_000;

/// Resampling errors
#[derive(Error, Debug)]
pub enum ResamplingError {
    #[error("Invalid sample rate: {0} Hz (must be > 0 and <= 1MHz)")]
    InvalidSampleRate(u32),

    #[error("Resampler initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

pub type Result<T> = std::result::Result<T, ResamplingError>;

/// Resampling quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResamplingQuality {
    /// Linear interpolation when upsampling, a short sinc filter when
    /// downsampling
    Fast,

    /// Short sinc filter
    Balanced,

    /// Long sinc filter
    #[default]
    High,

    /// Longest sinc filter
    Maximum,
}

impl ResamplingQuality {
    /// Input frames handed to the resampler per call
    pub fn chunk_size(&self) -> usize {
        match self {
            Self::Fast | Self::Balanced => 1024,
            Self::High => 2048,
            Self::Maximum => 4096,
        }
    }

    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::High => "high",
            Self::Maximum => "maximum",
        }
    }
}

impl FromStr for ResamplingQuality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "high" => Ok(Self::High),
            "maximum" | "max" => Ok(Self::Maximum),
            other => Err(format!(
                "unknown resampling quality '{other}' (expected fast, balanced, high or maximum)"
            )),
        }
    }
}

/// Trait for resampler implementations
pub trait ResamplerImpl: Send {
    /// Convert a complete mono signal
    fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>>;

    /// Get input sample rate
    fn input_rate(&self) -> u32;

    /// Get output sample rate
    fn output_rate(&self) -> u32;

    /// Leading output frames removed to line the output up with the input
    fn latency(&self) -> usize;

    /// Reset internal state
    fn reset(&mut self);
}

/// High-level resampler interface
pub struct Resampler {
    backend: Box<dyn ResamplerImpl>,
}

impl Resampler {
    /// Create a new mono resampler
    pub fn new(input_rate: u32, output_rate: u32, quality: ResamplingQuality) -> Result<Self> {
        if input_rate == 0 || input_rate > MAX_SAMPLE_RATE {
            return Err(ResamplingError::InvalidSampleRate(input_rate));
        }
        if output_rate == 0 || output_rate > MAX_SAMPLE_RATE {
            return Err(ResamplingError::InvalidSampleRate(output_rate));
        }

        Ok(Self {
            backend: Box::new(RubatoResampler::new(input_rate, output_rate, quality)?),
        })
    }

    /// Convert a complete mono signal
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.backend.resample(input)
    }

    /// Get input sample rate
    pub fn input_rate(&self) -> u32 {
        self.backend.input_rate()
    }

    /// Get output sample rate
    pub fn output_rate(&self) -> u32 {
        self.backend.output_rate()
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        self.backend.reset();
    }

    /// Output length for `input_samples` samples
    pub fn calculate_output_size(&self, input_samples: usize) -> usize {
        output_len(input_samples, self.input_rate(), self.output_rate())
    }
}

/// `ceil(len * output_rate / input_rate)` in exact integer arithmetic
pub(crate) fn output_len(len: usize, input_rate: u32, output_rate: u32) -> usize {
    let numerator = len as u128 * u128::from(output_rate);
    numerator.div_ceil(u128::from(input_rate)) as usize
}

/// Convert `signal` to `target`, cloning when the rates already match
pub fn resample_signal(
    signal: &AudioSignal,
    target: SampleRate,
    quality: ResamplingQuality,
) -> Result<AudioSignal> {
    if signal.sample_rate == target {
        return Ok(signal.clone());
    }
    if signal.is_empty() {
        return Ok(AudioSignal::new(Vec::new(), target));
    }

    let mut resampler = Resampler::new(signal.sample_rate.as_hz(), target.as_hz(), quality)?;
    let samples = resampler.resample(&signal.samples)?;

    tracing::debug!(
        from = signal.sample_rate.as_hz(),
        to = target.as_hz(),
        input_len = signal.len(),
        output_len = samples.len(),
        "Resampled signal"
    );

    Ok(AudioSignal::new(samples, target))
}
