/// Signal types
use crate::error::{Result, RoomwalkError};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz, always strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SampleRate(u32);

impl SampleRate {
    /// Common sample rates
    pub const TELEPHONE: Self = Self(8_000);
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);
    pub const HIGH_RES_96: Self = Self(96_000);

    /// Create a new sample rate
    ///
    /// # Errors
    /// Returns `RoomwalkError::InvalidInput` for a rate of 0 Hz
    pub fn new(hz: u32) -> Result<Self> {
        if hz == 0 {
            return Err(RoomwalkError::invalid_input(
                "sample rate must be strictly positive",
            ));
        }
        Ok(Self(hz))
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }

    /// Time in seconds of the sample at `index`
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 / f64::from(self.0)
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = RoomwalkError;

    fn try_from(hz: u32) -> Result<Self> {
        Self::new(hz)
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.0
    }
}

impl std::fmt::Display for SampleRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Mono audio signal
///
/// Samples are stored as f32, nominally in [-1.0, 1.0] for decoded audio.
/// Intermediate results (convolution output) may exceed that range.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    /// Audio samples
    pub samples: Vec<f32>,

    /// Sample rate of `samples`
    pub sample_rate: SampleRate,
}

impl AudioSignal {
    /// Create a new signal
    pub fn new(samples: Vec<f32>, sample_rate: SampleRate) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a silent signal of `len` samples
    pub fn silence(len: usize, sample_rate: SampleRate) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the signal has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.sample_rate.time_of(self.samples.len())
    }

    /// Largest absolute sample value (0.0 for an empty signal)
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Check if every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}
