//! Full linear convolution of a dry signal with an impulse response
//!
//! Uses FFT-based convolution (zero-pad, multiply, inverse transform) for
//! efficient processing of long impulse responses, with direct time-domain
//! convolution for very short IRs. Both paths produce the full-mode result of
//! length `dry.len() + ir.len() - 1` and are computed in f64.
//!
//! # Example
//!
//! ```rust
//! use roomwalk_audio::dsp::ConvolutionEngine;
//!
//! let mut engine = ConvolutionEngine::new();
//! let wet = engine.convolve_samples(&[1.0, 0.0, 0.0], &[0.5, 0.3, 0.1]).unwrap();
//! assert_eq!(wet.len(), 5);
//! ```

use crate::error::{AudioError, Result};
use roomwalk_core::{AudioSignal, SampleRate};
use rustfft::{num_complex::Complex, FftPlanner};

/// IRs at or below this length are convolved directly in the time domain
const TIME_DOMAIN_THRESHOLD: usize = 64;

/// Minimum FFT size for efficient processing
const MIN_FFT_SIZE: usize = 256;

/// Result of convolving the dry signal with one environment's IR
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolvedTrack {
    /// Index of the environment in the schedule
    pub environment: usize,
    /// Convolved samples
    pub samples: Vec<f32>,
}

impl ConvolvedTrack {
    /// Create a new track
    pub fn new(environment: usize, samples: Vec<f32>) -> Self {
        Self {
            environment,
            samples,
        }
    }

    /// Length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the track has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Convert into a signal at `sample_rate`
    pub fn into_signal(self, sample_rate: SampleRate) -> AudioSignal {
        AudioSignal::new(self.samples, sample_rate)
    }
}

/// Convolution engine
///
/// Holds an FFT planner so repeated convolutions of the same size reuse their
/// plans. One engine per worker thread.
pub struct ConvolutionEngine {
    planner: FftPlanner<f64>,
}

impl Default for ConvolutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvolutionEngine {
    /// Create a new convolution engine
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Convolve `dry` with `ir`
    ///
    /// Both signals must share a sample rate; resample the IR first.
    pub fn convolve(&mut self, dry: &AudioSignal, ir: &AudioSignal) -> Result<AudioSignal> {
        if dry.sample_rate != ir.sample_rate {
            return Err(AudioError::InvalidInput(format!(
                "cannot convolve a {} signal with a {} impulse response",
                dry.sample_rate, ir.sample_rate
            )));
        }

        let samples = self.convolve_samples(&dry.samples, &ir.samples)?;
        Ok(AudioSignal::new(samples, dry.sample_rate))
    }

    /// Convolve raw sample slices, choosing the FFT or direct path
    pub fn convolve_samples(&mut self, dry: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
        check_non_empty(dry, ir)?;

        if ir.len() <= TIME_DOMAIN_THRESHOLD || dry.len() <= TIME_DOMAIN_THRESHOLD {
            Ok(direct(dry, ir))
        } else {
            Ok(self.convolve_fft(dry, ir))
        }
    }

    /// FFT convolution: zero-pad both inputs to a power of two at least as
    /// long as the full output, multiply spectra, inverse transform
    fn convolve_fft(&mut self, dry: &[f32], ir: &[f32]) -> Vec<f32> {
        let output_len = dry.len() + ir.len() - 1;
        let fft_size = output_len.next_power_of_two().max(MIN_FFT_SIZE);

        let fft_forward = self.planner.plan_fft_forward(fft_size);
        let fft_inverse = self.planner.plan_fft_inverse(fft_size);

        let mut dry_spectrum = zero_padded(dry, fft_size);
        let mut ir_spectrum = zero_padded(ir, fft_size);

        fft_forward.process(&mut dry_spectrum);
        fft_forward.process(&mut ir_spectrum);

        for (d, h) in dry_spectrum.iter_mut().zip(ir_spectrum.iter()) {
            *d *= h;
        }

        fft_inverse.process(&mut dry_spectrum);

        // rustfft does not normalize the inverse transform
        let scale = 1.0 / fft_size as f64;
        dry_spectrum
            .iter()
            .take(output_len)
            .map(|c| (c.re * scale) as f32)
            .collect()
    }
}

/// Direct time-domain full convolution
///
/// O(dry * ir). Used for short IRs and as the reference the FFT path is
/// verified against.
pub fn convolve_direct(dry: &[f32], ir: &[f32]) -> Result<Vec<f32>> {
    check_non_empty(dry, ir)?;
    Ok(direct(dry, ir))
}

fn direct(dry: &[f32], ir: &[f32]) -> Vec<f32> {
    let mut acc = vec![0.0f64; dry.len() + ir.len() - 1];

    for (i, &d) in dry.iter().enumerate() {
        if d == 0.0 {
            continue;
        }
        let d = f64::from(d);
        for (out, &h) in acc[i..].iter_mut().zip(ir) {
            *out += d * f64::from(h);
        }
    }

    acc.into_iter().map(|s| s as f32).collect()
}

fn check_non_empty(dry: &[f32], ir: &[f32]) -> Result<()> {
    if dry.is_empty() {
        return Err(AudioError::InvalidInput(
            "dry signal is empty".to_string(),
        ));
    }
    if ir.is_empty() {
        return Err(AudioError::InvalidInput(
            "impulse response is empty".to_string(),
        ));
    }
    Ok(())
}

fn zero_padded(samples: &[f32], fft_size: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); fft_size];
    for (slot, &s) in buffer.iter_mut().zip(samples) {
        *slot = Complex::new(f64::from(s), 0.0);
    }
    buffer
}
