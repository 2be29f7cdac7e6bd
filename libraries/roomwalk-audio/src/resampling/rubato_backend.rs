//! Rubato resampler backend
//!
//! Offline mono conversion with the rubato crate. Input is fed in fixed-size
//! chunks behind a short run of zeros, the last partial chunk is zero-padded,
//! and the filter tail is drained. The offset between input and output time
//! is measured once per resampler by passing an impulse through it, and
//! exactly that many leading frames are dropped from every result.

use super::{output_len, ResamplerImpl, ResamplingError, ResamplingQuality, Result};
use rubato::{
    FastFixedIn, PolynomialDegree, Resampler as RubatoResamplerTrait, SincFixedIn,
    SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Headroom for the resample ratio; the ratio never changes after creation
const MAX_RESAMPLE_RATIO_RELATIVE: f64 = 2.0;

/// Input frames spanned by rubato's polynomial interpolator
const POLYNOMIAL_KERNEL_LEN: usize = 8;

/// Enum to hold the rubato resampler types we use
enum RubatoResamplerType {
    Fast(FastFixedIn<f32>),
    Sinc(SincFixedIn<f32>),
}

/// Rubato-based mono resampler
pub struct RubatoResampler {
    resampler: RubatoResamplerType,
    input_rate: u32,
    output_rate: u32,
    ratio: f64,
    /// Input frames the interpolation kernel spans
    kernel_len: usize,
    /// Zeros fed ahead of every signal, in input frames
    lead_in: usize,
    /// Output frames dropped from the front of every result
    offset: usize,
}

impl RubatoResampler {
    /// Create a new rubato resampler
    ///
    /// `Fast` uses polynomial interpolation only when upsampling. Decimating
    /// without an anti-aliasing filter can drop short transients entirely, so
    /// downsampling always goes through a sinc filter.
    pub fn new(input_rate: u32, output_rate: u32, quality: ResamplingQuality) -> Result<Self> {
        let ratio = f64::from(output_rate) / f64::from(input_rate);
        let chunk_size = quality.chunk_size();

        let (resampler, kernel_len) = if quality == ResamplingQuality::Fast && ratio >= 1.0 {
            let fast = FastFixedIn::new(
                ratio,
                MAX_RESAMPLE_RATIO_RELATIVE,
                PolynomialDegree::Linear,
                chunk_size,
                1,
            )
            .map_err(|e| {
                ResamplingError::InitializationFailed(format!(
                    "FastFixedIn creation failed: {}",
                    e
                ))
            })?;
            (RubatoResamplerType::Fast(fast), POLYNOMIAL_KERNEL_LEN)
        } else {
            let params = Self::quality_to_params(quality);
            let sinc_len = params.sinc_len;
            let sinc = SincFixedIn::<f32>::new(
                ratio,
                MAX_RESAMPLE_RATIO_RELATIVE,
                params,
                chunk_size,
                1,
            )
            .map_err(|e| {
                ResamplingError::InitializationFailed(format!(
                    "SincFixedIn creation failed: {}",
                    e
                ))
            })?;
            (RubatoResamplerType::Sinc(sinc), sinc_len)
        };

        // Enough zeros that the earliest output frame lies before input time 0
        let lead_in = kernel_len + input_rate.div_ceil(output_rate) as usize + 1;

        let mut resampler = Self {
            resampler,
            input_rate,
            output_rate,
            ratio,
            kernel_len,
            lead_in,
            offset: 0,
        };
        resampler.offset = resampler.measure_offset()?;
        resampler.reset();

        tracing::trace!(
            input_rate,
            output_rate,
            quality = quality.as_str(),
            offset = resampler.offset,
            "Created resampler"
        );

        Ok(resampler)
    }

    /// Convert quality preset to sinc filter parameters
    fn quality_to_params(quality: ResamplingQuality) -> SincInterpolationParameters {
        match quality {
            ResamplingQuality::Fast => SincInterpolationParameters {
                sinc_len: 64,
                f_cutoff: 0.9,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 128,
                window: WindowFunction::Blackman,
            },
            ResamplingQuality::Balanced => SincInterpolationParameters {
                sinc_len: 128,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris,
            },
            ResamplingQuality::High => SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.99,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 512,
                window: WindowFunction::BlackmanHarris,
            },
            ResamplingQuality::Maximum => SincInterpolationParameters {
                sinc_len: 512,
                f_cutoff: 0.995,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 1024,
                window: WindowFunction::BlackmanHarris2,
            },
        }
    }

    /// Output frame at which an impulse fed at input frame 0 is centred
    ///
    /// The impulse is placed well clear of the start, and its arrival is the
    /// energy centroid of the whole response. The kernel is symmetric, so the
    /// centroid lands on the true sub-sample position.
    fn measure_offset(&mut self) -> Result<usize> {
        let position = 2 * self.kernel_len;
        let mut impulse = vec![0.0f32; position + 1];
        impulse[position] = 1.0;

        let span = position + self.lead_in + 2 * self.kernel_len;
        let min_output = (span as f64 * self.ratio).ceil() as usize + 2;
        let response = self.run(&impulse, min_output)?;

        let (weighted, total) = response
            .iter()
            .enumerate()
            .fold((0.0f64, 0.0f64), |(weighted, total), (n, &s)| {
                let energy = f64::from(s) * f64::from(s);
                (weighted + n as f64 * energy, total + energy)
            });

        if total <= f64::EPSILON {
            return Err(ResamplingError::InitializationFailed(format!(
                "{} Hz -> {} Hz resampler passes no signal",
                self.input_rate, self.output_rate
            )));
        }

        let arrival = weighted / total - position as f64 * self.ratio;
        Ok(arrival.round().max(0.0) as usize)
    }

    /// Feed the lead-in and `input`, then drain until at least `min_output`
    /// frames are available
    fn run(&mut self, input: &[f32], min_output: usize) -> Result<Vec<f32>> {
        let mut padded = vec![0.0f32; self.lead_in];
        padded.extend_from_slice(input);

        let mut output = Vec::with_capacity(min_output);

        let mut pos = 0;
        loop {
            let needed = self.input_frames_next();
            if padded.len() - pos < needed {
                break;
            }
            let chunk = self.process_chunk(&padded[pos..pos + needed])?;
            output.extend_from_slice(&chunk);
            pos += needed;
        }

        if pos < padded.len() {
            let chunk = self.process_partial(Some(&padded[pos..]))?;
            output.extend_from_slice(&chunk);
        }

        while output.len() < min_output {
            let tail = self.process_partial(None)?;
            if tail.is_empty() {
                break;
            }
            output.extend_from_slice(&tail);
        }

        Ok(output)
    }

    /// Input frames required by the next full-chunk call
    fn input_frames_next(&self) -> usize {
        match &self.resampler {
            RubatoResamplerType::Fast(r) => r.input_frames_next(),
            RubatoResamplerType::Sinc(r) => r.input_frames_next(),
        }
    }

    /// Process exactly `input_frames_next()` samples
    fn process_chunk(&mut self, chunk: &[f32]) -> Result<Vec<f32>> {
        let wave_in: [&[f32]; 1] = [chunk];
        let mut output = match &mut self.resampler {
            RubatoResamplerType::Fast(r) => r.process(&wave_in[..], None),
            RubatoResamplerType::Sinc(r) => r.process(&wave_in[..], None),
        }
        .map_err(|e| ResamplingError::ProcessingFailed(format!("chunk resampling failed: {}", e)))?;

        Ok(output.swap_remove(0))
    }

    /// Process a short final chunk, or a chunk of silence when `chunk` is
    /// `None`
    fn process_partial(&mut self, chunk: Option<&[f32]>) -> Result<Vec<f32>> {
        let wave_in: Option<[&[f32]; 1]> = chunk.map(|c| [c]);
        let wave_in = wave_in.as_ref().map(|w| &w[..]);
        let mut output = match &mut self.resampler {
            RubatoResamplerType::Fast(r) => r.process_partial(wave_in, None),
            RubatoResamplerType::Sinc(r) => r.process_partial(wave_in, None),
        }
        .map_err(|e| ResamplingError::ProcessingFailed(format!("flush failed: {}", e)))?;

        Ok(output.swap_remove(0))
    }
}

impl ResamplerImpl for RubatoResampler {
    fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        // 1:1 passthrough - avoid filtering when rates match
        if self.input_rate == self.output_rate {
            return Ok(input.to_vec());
        }

        self.reset();

        let expected = output_len(input.len(), self.input_rate, self.output_rate);
        let output = self.run(input, self.offset + expected)?;

        let mut samples: Vec<f32> = output.into_iter().skip(self.offset).take(expected).collect();
        samples.resize(expected, 0.0);
        Ok(samples)
    }

    fn input_rate(&self) -> u32 {
        self.input_rate
    }

    fn output_rate(&self) -> u32 {
        self.output_rate
    }

    fn latency(&self) -> usize {
        self.offset
    }

    fn reset(&mut self) {
        match &mut self.resampler {
            RubatoResamplerType::Fast(r) => r.reset(),
            RubatoResamplerType::Sinc(r) => r.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argmax_abs(samples: &[f32]) -> usize {
        samples
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    #[test]
    fn test_rubato_creation() {
        let resampler = RubatoResampler::new(44100, 96000, ResamplingQuality::Balanced).unwrap();
        assert_eq!(resampler.input_rate(), 44100);
        assert_eq!(resampler.output_rate(), 96000);
    }

    #[test]
    fn test_empty_input() {
        let mut resampler = RubatoResampler::new(44100, 96000, ResamplingQuality::Fast).unwrap();
        assert!(resampler.resample(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_passthrough_when_rates_match() {
        let mut resampler = RubatoResampler::new(48000, 48000, ResamplingQuality::High).unwrap();
        let input = vec![0.1, 0.2, -0.3];
        assert_eq!(resampler.resample(&input).unwrap(), input);
    }

    #[test]
    fn test_output_length_for_every_quality() {
        for quality in [
            ResamplingQuality::Fast,
            ResamplingQuality::Balanced,
            ResamplingQuality::High,
            ResamplingQuality::Maximum,
        ] {
            let mut down = RubatoResampler::new(48000, 44100, quality).unwrap();
            assert_eq!(down.resample(&vec![0.1; 10_000]).unwrap().len(), 9188, "{quality:?}");

            let mut up = RubatoResampler::new(22050, 44100, quality).unwrap();
            assert_eq!(up.resample(&vec![0.1; 777]).unwrap().len(), 1554, "{quality:?}");
        }
    }

    const ALL_QUALITIES: [ResamplingQuality; 4] = [
        ResamplingQuality::Fast,
        ResamplingQuality::Balanced,
        ResamplingQuality::High,
        ResamplingQuality::Maximum,
    ];

    const RATE_PAIRS: [(u32, u32); 4] = [(48000, 44100), (44100, 48000), (48000, 8000), (8000, 48000)];

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum()
    }

    /// Peak amplitude and energy an impulse should keep at `ratio`
    fn minimum_level(ratio: f64) -> (f32, f32) {
        let scale = ratio.min(1.0) as f32;
        (0.3 * scale, 0.3 * scale * scale)
    }

    #[test]
    fn test_impulse_lands_at_scaled_position() {
        let position = 1000;
        let mut impulse = vec![0.0f32; 2000];
        impulse[position] = 1.0;

        for quality in ALL_QUALITIES {
            for (from, to) in RATE_PAIRS {
                let ratio = f64::from(to) / f64::from(from);
                let mut resampler = RubatoResampler::new(from, to, quality).unwrap();
                let output = resampler.resample(&impulse).unwrap();

                let peak_at = argmax_abs(&output);
                let expected_at = position as f64 * ratio;
                assert!(
                    (peak_at as f64 - expected_at).abs() <= 1.0,
                    "{quality:?} {from}->{to}: peak at {peak_at}, expected {expected_at:.2}"
                );

                let (min_peak, min_energy) = minimum_level(ratio);
                assert!(
                    output[peak_at].abs() >= min_peak,
                    "{quality:?} {from}->{to}: peak {}",
                    output[peak_at]
                );
                assert!(
                    energy(&output) >= min_energy,
                    "{quality:?} {from}->{to}: energy {}",
                    energy(&output)
                );
            }
        }
    }

    #[test]
    fn test_onset_at_first_sample_is_kept() {
        for quality in ALL_QUALITIES {
            for (from, to) in RATE_PAIRS {
                for len in [5, 100] {
                    let mut ir = vec![0.0f32; len];
                    ir[0] = 1.0;

                    let ratio = f64::from(to) / f64::from(from);
                    let mut resampler = RubatoResampler::new(from, to, quality).unwrap();
                    let output = resampler.resample(&ir).unwrap();

                    let (min_peak, _) = minimum_level(ratio);
                    assert_eq!(argmax_abs(&output), 0, "{quality:?} {from}->{to} len {len}");
                    assert!(
                        output[0] >= min_peak,
                        "{quality:?} {from}->{to} len {len}: first sample {}",
                        output[0]
                    );
                }
            }
        }
    }

    #[test]
    fn test_large_downsampling_keeps_energy() {
        for quality in ALL_QUALITIES {
            for len in [2000, 4000, 20_000] {
                let mut input = vec![0.0f32; len];
                input[1000] = 1.0;

                let mut resampler = RubatoResampler::new(48000, 8000, quality).unwrap();
                let output = resampler.resample(&input).unwrap();

                assert_eq!(output.len(), len.div_ceil(6));
                assert!(energy(&output) > 0.005, "{quality:?} len {len}");
                assert!(
                    output.iter().fold(0.0f32, |m, s| m.max(s.abs())) > 0.05,
                    "{quality:?} len {len}"
                );
            }
        }
    }

    #[test]
    fn test_repeated_calls_match() {
        let mut input = vec![0.0f32; 3000];
        input[10] = 1.0;
        input[1500] = -0.5;

        let mut resampler = RubatoResampler::new(44100, 48000, ResamplingQuality::High).unwrap();
        let first = resampler.resample(&input).unwrap();
        let second = resampler.resample(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dc_level_is_preserved() {
        let mut resampler = RubatoResampler::new(32000, 48000, ResamplingQuality::High).unwrap();
        let output = resampler.resample(&vec![0.5; 8000]).unwrap();

        // Away from the edges the level is unchanged
        let middle = output[output.len() / 2];
        assert!((middle - 0.5).abs() < 0.01, "middle sample {middle}");
    }
}
