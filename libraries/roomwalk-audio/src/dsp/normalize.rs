//! Final peak normalization

use roomwalk_core::AudioSignal;

/// Default output peak
pub const DEFAULT_TARGET_PEAK: f32 = 0.9;

/// Scales a rendered signal to a fixed peak amplitude
///
/// Silent signals pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputNormalizer {
    target_peak: f32,
}

impl Default for OutputNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_PEAK)
    }
}

impl OutputNormalizer {
    /// Create a normalizer for `target_peak` (clamped to (0, 1])
    pub fn new(target_peak: f32) -> Self {
        Self {
            target_peak: target_peak.clamp(f32::MIN_POSITIVE, 1.0),
        }
    }

    /// Peak the output is scaled to
    pub fn target_peak(&self) -> f32 {
        self.target_peak
    }

    /// Scale `signal` so `max(|sample|) == target_peak`
    pub fn normalize(&self, mut signal: AudioSignal) -> AudioSignal {
        let peak = signal.peak();
        if peak == 0.0 {
            return signal;
        }

        let gain = f64::from(self.target_peak) / f64::from(peak);
        for sample in &mut signal.samples {
            *sample = (f64::from(*sample) * gain) as f32;
        }

        signal
    }
}
