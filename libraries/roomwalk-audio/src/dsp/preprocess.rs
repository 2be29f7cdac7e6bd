//! Impulse response preparation

use roomwalk_core::AudioSignal;

/// Scale an IR so its largest absolute sample is exactly 1.0
///
/// An all-zero IR is returned unchanged: it silences its environment, which is
/// valid input. Returns a new signal; the loaded buffer is left untouched.
pub fn normalize_ir(ir: &AudioSignal) -> AudioSignal {
    let peak = ir.peak();
    if peak == 0.0 || peak == 1.0 {
        return ir.clone();
    }

    let samples = ir.samples.iter().map(|&s| s / peak).collect();
    AudioSignal::new(samples, ir.sample_rate)
}
