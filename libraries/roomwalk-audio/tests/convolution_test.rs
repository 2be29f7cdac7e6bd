//! Convolution engine tests
//!
//! Verifies the hybrid engine against the direct reference across the
//! FFT/time-domain threshold.

use roomwalk_audio::dsp::{convolve_direct, normalize_ir, ConvolutionEngine};
use roomwalk_core::{AudioSignal, SampleRate};
use std::f32::consts::PI;

/// Generate a mono sine burst
fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Exponentially decaying IR with sparse early reflections
fn room_ir(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let decay = (-(i as f32) * 6.0 / len as f32).exp();
            if i % 7 == 0 {
                decay
            } else {
                decay * 0.1
            }
        })
        .collect()
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

#[test]
fn hybrid_matches_direct_across_threshold() {
    let mut engine = ConvolutionEngine::new();
    let dry = sine(440.0, 8000, 3000);

    for ir_len in [1, 2, 63, 64, 65, 127, 256, 1000] {
        let ir = room_ir(ir_len);
        let hybrid = engine.convolve_samples(&dry, &ir).unwrap();
        let reference = convolve_direct(&dry, &ir).unwrap();

        assert_eq!(hybrid.len(), dry.len() + ir_len - 1, "ir_len {ir_len}");
        let diff = max_abs_diff(&hybrid, &reference);
        assert!(diff < 1e-4, "ir_len {ir_len}: max difference {diff}");
    }
}

#[test]
fn short_dry_signal_with_long_ir() {
    let mut engine = ConvolutionEngine::new();
    let dry = vec![0.25, -0.5, 1.0];
    let ir = room_ir(5000);

    let wet = engine.convolve_samples(&dry, &ir).unwrap();
    let reference = convolve_direct(&dry, &ir).unwrap();

    assert_eq!(wet.len(), 5002);
    assert!(max_abs_diff(&wet, &reference) < 1e-6);
}

#[test]
fn delayed_impulse_delays_signal() {
    let mut engine = ConvolutionEngine::new();
    let dry = sine(1000.0, 48000, 480);
    let mut ir = vec![0.0; 200];
    ir[100] = 1.0;

    let wet = engine.convolve_samples(&dry, &ir).unwrap();

    assert!(wet[..100].iter().all(|s| s.abs() < 1e-6));
    assert!(max_abs_diff(&wet[100..580], &dry) < 1e-5);
}

#[test]
fn engine_is_reusable() {
    let mut engine = ConvolutionEngine::new();
    let dry = sine(300.0, 44100, 2048);
    let ir = room_ir(512);

    let first = engine.convolve_samples(&dry, &ir).unwrap();
    let second = engine.convolve_samples(&dry, &ir).unwrap();
    assert_eq!(first, second);
}

#[test]
fn normalized_ir_convolution_scales_linearly() {
    let rate = SampleRate::CD_QUALITY;
    let raw = AudioSignal::new(room_ir(300).iter().map(|s| s * 0.25).collect(), rate);
    let normalized = normalize_ir(&raw);
    assert!((normalized.peak() - 1.0).abs() < 1e-6);

    let dry = AudioSignal::new(sine(220.0, 44100, 1000), rate);
    let mut engine = ConvolutionEngine::new();
    let from_raw = engine.convolve(&dry, &raw).unwrap();
    let from_normalized = engine.convolve(&dry, &normalized).unwrap();

    for (a, b) in from_raw.samples.iter().zip(&from_normalized.samples) {
        assert!((a * 4.0 - b).abs() < 1e-4);
    }
}
