//! Performance benchmarks for the rendering core
//!
//! Run with: cargo bench -p roomwalk-audio --bench render_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use roomwalk_audio::dsp::{convolve_direct, ConvolutionEngine, CrossfadeScheduler};
use roomwalk_audio::pipeline::{render, RenderOptions};
use roomwalk_core::{AudioSignal, ImpulseResponse, SampleRate, Transition, TransitionSchedule};
use std::f32::consts::PI;

/// Generate a test signal (440 Hz sine wave)
fn generate_test_signal(sample_rate: u32, duration_secs: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Generate an exponentially decaying IR
fn generate_ir(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (-(i as f32) * 6.0 / len as f32).exp() * if i % 3 == 0 { 1.0 } else { -0.3 })
        .collect()
}

fn bench_convolution_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");
    let dry = generate_test_signal(44100, 1.0);
    group.throughput(Throughput::Elements(dry.len() as u64));

    for ir_len in [32, 64, 512, 4410, 44100] {
        let ir = generate_ir(ir_len);

        group.bench_with_input(BenchmarkId::new("hybrid", ir_len), &ir, |b, ir| {
            let mut engine = ConvolutionEngine::new();
            b.iter(|| black_box(engine.convolve_samples(black_box(&dry), ir).unwrap()));
        });

        if ir_len <= 512 {
            group.bench_with_input(BenchmarkId::new("direct", ir_len), &ir, |b, ir| {
                b.iter(|| black_box(convolve_direct(black_box(&dry), ir).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_fade_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("fade_matrix");
    let scheduler = CrossfadeScheduler::new(SampleRate::DVD_QUALITY);

    for environments in [2usize, 8, 32] {
        let len = 48000 * 10;
        let step = 10.0 / environments as f64;
        let transitions: Vec<Transition> = (0..environments - 1)
            .map(|i| Transition::new(step * (i as f64 + 0.5), step * 0.4))
            .collect();

        group.throughput(Throughput::Elements((len * environments) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(environments),
            &transitions,
            |b, transitions| {
                b.iter(|| black_box(scheduler.schedule(black_box(transitions), len).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);

    let rate = SampleRate::CD_QUALITY;
    let dry = AudioSignal::new(generate_test_signal(44100, 2.0), rate);
    let schedule = TransitionSchedule::new(
        (0..4)
            .map(|i| {
                ImpulseResponse::new(
                    AudioSignal::new(generate_ir(11025 * (i + 1)), rate),
                    Transition::new(0.4 * (i as f64 + 1.0), 0.2),
                )
            })
            .collect(),
    )
    .unwrap();

    for parallel in [false, true] {
        let options = RenderOptions {
            parallel,
            ..RenderOptions::default()
        };
        let label = if parallel { "parallel" } else { "serial" };
        group.bench_function(label, |b| {
            b.iter(|| black_box(render(black_box(&dry), &schedule, &options).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_convolution_paths,
    bench_fade_matrix,
    bench_render
);
criterion_main!(benches);
