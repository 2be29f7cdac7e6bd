/// Offline rendering of a dry signal through a sequence of environments
use super::job::{RenderJob, RenderOptions};
use crate::dsp::{
    align_tracks, blend, normalize_ir, ConvolutionEngine, ConvolvedTrack, CrossfadeScheduler,
    OutputNormalizer, TransitionSpan, TransitionWarning,
};
use crate::error::{AudioError, Result};
use crate::resampling::{output_len, resample_signal, ResamplingQuality};
use roomwalk_core::{
    AudioSignal, ImpulseResponse, SignalSink, SignalSource, Transition, TransitionSchedule,
};
use serde::Serialize;
use std::path::Path;

/// What happened to one environment during a render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentReport {
    /// Position in the schedule
    pub index: usize,
    /// Sample rate the IR was recorded at
    pub source_rate: u32,
    /// Whether the IR was resampled to the dry signal's rate
    pub resampled: bool,
    /// IR length after resampling
    pub ir_len: usize,
    /// Convolved track length before alignment
    pub track_len: usize,
}

/// Summary of a render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderReport {
    /// Output sample rate (the dry signal's rate)
    pub sample_rate: u32,
    /// Output length in samples
    pub output_len: usize,
    /// Per-environment details, in schedule order
    pub environments: Vec<EnvironmentReport>,
    /// Effective transition boundaries
    pub spans: Vec<TransitionSpan>,
    /// Degenerate transitions that were clamped
    pub warnings: Vec<TransitionWarning>,
    /// Output peak after normalization
    pub peak: f32,
}

/// Rendered signal plus its report
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// Normalized mono output at the dry signal's rate
    pub signal: AudioSignal,
    /// Summary of the render
    pub report: RenderReport,
}

/// Timeline preview computed without convolving anything
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPlan {
    /// Output sample rate (the dry signal's rate)
    pub sample_rate: u32,
    /// Dry signal length in samples
    pub dry_len: usize,
    /// Output length in samples
    pub output_len: usize,
    /// Effective transition boundaries
    pub spans: Vec<TransitionSpan>,
    /// Degenerate transitions that would be clamped
    pub warnings: Vec<TransitionWarning>,
}

/// Render `dry` through every environment of `schedule`
///
/// Each IR is resampled to the dry signal's rate when needed, peak-normalized
/// and convolved with the dry signal. The convolved tracks are padded to a
/// common length, crossfaded according to the schedule's transitions, summed
/// and normalized to `options.target_peak`.
///
/// # Errors
/// Fails on an empty dry signal or IR, an out-of-range target peak,
/// overlapping transitions, or a resampling failure.
pub fn render(
    dry: &AudioSignal,
    schedule: &TransitionSchedule,
    options: &RenderOptions,
) -> Result<RenderOutput> {
    let render_span = tracing::info_span!(
        "render",
        environments = schedule.len(),
        dry_len = dry.len(),
        sample_rate = dry.sample_rate.as_hz()
    );
    let _guard = render_span.enter();

    if dry.is_empty() {
        return Err(AudioError::InvalidInput("dry signal is empty".to_string()));
    }
    if !(options.target_peak > 0.0 && options.target_peak <= 1.0) {
        return Err(AudioError::InvalidInput(format!(
            "target peak {} is outside (0, 1]",
            options.target_peak
        )));
    }

    let environments = schedule.environments();
    let processed = if options.parallel && environments.len() > 1 {
        std::thread::scope(|scope| {
            let handles: Vec<_> = environments
                .iter()
                .enumerate()
                .map(|(index, ir)| {
                    let span = &render_span;
                    scope.spawn(move || {
                        span.in_scope(|| process_environment(index, dry, ir, options.quality))
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect::<Result<Vec<_>>>()
        })?
    } else {
        environments
            .iter()
            .enumerate()
            .map(|(index, ir)| process_environment(index, dry, ir, options.quality))
            .collect::<Result<Vec<_>>>()?
    };

    let (mut tracks, reports): (Vec<ConvolvedTrack>, Vec<EnvironmentReport>) =
        processed.into_iter().unzip();

    let max_len = align_tracks(&mut tracks);
    tracing::info!(max_len, "Convolved all environments");

    let transitions: Vec<Transition> = schedule.transitions().collect();
    let scheduler = CrossfadeScheduler::new(dry.sample_rate);
    let plan = scheduler.plan(&transitions, max_len)?;
    let fades = scheduler.build(&plan);

    let blended = blend(&tracks, &fades, dry.sample_rate)?;
    let signal = OutputNormalizer::new(options.target_peak).normalize(blended);

    let report = RenderReport {
        sample_rate: dry.sample_rate.as_hz(),
        output_len: signal.len(),
        environments: reports,
        spans: plan.spans().to_vec(),
        warnings: plan.warnings().to_vec(),
        peak: signal.peak(),
    };

    tracing::info!(
        output_len = report.output_len,
        peak = report.peak,
        warnings = report.warnings.len(),
        "Render complete"
    );

    Ok(RenderOutput { signal, report })
}

/// Resample, normalize and convolve one environment
fn process_environment(
    index: usize,
    dry: &AudioSignal,
    ir: &ImpulseResponse,
    quality: ResamplingQuality,
) -> Result<(ConvolvedTrack, EnvironmentReport)> {
    let _span = tracing::debug_span!("environment", index).entered();

    if ir.signal.is_empty() {
        return Err(empty_ir(index));
    }

    let source_rate = ir.sample_rate();
    let resampled = resample_signal(&ir.signal, dry.sample_rate, quality)?;
    let normalized = normalize_ir(&resampled);

    if normalized.is_silent() {
        tracing::warn!(index, "Impulse response is silent; environment contributes nothing");
    }

    let mut engine = ConvolutionEngine::new();
    let samples = engine.convolve_samples(&dry.samples, &normalized.samples)?;

    let report = EnvironmentReport {
        index,
        source_rate: source_rate.as_hz(),
        resampled: source_rate != dry.sample_rate,
        ir_len: normalized.len(),
        track_len: samples.len(),
    };

    tracing::debug!(
        source_rate = report.source_rate,
        resampled = report.resampled,
        ir_len = report.ir_len,
        track_len = report.track_len,
        "Convolved environment"
    );

    Ok((ConvolvedTrack::new(index, samples), report))
}

fn empty_ir(index: usize) -> AudioError {
    AudioError::InvalidInput(format!("impulse response {index} is empty"))
}

/// Load the dry signal and every IR named by `job`
fn load_inputs(
    job: &RenderJob,
    source: &mut dyn SignalSource,
) -> roomwalk_core::Result<(AudioSignal, TransitionSchedule)> {
    let dry = load(source, &job.dry)?;
    tracing::info!(
        path = %job.dry.display(),
        samples = dry.len(),
        sample_rate = dry.sample_rate.as_hz(),
        "Loaded dry signal"
    );

    let environments = job
        .environments
        .iter()
        .map(|environment| {
            let signal = load(source, &environment.ir)?;
            tracing::debug!(
                path = %environment.ir.display(),
                samples = signal.len(),
                sample_rate = signal.sample_rate.as_hz(),
                "Loaded impulse response"
            );
            Ok(ImpulseResponse::new(signal, environment.transition))
        })
        .collect::<roomwalk_core::Result<Vec<_>>>()?;

    Ok((dry, TransitionSchedule::new(environments)?))
}

fn load(source: &mut dyn SignalSource, path: &Path) -> roomwalk_core::Result<AudioSignal> {
    if !source.supports_format(path) {
        tracing::warn!(path = %path.display(), "Unrecognized file extension, probing anyway");
    }
    source.load(path)
}

/// Load, render and write one job
///
/// Nothing is written unless every input loads and the render succeeds.
pub fn render_job(
    job: &RenderJob,
    source: &mut dyn SignalSource,
    sink: &mut dyn SignalSink,
) -> roomwalk_core::Result<RenderReport> {
    let (dry, schedule) = load_inputs(job, source)?;
    let output = render(&dry, &schedule, &job.options)?;
    sink.write(&job.output, &output.signal)?;
    Ok(output.report)
}

/// Compute the transition timeline of `job` without rendering it
///
/// Loads the inputs to learn the output length, which depends on the dry
/// length and every IR's length after resampling.
pub fn plan_job(
    job: &RenderJob,
    source: &mut dyn SignalSource,
) -> roomwalk_core::Result<JobPlan> {
    let (dry, schedule) = load_inputs(job, source)?;
    if dry.is_empty() {
        return Err(AudioError::InvalidInput("dry signal is empty".to_string()).into());
    }

    let rate = dry.sample_rate.as_hz();
    let mut timeline_len = 0;
    for (index, ir) in schedule.environments().iter().enumerate() {
        if ir.signal.is_empty() {
            return Err(empty_ir(index).into());
        }
        let ir_len = output_len(ir.signal.len(), ir.sample_rate().as_hz(), rate);
        timeline_len = timeline_len.max(dry.len() + ir_len - 1);
    }

    let transitions: Vec<Transition> = schedule.transitions().collect();
    let plan = CrossfadeScheduler::new(dry.sample_rate).plan(&transitions, timeline_len)?;

    Ok(JobPlan {
        sample_rate: rate,
        dry_len: dry.len(),
        output_len: timeline_len,
        spans: plan.spans().to_vec(),
        warnings: plan.warnings().to_vec(),
    })
}
