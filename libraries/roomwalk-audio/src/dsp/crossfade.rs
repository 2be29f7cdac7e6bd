//! Crossfade scheduling between consecutive environments
//!
//! Builds an N x len table of weights (one row per environment) from the
//! schedule's transition points. Each transition is converted once into a
//! pair of sample-index boundaries, then written into its two rows in a single
//! pass:
//!
//! ```text
//!            ramp_start      ramp_end
//! row i      1 1 1 1 \ \ \ \ 0 0 0 0 0
//! row i+1    0 0 0 0 / / / / 1 1 1 1 1   (until transition i+1 starts)
//!                    |<----->|
//!                 start   start+duration
//! ```
//!
//! The time of sample `n` is `n / sample_rate`. Transitions must not overlap:
//! transition `i + 1` may start exactly when transition `i` ends, never before.

use crate::error::{AudioError, Result};
use roomwalk_core::{SampleRate, Transition};
use serde::Serialize;
use std::fmt;

/// Largest tolerated deviation of a column sum from 1.0
pub const PARTITION_TOLERANCE: f64 = 1e-9;

/// Slack allowed when one transition starts where the previous one ends, to
/// absorb rounding in `start + duration`
const OVERLAP_TOLERANCE_SECS: f64 = 1e-9;

/// Non-fatal problems found while scheduling; the scheduler clamps and
/// carries on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionWarning {
    /// Negative duration, treated as an instantaneous switch
    NegativeDuration {
        /// Transition index
        index: usize,
        /// Requested duration in seconds
        duration: f64,
    },
    /// Negative start, treated as starting at 0s
    NegativeStart {
        /// Transition index
        index: usize,
        /// Requested start in seconds
        start: f64,
    },
    /// Starts at or after the last output sample, so it never takes effect
    StartBeyondTimeline {
        /// Transition index
        index: usize,
        /// Requested start in seconds
        start: f64,
        /// Output duration in seconds
        timeline_secs: f64,
    },
}

impl fmt::Display for TransitionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDuration { index, duration } => write!(
                f,
                "transition {index} has negative duration {duration}s, switching instantly"
            ),
            Self::NegativeStart { index, start } => write!(
                f,
                "transition {index} starts at negative time {start}s, starting at 0s"
            ),
            Self::StartBeyondTimeline {
                index,
                start,
                timeline_secs,
            } => write!(
                f,
                "transition {index} starts at {start}s, at or past the end of the {timeline_secs:.3}s output"
            ),
        }
    }
}

/// Sample-index boundaries of one transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionSpan {
    /// Transition index (between environment `index` and `index + 1`)
    pub index: usize,
    /// Effective start after clamping, in seconds
    pub start_secs: f64,
    /// Effective duration after clamping, in seconds
    pub duration_secs: f64,
    /// First sample with `t >= start`
    pub ramp_start: usize,
    /// First sample with `t > start + duration`; the ramp covers
    /// `ramp_start..ramp_end`
    pub ramp_end: usize,
}

impl TransitionSpan {
    /// Effective end of the crossfade, in seconds
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// Weight of the incoming environment at time `t` within the ramp
    fn alpha(&self, t: f64) -> f64 {
        if self.duration_secs == 0.0 {
            return if t >= self.start_secs { 1.0 } else { 0.0 };
        }
        ((t - self.start_secs) / self.duration_secs).clamp(0.0, 1.0)
    }
}

/// Validated transition boundaries for one timeline
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePlan {
    spans: Vec<TransitionSpan>,
    warnings: Vec<TransitionWarning>,
    len: usize,
}

impl SchedulePlan {
    /// Boundaries per transition, in order
    pub fn spans(&self) -> &[TransitionSpan] {
        &self.spans
    }

    /// Problems that were clamped
    pub fn warnings(&self) -> &[TransitionWarning] {
        &self.warnings
    }

    /// Number of environments (transitions + 1)
    pub fn environments(&self) -> usize {
        self.spans.len() + 1
    }

    /// Timeline length in samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Per-environment, per-sample mixing weights
///
/// Stored row-major: row `i` holds environment `i`'s weight for every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeMatrix {
    rows: usize,
    len: usize,
    weights: Vec<f64>,
}

impl FadeMatrix {
    /// Row 0 fully on, every other row off
    fn initial(rows: usize, len: usize) -> Self {
        let mut weights = vec![0.0; rows * len];
        weights[..len].fill(1.0);
        Self { rows, len, weights }
    }

    /// Number of environments
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of samples per row
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if rows are empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Weights for one environment
    pub fn row(&self, environment: usize) -> &[f64] {
        let start = environment * self.len;
        &self.weights[start..start + self.len]
    }

    /// Weight of `environment` at sample `index`
    pub fn weight(&self, environment: usize, index: usize) -> f64 {
        self.weights[environment * self.len + index]
    }

    /// Sum of all environments' weights at sample `index`
    pub fn column_sum(&self, index: usize) -> f64 {
        (0..self.rows).map(|row| self.weight(row, index)).sum()
    }

    /// Largest `|column_sum - 1|` over the timeline (0.0 when empty)
    pub fn partition_error(&self) -> f64 {
        (0..self.len)
            .map(|n| (self.column_sum(n) - 1.0).abs())
            .fold(0.0, f64::max)
    }

    /// Mutable access to rows `i` and `i + 1`
    fn adjacent_rows_mut(&mut self, i: usize) -> (&mut [f64], &mut [f64]) {
        let len = self.len;
        let (head, tail) = self.weights.split_at_mut((i + 1) * len);
        (&mut head[i * len..], &mut tail[..len])
    }
}

/// Builds fade matrices for a fixed sample rate
#[derive(Debug, Clone, Copy)]
pub struct CrossfadeScheduler {
    sample_rate: SampleRate,
}

impl CrossfadeScheduler {
    /// Create a scheduler for signals at `sample_rate`
    pub fn new(sample_rate: SampleRate) -> Self {
        Self { sample_rate }
    }

    /// Validate `transitions` against a timeline of `len` samples and convert
    /// them to sample boundaries
    ///
    /// `transitions` holds the N-1 effective transitions of an N-environment
    /// schedule.
    pub fn plan(&self, transitions: &[Transition], len: usize) -> Result<SchedulePlan> {
        let timeline_secs = self.sample_rate.time_of(len);
        let mut spans: Vec<TransitionSpan> = Vec::with_capacity(transitions.len());
        let mut warnings = Vec::new();

        for (index, transition) in transitions.iter().enumerate() {
            let Transition {
                start_secs: mut start,
                duration_secs: mut duration,
            } = *transition;

            if !start.is_finite() || !duration.is_finite() {
                return Err(AudioError::InvalidInput(format!(
                    "transition {index} has non-finite timing (start {start}, duration {duration})"
                )));
            }
            if duration < 0.0 {
                warnings.push(TransitionWarning::NegativeDuration { index, duration });
                duration = 0.0;
            }
            if start < 0.0 {
                warnings.push(TransitionWarning::NegativeStart { index, start });
                start = 0.0;
            }
            if start >= timeline_secs {
                warnings.push(TransitionWarning::StartBeyondTimeline {
                    index,
                    start,
                    timeline_secs,
                });
            }

            if let Some(previous) = spans.last() {
                let previous_end = previous.end_secs();
                if start < previous_end - OVERLAP_TOLERANCE_SECS {
                    return Err(AudioError::OverlappingTransitions {
                        index,
                        start,
                        previous: previous.index,
                        previous_end,
                    });
                }
                start = start.max(previous_end);
            }

            spans.push(TransitionSpan {
                index,
                start_secs: start,
                duration_secs: duration,
                ramp_start: self.first_index_at_or_after(start, len),
                ramp_end: self.first_index_after(start + duration, len),
            });
        }

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        Ok(SchedulePlan {
            spans,
            warnings,
            len,
        })
    }

    /// Write every span of `plan` into a fresh matrix
    pub fn build(&self, plan: &SchedulePlan) -> FadeMatrix {
        let mut fades = FadeMatrix::initial(plan.environments(), plan.len);

        for span in &plan.spans {
            let (current, next) = fades.adjacent_rows_mut(span.index);

            for n in span.ramp_start..span.ramp_end {
                let alpha = span.alpha(self.sample_rate.time_of(n));
                current[n] = 1.0 - alpha;
                next[n] = alpha;
            }

            // Fully switched; a later transition overwrites `next` from its own start
            current[span.ramp_end..].fill(0.0);
            next[span.ramp_end..].fill(1.0);
        }

        let partition_error = fades.partition_error();
        tracing::debug!(
            environments = fades.rows(),
            samples = fades.len(),
            partition_error,
            "Fade matrix built"
        );
        debug_assert!(
            partition_error <= PARTITION_TOLERANCE,
            "fade weights do not sum to 1 (error {partition_error})"
        );

        fades
    }

    /// Plan and build in one step
    pub fn schedule(
        &self,
        transitions: &[Transition],
        len: usize,
    ) -> Result<(FadeMatrix, Vec<TransitionWarning>)> {
        let plan = self.plan(transitions, len)?;
        let fades = self.build(&plan);
        Ok((fades, plan.warnings))
    }

    /// First sample index whose time is `>= t`, capped at `len`
    fn first_index_at_or_after(&self, t: f64, len: usize) -> usize {
        if t >= self.sample_rate.time_of(len) {
            return len;
        }
        // The estimate can be one sample off either way after rounding
        let mut n = (t * f64::from(self.sample_rate.as_hz())).ceil().max(0.0) as usize;
        while n > 0 && self.sample_rate.time_of(n - 1) >= t {
            n -= 1;
        }
        while self.sample_rate.time_of(n) < t {
            n += 1;
        }
        n.min(len)
    }

    /// First sample index whose time is `> t`, capped at `len`
    fn first_index_after(&self, t: f64, len: usize) -> usize {
        if t >= self.sample_rate.time_of(len) {
            return len;
        }
        let mut n = (t * f64::from(self.sample_rate.as_hz())).floor().max(0.0) as usize + 1;
        while n > 0 && self.sample_rate.time_of(n - 1) > t {
            n -= 1;
        }
        while self.sample_rate.time_of(n) <= t {
            n += 1;
        }
        n.min(len)
    }
}
