/// Environment and transition schedule types
use super::audio::{AudioSignal, SampleRate};
use crate::error::{Result, RoomwalkError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// When an environment starts fading out in favor of the next one
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    /// Time the crossfade begins, in seconds from the start of the output
    #[serde(rename = "start")]
    pub start_secs: f64,

    /// Length of the crossfade in seconds (0 = instantaneous switch)
    #[serde(rename = "duration")]
    pub duration_secs: f64,
}

impl Transition {
    /// Create a new transition
    pub fn new(start_secs: f64, duration_secs: f64) -> Self {
        Self {
            start_secs,
            duration_secs,
        }
    }

    /// Time the crossfade completes
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// On-disk description of one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    /// Impulse response file
    pub ir: PathBuf,

    /// Transition to the next environment (ignored for the last one)
    #[serde(flatten)]
    pub transition: Transition,
}

impl EnvironmentSpec {
    /// Create a new environment description
    pub fn new(ir: impl Into<PathBuf>, start_secs: f64, duration_secs: f64) -> Self {
        Self {
            ir: ir.into(),
            transition: Transition::new(start_secs, duration_secs),
        }
    }
}

/// An impulse response tagged with its outgoing transition
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    /// IR samples
    pub signal: AudioSignal,

    /// Transition to the next environment
    pub transition: Transition,
}

impl ImpulseResponse {
    /// Create a new impulse response
    pub fn new(signal: AudioSignal, transition: Transition) -> Self {
        Self { signal, transition }
    }

    /// Sample rate of the IR samples
    pub fn sample_rate(&self) -> SampleRate {
        self.signal.sample_rate
    }
}

/// Ordered list of environments the dry signal travels through
///
/// N environments define N-1 transitions; transition `i` happens between
/// environment `i` and environment `i + 1`. The last environment never fades
/// out, so its transition metadata is carried but unused.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSchedule {
    environments: Vec<ImpulseResponse>,
}

impl TransitionSchedule {
    /// Create a schedule from at least one environment
    ///
    /// # Errors
    /// Returns `RoomwalkError::InvalidInput` for an empty list
    pub fn new(environments: Vec<ImpulseResponse>) -> Result<Self> {
        if environments.is_empty() {
            return Err(RoomwalkError::invalid_input(
                "a schedule needs at least one environment",
            ));
        }
        Ok(Self { environments })
    }

    /// Environments in schedule order
    pub fn environments(&self) -> &[ImpulseResponse] {
        &self.environments
    }

    /// Number of environments (always >= 1)
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// The N-1 effective transitions, in order
    pub fn transitions(&self) -> impl Iterator<Item = Transition> + '_ {
        let count = self.environments.len() - 1;
        self.environments
            .iter()
            .take(count)
            .map(|environment| environment.transition)
    }

    /// Consume the schedule, returning its environments
    pub fn into_environments(self) -> Vec<ImpulseResponse> {
        self.environments
    }
}
