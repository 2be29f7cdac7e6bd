/// Render job description and options
use crate::dsp::DEFAULT_TARGET_PEAK;
use crate::resampling::ResamplingQuality;
use roomwalk_core::EnvironmentSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tuning for a render
///
/// The sample encoding of the written file belongs to the sink, see
/// [`WavSink`](crate::WavSink).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Quality used when an IR must be resampled to the dry signal's rate
    pub quality: ResamplingQuality,
    /// Peak absolute amplitude of the output, in (0, 1]
    pub target_peak: f32,
    /// Process environments on one scoped thread each
    pub parallel: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quality: ResamplingQuality::High,
            target_peak: DEFAULT_TARGET_PEAK,
            parallel: true,
        }
    }
}

/// Everything needed to render one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Dry (unprocessed) signal
    pub dry: PathBuf,
    /// Environments in walking order
    pub environments: Vec<EnvironmentSpec>,
    /// Destination file
    pub output: PathBuf,
    /// Render tuning
    #[serde(default)]
    pub options: RenderOptions,
}

impl RenderJob {
    /// Create a job with default options
    pub fn new(
        dry: impl Into<PathBuf>,
        environments: Vec<EnvironmentSpec>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dry: dry.into(),
            environments,
            output: output.into(),
            options: RenderOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}
