//! DSP core of the renderer
//!
//! All stages operate on whole mono signals held in memory:
//! - **normalize_ir**: peak-normalize an impulse response to 1.0
//! - **ConvolutionEngine**: full linear convolution (FFT, or direct for short IRs)
//! - **align_tracks**: right-pad convolved tracks to a common length
//! - **CrossfadeScheduler**: per-environment fade weights from the transition schedule
//! - **blend**: weighted sum of tracks under the fade weights
//! - **OutputNormalizer**: scale the result to a fixed peak

mod align;
mod blend;
mod convolution;
mod crossfade;
mod normalize;
mod preprocess;

pub use align::align_tracks;
pub use blend::blend;
pub use convolution::{convolve_direct, ConvolutionEngine, ConvolvedTrack};
pub use crossfade::{
    CrossfadeScheduler, FadeMatrix, SchedulePlan, TransitionSpan, TransitionWarning,
    PARTITION_TOLERANCE,
};
pub use normalize::{OutputNormalizer, DEFAULT_TARGET_PEAK};
pub use preprocess::normalize_ir;
