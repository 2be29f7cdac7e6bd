//! Roomwalk Audio
//!
//! Rendering of a dry signal as heard while walking through a sequence of
//! acoustic environments.
//!
//! This crate provides:
//! - Signal loading via Symphonia (MP3, FLAC, OGG, WAV, AAC), averaged to mono
//! - Impulse response resampling via rubato
//! - FFT convolution, crossfade scheduling, blending and peak normalization
//! - Atomic WAV output via hound
//!
//! # Example: Rendering in memory
//!
//! ```rust
//! use roomwalk_audio::pipeline::{render, RenderOptions};
//! use roomwalk_core::{AudioSignal, ImpulseResponse, SampleRate, Transition, TransitionSchedule};
//!
//! let rate = SampleRate::TELEPHONE;
//! let dry = AudioSignal::new(vec![0.5; 8000], rate);
//!
//! let small_room = AudioSignal::new(vec![1.0, 0.5, 0.25], rate);
//! let hall = AudioSignal::new(vec![1.0, 0.0, 0.0, 0.8, 0.0, 0.6], rate);
//!
//! let schedule = TransitionSchedule::new(vec![
//!     ImpulseResponse::new(small_room, Transition::new(0.5, 0.25)),
//!     ImpulseResponse::new(hall, Transition::default()),
//! ])
//! .unwrap();
//!
//! let output = render(&dry, &schedule, &RenderOptions::default()).unwrap();
//! assert_eq!(output.signal.len(), 8000 + 6 - 1);
//! assert!((output.signal.peak() - 0.9).abs() < 1e-6);
//! ```
//!
//! # Example: Rendering files
//!
//! ```rust,no_run
//! use roomwalk_audio::pipeline::{render_job, RenderJob};
//! use roomwalk_audio::{SymphoniaSource, WavSink};
//! use roomwalk_core::EnvironmentSpec;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let job = RenderJob::new(
//!     "voice.wav",
//!     vec![
//!         EnvironmentSpec::new("corridor.wav", 2.0, 1.5),
//!         EnvironmentSpec::new("cathedral.wav", 0.0, 0.0),
//!     ],
//!     "walk.wav",
//! );
//!
//! let report = render_job(&job, &mut SymphoniaSource::new(), &mut WavSink::default())?;
//! println!("Rendered {} samples at {} Hz", report.output_len, report.sample_rate);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
pub mod dsp;
mod encoder;
mod error;
pub mod pipeline;
pub mod resampling;

pub use decoder::SymphoniaSource;
pub use encoder::{OutputFormat, WavSink};
pub use error::{AudioError, Result};
