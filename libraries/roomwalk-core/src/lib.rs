//! Roomwalk Core
//!
//! Data model, collaborator traits, and error handling shared by the roomwalk
//! engine and its front ends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Signal Types**: `SampleRate`, `AudioSignal`
//! - **Schedule Types**: `Transition`, `EnvironmentSpec`, `ImpulseResponse`, `TransitionSchedule`
//! - **Collaborator Traits**: `SignalSource` (file -> mono signal), `SignalSink` (signal -> file)
//! - **Error Handling**: Unified `RoomwalkError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use roomwalk_core::{AudioSignal, ImpulseResponse, SampleRate, Transition, TransitionSchedule};
//!
//! let rate = SampleRate::new(8_000).unwrap();
//! let hall = ImpulseResponse::new(
//!     AudioSignal::new(vec![1.0, 0.5, 0.25], rate),
//!     Transition::new(0.5, 0.25),
//! );
//! let booth = ImpulseResponse::new(AudioSignal::new(vec![1.0], rate), Transition::default());
//!
//! let schedule = TransitionSchedule::new(vec![hall, booth]).unwrap();
//! assert_eq!(schedule.transitions().count(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, RoomwalkError};
pub use traits::{SignalSink, SignalSource};

pub use types::{
    // Signal types
    AudioSignal, SampleRate,
    // Schedule types
    EnvironmentSpec, ImpulseResponse, Transition, TransitionSchedule,
};
