mod audio;
mod environment;

pub use audio::{AudioSignal, SampleRate};
pub use environment::{EnvironmentSpec, ImpulseResponse, Transition, TransitionSchedule};
