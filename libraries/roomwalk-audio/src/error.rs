/// Audio-specific errors
use crate::resampling::ResamplingError;
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found or unreadable
    #[error("Cannot read {path}: {reason}")]
    FileNotFound {
        /// Path as given
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Encoding error
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// Signal or schedule that cannot be processed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two transition windows overlap or are out of order
    #[error(
        "Transition {index} starts at {start:.3}s, before transition {previous} ends at {previous_end:.3}s"
    )]
    OverlappingTransitions {
        index: usize,
        start: f64,
        previous: usize,
        previous_end: f64,
    },

    /// Sample rate conversion failed
    #[error("Resampling failed: {0}")]
    Resampling(#[from] ResamplingError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => AudioError::Io(e),
            other => AudioError::EncodeError(other.to_string()),
        }
    }
}

impl From<AudioError> for roomwalk_core::RoomwalkError {
    fn from(err: AudioError) -> Self {
        use roomwalk_core::RoomwalkError;

        match err {
            AudioError::FileNotFound { path, reason } => RoomwalkError::missing_file(path, reason),
            AudioError::InvalidInput(msg) => RoomwalkError::InvalidInput(msg),
            err @ AudioError::OverlappingTransitions { .. } => {
                RoomwalkError::InvalidInput(err.to_string())
            }
            AudioError::Resampling(e) => RoomwalkError::RateMismatch(e.to_string()),
            AudioError::Io(e) => RoomwalkError::Io(e),
            other => RoomwalkError::audio(other.to_string()),
        }
    }
}
