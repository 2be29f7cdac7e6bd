/// Core error types for roomwalk
use thiserror::Error;

/// Result type alias using `RoomwalkError`
pub type Result<T> = std::result::Result<T, RoomwalkError>;

/// Core error type for roomwalk
#[derive(Error, Debug)]
pub enum RoomwalkError {
    /// The dry signal or an impulse response could not be located or read
    #[error("Missing file: {path}: {reason}")]
    MissingFile { path: String, reason: String },

    /// A signal or schedule that cannot be processed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sample rate conversion failed
    #[error("Sample rate mismatch: {0}")]
    RateMismatch(String),

    /// Decoding, encoding or DSP errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RoomwalkError {
    /// Create a missing file error
    pub fn missing_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a rate mismatch error
    pub fn rate_mismatch(msg: impl Into<String>) -> Self {
        Self::RateMismatch(msg.into())
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }
}
