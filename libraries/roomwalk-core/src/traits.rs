/// Collaborator traits for loading and storing signals
use crate::error::Result;
use crate::types::AudioSignal;
use std::path::Path;

/// Signal source trait
///
/// Implementers load an audio file into a mono `AudioSignal` at the file's
/// own sample rate. Multi-channel files are reduced to mono by averaging the
/// channels.
pub trait SignalSource: Send {
    /// Load the whole file at `path`
    ///
    /// # Errors
    /// Returns `RoomwalkError::MissingFile` if the file cannot be located or
    /// opened, and an audio error if it cannot be decoded
    fn load(&mut self, path: &Path) -> Result<AudioSignal>;

    /// Check if the source can read the given file format
    fn supports_format(&self, path: &Path) -> bool;
}

/// Signal sink trait
///
/// Implementers persist a rendered signal. A sink either writes the complete
/// file or leaves nothing behind.
pub trait SignalSink: Send {
    /// Write `signal` to `path` at the signal's sample rate
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or encoded
    fn write(&mut self, path: &Path, signal: &AudioSignal) -> Result<()>;
}
