/// Signal loading implemented with Symphonia
use crate::error::{AudioError, Result};
use roomwalk_core::{AudioSignal, SampleRate, SignalSource};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Signal source using Symphonia
///
/// Supports: MP3, FLAC, OGG/Vorbis, WAV, AAC/M4A
///
/// Every file is decoded in full and reduced to a mono signal by averaging
/// its channels, at the sample rate the file declares.
#[derive(Debug, Default)]
pub struct SymphoniaSource;

impl SymphoniaSource {
    /// Create a new source
    pub fn new() -> Self {
        Self
    }

    /// Decode the whole file at `path` to mono
    pub fn decode_file(&self, path: &Path) -> Result<AudioSignal> {
        if !path.exists() {
            return Err(unreadable(path, "not found"));
        }
        if !path.is_file() {
            return Err(unreadable(path, "not a regular file"));
        }

        let file = std::fs::File::open(path).map_err(|e| unreadable(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| match e {
                SymphoniaError::IoError(io) if io.kind() != std::io::ErrorKind::UnexpectedEof => {
                    unreadable(path, io)
                }
                other => AudioError::UnsupportedFormat(format!("{}: {}", path.display(), other)),
            })?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::DecodeError("No audio tracks found".to_string()))?;

        let sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
            AudioError::DecodeError(format!("{} declares no sample rate", path.display()))
        })?;
        let sample_rate = SampleRate::new(sample_rate)
            .map_err(|e| AudioError::DecodeError(e.to_string()))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Symphonia(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::IoError(e)) => return Err(unreadable(path, e)),
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(AudioError::Symphonia(format!(
                        "Error reading packet: {}",
                        e
                    )));
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => append_mono(decoded, &mut samples),
                Err(SymphoniaError::DecodeError(e)) => {
                    skipped_packets += 1;
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping undecodable packet"
                    );
                }
                Err(e) => return Err(AudioError::DecodeError(e.to_string())),
            }
        }

        tracing::debug!(
            path = %path.display(),
            samples = samples.len(),
            sample_rate = sample_rate.as_hz(),
            skipped_packets,
            "Decoded signal"
        );

        Ok(AudioSignal::new(samples, sample_rate))
    }
}

impl SignalSource for SymphoniaSource {
    fn load(&mut self, path: &Path) -> roomwalk_core::Result<AudioSignal> {
        Ok(self.decode_file(path)?)
    }

    fn supports_format(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            matches!(
                ext.to_lowercase().as_str(),
                "mp3" | "flac" | "ogg" | "wav" | "wave" | "m4a" | "aac"
            )
        } else {
            false
        }
    }
}

fn unreadable(path: &Path, reason: impl ToString) -> AudioError {
    AudioError::FileNotFound {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Append one decoded packet to `out`, converted to f32 and averaged to mono
fn append_mono(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
    // Signed integers use symmetric scaling (divide by 2^(N-1)); unsigned
    // integers are re-centered around zero first
    match decoded {
        AudioBufferRef::F32(buf) => average_channels(&buf, out, |s| s),
        AudioBufferRef::F64(buf) => average_channels(&buf, out, |s| s as f32),
        AudioBufferRef::S32(buf) => average_channels(&buf, out, |s| s as f32 / 2_147_483_648.0),
        AudioBufferRef::S24(buf) => {
            average_channels(&buf, out, |s| s.inner() as f32 / 8_388_608.0);
        }
        AudioBufferRef::S16(buf) => average_channels(&buf, out, |s| f32::from(s) / 32_768.0),
        AudioBufferRef::S8(buf) => average_channels(&buf, out, |s| f32::from(s) / 128.0),
        AudioBufferRef::U32(buf) => {
            average_channels(&buf, out, |s| (f64::from(s) / 2_147_483_648.0 - 1.0) as f32);
        }
        AudioBufferRef::U24(buf) => {
            average_channels(&buf, out, |s| s.inner() as f32 / 8_388_608.0 - 1.0);
        }
        AudioBufferRef::U16(buf) => {
            average_channels(&buf, out, |s| f32::from(s) / 32_768.0 - 1.0);
        }
        AudioBufferRef::U8(buf) => average_channels(&buf, out, |s| f32::from(s) / 128.0 - 1.0),
    }
}

fn average_channels<T, F>(buf: &AudioBuffer<T>, out: &mut Vec<f32>, to_f32: F)
where
    T: Sample + Copy,
    F: Fn(T) -> f32,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();

    if channels == 0 {
        out.resize(out.len() + frames, 0.0);
        return;
    }

    if channels == 1 {
        out.extend(buf.chan(0).iter().map(|&s| to_f32(s)));
        return;
    }

    let start = out.len();
    out.resize(start + frames, 0.0);
    let mixed = &mut out[start..];
    for ch in 0..channels {
        for (acc, &s) in mixed.iter_mut().zip(buf.chan(ch)) {
            *acc += to_f32(s);
        }
    }

    let scale = 1.0 / channels as f32;
    for s in mixed.iter_mut() {
        *s *= scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomwalk_core::RoomwalkError;

    #[test]
    fn supports_common_formats() {
        let source = SymphoniaSource::new();
        assert!(source.supports_format(Path::new("room.wav")));
        assert!(source.supports_format(Path::new("room.WAV")));
        assert!(source.supports_format(Path::new("dry.flac")));
        assert!(source.supports_format(Path::new("dry.mp3")));
        assert!(!source.supports_format(Path::new("notes.txt")));
        assert!(!source.supports_format(Path::new("no_extension")));
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let mut source = SymphoniaSource::new();
        let result = source.load(Path::new("/nonexistent/room.wav"));
        assert!(matches!(result, Err(RoomwalkError::MissingFile { .. })));
    }

    #[test]
    fn directory_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.wav");
        std::fs::create_dir(&path).unwrap();

        let result = SymphoniaSource::new().load(&path);
        assert!(matches!(result, Err(RoomwalkError::MissingFile { .. })), "{result:?}");
    }

    #[test]
    fn garbage_file_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        let result = SymphoniaSource::new().decode_file(&path);
        assert!(result.is_err());
    }
}
