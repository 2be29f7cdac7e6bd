/// WAV output implemented with hound
use crate::error::{AudioError, Result};
use roomwalk_core::{AudioSignal, SignalSink};
use serde::{Deserialize, Serialize};
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

/// Sample encoding of the rendered WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit signed PCM
    #[default]
    Pcm16,
    /// 24-bit signed PCM
    Pcm24,
    /// 32-bit IEEE float
    Float32,
}

impl OutputFormat {
    /// Bits per stored sample
    pub fn bits_per_sample(&self) -> u16 {
        match self {
            Self::Pcm16 => 16,
            Self::Pcm24 => 24,
            Self::Float32 => 32,
        }
    }

    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm16 => "pcm16",
            Self::Pcm24 => "pcm24",
            Self::Float32 => "float32",
        }
    }

    fn wav_spec(self, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: self.bits_per_sample(),
            sample_format: match self {
                Self::Pcm16 | Self::Pcm24 => hound::SampleFormat::Int,
                Self::Float32 => hound::SampleFormat::Float,
            },
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pcm16" | "16" => Ok(Self::Pcm16),
            "pcm24" | "24" => Ok(Self::Pcm24),
            "float32" | "f32" | "float" => Ok(Self::Float32),
            other => Err(format!(
                "unknown output format '{other}' (expected pcm16, pcm24 or float32)"
            )),
        }
    }
}

const PCM16_SCALE: f32 = 32_768.0;
const PCM24_SCALE: f32 = 8_388_608.0;

fn to_pcm(sample: f32, scale: f32) -> i32 {
    (sample * scale).round().clamp(-scale, scale - 1.0) as i32
}

/// Mono WAV writer
///
/// The file is written to a temporary file next to the destination and moved
/// into place once complete, so a failed write never leaves a truncated file
/// at the destination path.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavSink {
    format: OutputFormat,
}

impl WavSink {
    /// Create a sink writing `format`
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Sample encoding used by this sink
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encode `signal` to `path`
    pub fn write_file(&self, path: &Path, signal: &AudioSignal) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = tempfile::Builder::new()
            .prefix(".roomwalk-")
            .suffix(".wav.part")
            .tempfile_in(dir)?;

        {
            let spec = self.format.wav_spec(signal.sample_rate.as_hz());
            let mut writer = hound::WavWriter::new(BufWriter::new(tmp.as_file()), spec)?;

            // Same 2^(N-1) scale the decoder divides by; full scale positive
            // input clips to the largest code
            match self.format {
                OutputFormat::Pcm16 => {
                    for &s in &signal.samples {
                        writer.write_sample(to_pcm(s, PCM16_SCALE) as i16)?;
                    }
                }
                OutputFormat::Pcm24 => {
                    for &s in &signal.samples {
                        writer.write_sample(to_pcm(s, PCM24_SCALE))?;
                    }
                }
                OutputFormat::Float32 => {
                    for &s in &signal.samples {
                        writer.write_sample(s)?;
                    }
                }
            }

            writer.finalize()?;
        }

        tmp.persist(path).map_err(|e| AudioError::Io(e.error))?;

        tracing::info!(
            path = %path.display(),
            samples = signal.len(),
            sample_rate = signal.sample_rate.as_hz(),
            format = self.format.as_str(),
            "Wrote output"
        );

        Ok(())
    }
}

impl SignalSink for WavSink {
    fn write(&mut self, path: &Path, signal: &AudioSignal) -> roomwalk_core::Result<()> {
        Ok(self.write_file(path, signal)?)
    }
}
