//! Weighted sum of convolved tracks under a fade matrix

use super::{ConvolvedTrack, FadeMatrix};
use crate::error::{AudioError, Result};
use roomwalk_core::{AudioSignal, SampleRate};

/// Compute `blended[n] = sum_i track_i[n] * fade[i][n]`
///
/// Tracks must already be aligned to the matrix length and ordered by
/// environment. Accumulates in f64.
pub fn blend(
    tracks: &[ConvolvedTrack],
    fades: &FadeMatrix,
    sample_rate: SampleRate,
) -> Result<AudioSignal> {
    if tracks.len() != fades.rows() {
        return Err(AudioError::InvalidInput(format!(
            "{} tracks for a fade matrix with {} rows",
            tracks.len(),
            fades.rows()
        )));
    }

    let len = fades.len();
    let mut acc = vec![0.0f64; len];

    for (row, track) in tracks.iter().enumerate() {
        if track.len() != len {
            return Err(AudioError::InvalidInput(format!(
                "track {} has {} samples, expected {}",
                track.environment,
                track.len(),
                len
            )));
        }

        for ((out, &sample), &weight) in acc.iter_mut().zip(&track.samples).zip(fades.row(row)) {
            *out += f64::from(sample) * weight;
        }
    }

    let samples = acc.into_iter().map(|s| s as f32).collect();
    Ok(AudioSignal::new(samples, sample_rate))
}
