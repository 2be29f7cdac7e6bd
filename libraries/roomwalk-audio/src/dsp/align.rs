//! Length alignment of convolved tracks

use super::ConvolvedTrack;

/// Right-pad every track with silence to the length of the longest one
///
/// Returns the common length. Existing samples are kept exactly.
pub fn align_tracks(tracks: &mut [ConvolvedTrack]) -> usize {
    let max_len = tracks.iter().map(ConvolvedTrack::len).max().unwrap_or(0);

    for track in tracks.iter_mut() {
        track.samples.resize(max_len, 0.0);
    }

    max_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_longest() {
        let mut tracks = vec![
            ConvolvedTrack::new(0, vec![0.5, 0.25]),
            ConvolvedTrack::new(1, vec![0.1, 0.2, 0.3, 0.4]),
            ConvolvedTrack::new(2, vec![-1.0]),
        ];

        let max_len = align_tracks(&mut tracks);

        assert_eq!(max_len, 4);
        assert_eq!(tracks[0].samples, vec![0.5, 0.25, 0.0, 0.0]);
        assert_eq!(tracks[1].samples, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(tracks[2].samples, vec![-1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_no_tracks() {
        assert_eq!(align_tracks(&mut []), 0);
    }
}
