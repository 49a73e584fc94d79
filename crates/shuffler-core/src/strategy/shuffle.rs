//! Nearest-duration substitution

use tracing::debug;

use super::has_material;
use crate::clip::AudioClip;
use crate::error::Result;
use crate::event::AudioEvent;
use crate::matching::{closest_index, normalize};

/// Replace every source event with the substitution event closest in duration.
///
/// Candidates are pooled across all substitution clips. The chosen candidate
/// is copied and moved onto the source event's slot, so output order and
/// placement follow the source exactly. With `normalize_durations`, candidate
/// durations are first rescaled into the source's duration range.
pub fn shuffle_by_duration(
    source: &AudioClip,
    substitutions: &[AudioClip],
    normalize_durations: bool,
) -> Result<Vec<AudioEvent>> {
    if !has_material(source, substitutions) {
        return Ok(Vec::new());
    }

    let candidates: Vec<&AudioEvent> = substitutions.iter().flat_map(|clip| &clip.events).collect();
    let mut durations: Vec<usize> = candidates.iter().map(|e| e.duration).collect();

    if normalize_durations {
        if let Some((min, max)) = source.duration_range() {
            durations = normalize(&durations, min, max)?;
            debug!(source_min = min, source_max = max, "Normalized candidate durations");
        }
    }

    Ok(source
        .events
        .iter()
        .map(|event| {
            let donor = candidates[closest_index(&durations, event.duration)];
            donor.placed_at(event.start, event.duration)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShufflerError;
    use crate::strategy::test_support::tagged_clip;

    #[test]
    fn test_substitutes_nearest_duration() {
        let source = tagged_clip(&[100, 500], 0.0);
        let subs = vec![tagged_clip(&[90, 600], 10.0)];

        let result = shuffle_by_duration(&source, &subs, false).unwrap();
        assert_eq!(result.len(), 2);

        assert_eq!((result[0].start, result[0].duration), (0, 100));
        assert_eq!(result[0].raw_samples, subs[0].events[0].raw_samples);

        assert_eq!((result[1].start, result[1].duration), (100, 500));
        assert_eq!(result[1].raw_samples, subs[0].events[1].raw_samples);
    }

    #[test]
    fn test_pools_all_substitution_clips() {
        let source = tagged_clip(&[300], 0.0);
        let subs = vec![tagged_clip(&[50], 10.0), tagged_clip(&[290], 20.0)];

        let result = shuffle_by_duration(&source, &subs, false).unwrap();
        assert_eq!(result[0].raw_samples[0], 20.0);
    }

    #[test]
    fn test_normalized_matching() {
        // Candidates live on a 10x scale; normalized they map onto 100..500
        let source = tagged_clip(&[100, 500], 0.0);
        let subs = vec![tagged_clip(&[1000, 3000, 5000], 10.0)];

        let plain = shuffle_by_duration(&source, &subs, false).unwrap();
        assert_eq!(plain[1].raw_samples[0], 10.0);

        let scaled = shuffle_by_duration(&source, &subs, true).unwrap();
        assert_eq!(scaled[0].raw_samples[0], 10.0);
        assert_eq!(scaled[1].raw_samples[0], 12.0);
        assert_eq!(scaled[1].duration, 500);
    }

    #[test]
    fn test_degenerate_candidate_range() {
        let source = tagged_clip(&[100, 500], 0.0);
        let subs = vec![tagged_clip(&[200, 200], 10.0)];
        assert!(matches!(
            shuffle_by_duration(&source, &subs, true),
            Err(ShufflerError::DegenerateRange(200))
        ));
    }

    #[test]
    fn test_same_candidate_copied_independently() {
        let source = tagged_clip(&[100, 110], 0.0);
        let subs = vec![tagged_clip(&[105], 10.0)];

        let mut result = shuffle_by_duration(&source, &subs, false).unwrap();
        result[0].raw_samples.clear();
        assert_eq!(result[1].raw_samples.len(), 105);
        assert_eq!(subs[0].events[0].start, 0);
        assert_eq!(result[1].start, 100);
        assert_eq!(result[1].audio_data().len(), 105);
    }
}
