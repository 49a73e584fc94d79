//! Audio events: one spliceable fragment placed on a destination timeline

use crate::fade::apply_fade;

/// A contiguous audio fragment with a destination placement and donor samples.
///
/// `start` and `duration` describe where the event lands in the timeline it is
/// played back in, which need not be where `raw_samples` were read from.
///
/// The faded audio is computed once and cached. Changing `raw_samples`,
/// `should_fade_in` or `duration` after the first access does not refresh
/// the cache; call [`AudioEvent::recompute_fade`] or
/// [`AudioEvent::invalidate_fade`] to pick up the change.
#[derive(Debug, Clone)]
pub struct AudioEvent {
    /// Placement in the destination timeline (samples)
    pub start: usize,
    /// Length of the destination slot (samples)
    pub duration: usize,
    /// Reserved for pitch analysis, always 0 for now
    pub pitch: i32,
    /// Donor audio, mono
    pub raw_samples: Vec<f32>,
    /// Reserved for loudness analysis, always 0.0 for now
    pub rms: f32,
    /// When false only the fade-out is applied
    pub should_fade_in: bool,
    faded: Option<Vec<f32>>,
}

impl AudioEvent {
    pub fn new(start: usize, duration: usize, raw_samples: Vec<f32>) -> Self {
        Self {
            start,
            duration,
            pitch: 0,
            raw_samples,
            rms: 0.0,
            should_fade_in: true,
            faded: None,
        }
    }

    pub fn with_fade_in(mut self, should_fade_in: bool) -> Self {
        self.should_fade_in = should_fade_in;
        self
    }

    /// End of the destination slot
    pub fn end(&self) -> usize {
        self.start + self.duration
    }

    /// Deep copy of this event's donor audio moved to a new slot.
    ///
    /// The copy starts with an empty fade cache so its fades follow the new
    /// duration.
    pub fn placed_at(&self, start: usize, duration: usize) -> Self {
        Self {
            start,
            duration,
            pitch: self.pitch,
            raw_samples: self.raw_samples.clone(),
            rms: self.rms,
            should_fade_in: self.should_fade_in,
            faded: None,
        }
    }

    /// Faded audio, computing and caching it on first call.
    pub fn compute_or_get_faded(&mut self) -> &[f32] {
        let (raw, fade_in, duration) = (&self.raw_samples, self.should_fade_in, self.duration);
        self.faded.get_or_insert_with(|| apply_fade(raw, fade_in, duration))
    }

    /// Audio handed to the encoder
    pub fn audio_data(&mut self) -> &[f32] {
        self.compute_or_get_faded()
    }

    /// Cached faded audio, if it has been computed
    pub fn faded_samples(&self) -> Option<&[f32]> {
        self.faded.as_deref()
    }

    /// Drop the cached fade so the next access recomputes it
    pub fn invalidate_fade(&mut self) {
        self.faded = None;
    }

    /// Rebuild the fade from the current inputs right away
    pub fn recompute_fade(&mut self) -> &[f32] {
        self.invalidate_fade();
        self.compute_or_get_faded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fade::{fade_in_curve, fade_out_curve};

    #[test]
    fn test_fade_regions() {
        let mut event = AudioEvent::new(0, 1000, vec![1.0; 1000]);
        let faded = event.compute_or_get_faded().to_vec();

        assert_eq!(faded.len(), 1000);
        for (i, gain) in fade_in_curve().iter().enumerate() {
            assert_eq!(faded[i], *gain);
        }
        for (i, gain) in fade_out_curve().iter().enumerate() {
            assert_eq!(faded[118 + i], *gain);
        }
        assert!(faded[88..118].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_fade_is_memoized() {
        let mut event = AudioEvent::new(0, 1000, vec![1.0; 1000]);
        let first = event.compute_or_get_faded().as_ptr();
        let second = event.compute_or_get_faded().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stale_cache_until_recompute() {
        let mut event = AudioEvent::new(0, 1000, vec![1.0; 1000]);
        assert_eq!(event.compute_or_get_faded()[0], 0.0);

        event.should_fade_in = false;
        event.duration = 500;
        assert_eq!(event.compute_or_get_faded().len(), 1000);

        let refreshed = event.recompute_fade();
        assert_eq!(refreshed.len(), 500);
        assert_eq!(refreshed[0], 1.0);
    }

    #[test]
    fn test_invalidate_clears_cache() {
        let mut event = AudioEvent::new(0, 1000, vec![1.0; 1000]);
        event.audio_data();
        assert!(event.faded_samples().is_some());
        event.invalidate_fade();
        assert!(event.faded_samples().is_none());
    }

    #[test]
    fn test_placed_at_is_deep_copy() {
        let mut donor = AudioEvent::new(10, 1000, vec![0.5; 1000]);
        donor.audio_data();

        let mut placed = donor.placed_at(200, 300);
        assert!(placed.faded_samples().is_none());
        placed.raw_samples[0] = 0.0;

        assert_eq!(donor.raw_samples[0], 0.5);
        assert_eq!(donor.start, 10);
        assert_eq!(placed.audio_data().len(), 300);
    }
}
