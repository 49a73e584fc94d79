//! Mapping one-shot donor sounds onto the source event slots
//!
//! In long mode, a sustained donor is cut into several shorter slices that
//! fill consecutive source slots, instead of spending a whole donor file on a
//! single slot.

use tracing::debug;

use crate::clip::AudioClip;
use crate::event::AudioEvent;

/// Donors longer than this are sliced in long mode (3 s at 44.1 kHz)
pub const ONE_SHOT_SLICE_THRESHOLD: usize = 3 * 44100;
/// Shortest slice cut from a long donor (0.1 s at 44.1 kHz)
pub const SHORTEST_ONE_SHOT: usize = 4410;
/// Upper bound on slices taken from one donor
pub const MAX_SLICES: usize = 100;

/// Slice length and count for a donor of `donor_len` samples filling
/// `remaining` slots.
pub fn slice_plan(donor_len: usize, remaining: usize) -> (usize, usize) {
    if remaining == 0 {
        return (donor_len, 0);
    }
    let slice_len = donor_len / remaining;
    if slice_len < SHORTEST_ONE_SHOT {
        let fits = donor_len / SHORTEST_ONE_SHOT;
        return (SHORTEST_ONE_SHOT, fits.min(remaining).min(MAX_SLICES));
    }
    (slice_len, remaining.min(MAX_SLICES))
}

/// Walks the source slots once, filling each from the donors it is fed.
#[derive(Debug)]
pub struct OneShotSlicer<'a> {
    source: &'a AudioClip,
    long_mode: bool,
    cursor: usize,
    events: Vec<AudioEvent>,
}

impl<'a> OneShotSlicer<'a> {
    pub fn new(source: &'a AudioClip, long_mode: bool) -> Self {
        Self {
            source,
            long_mode,
            cursor: 0,
            events: Vec::with_capacity(source.len()),
        }
    }

    /// Source slots not yet filled
    pub fn remaining(&self) -> usize {
        self.source.len() - self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Map one donor onto the next unfilled slots. Returns how many slots it
    /// filled.
    ///
    /// The first event from a donor takes `fade_in`; later slices from the
    /// same donor always fade in to hide the jump between slices.
    pub fn map_donor(&mut self, donor: &[f32], fade_in: bool) -> usize {
        let remaining = self.remaining();
        if remaining == 0 {
            return 0;
        }

        if !self.long_mode || donor.len() <= ONE_SHOT_SLICE_THRESHOLD {
            self.push(donor, fade_in);
            return 1;
        }

        let (slice_len, count) = slice_plan(donor.len(), remaining);
        debug!(donor_len = donor.len(), remaining, slice_len, count, "Slicing long one-shot");

        for (i, slice) in donor.chunks(slice_len).take(count).enumerate() {
            self.push(slice, fade_in || i > 0);
        }
        count
    }

    fn push(&mut self, samples: &[f32], fade_in: bool) {
        let slot = &self.source.events[self.cursor];
        let mut event = AudioEvent::new(slot.start, slot.duration, samples.to_vec()).with_fade_in(fade_in);
        event.pitch = slot.pitch;
        self.events.push(event);
        self.cursor += 1;
    }

    /// Clip of the filled slots, aligned with the source timeline
    pub fn finish(self, sample_rate: u32) -> AudioClip {
        AudioClip::new(self.events, sample_rate)
    }
}
