//! Round-robin interleaving of the source with substitution clips

use tracing::debug;

use super::{has_material, validate_event_counts, voices};
use crate::clip::AudioClip;
use crate::error::Result;
use crate::event::AudioEvent;
use crate::matching::closest_index;

/// Interleave runs of events from the source and every substitution clip.
///
/// Each voice is treated as cyclically repeated up to the length of the
/// longest voice. Runs of `event_counts[k]` events are then taken from voice
/// after voice, cycling through voices and run lengths, until the voice
/// cursors together cover the common length.
pub fn interleave(
    source: &AudioClip,
    substitutions: &[AudioClip],
    event_counts: &[usize],
) -> Result<Vec<AudioEvent>> {
    validate_event_counts(event_counts)?;
    if !has_material(source, substitutions) {
        return Ok(Vec::new());
    }

    let voices = voices(source, substitutions);
    let common_len = voices.iter().map(|v| v.len()).max().unwrap_or(0);
    let mut cursors = vec![0usize; voices.len()];
    let mut result = Vec::with_capacity(common_len);
    let (mut voice, mut chunk) = (0, 0);

    debug!(voices = voices.len(), common_len, "Interleaving");

    while cursors.iter().sum::<usize>() < common_len {
        let start = cursors[voice];
        let end = (start + event_counts[chunk]).min(common_len);
        cursors[voice] = end;

        let events = &voices[voice].events;
        result.extend((start..end).map(|i| {
            let event = &events[i % events.len()];
            event.placed_at(event.start, event.duration)
        }));

        voice = (voice + 1) % voices.len();
        chunk = (chunk + 1) % event_counts.len();
    }

    Ok(result)
}

/// Time-aligned interleave: one output event per source event.
///
/// A cyclic run-length schedule over `event_counts` picks the active voice for
/// each source slot. The source voice emits its own event; a substitution
/// voice emits the donor audio of its event starting closest to the slot,
/// placed on the slot with fade-in off so spliced runs stay continuous.
pub fn interleave_in_place(
    source: &AudioClip,
    substitutions: &[AudioClip],
    event_counts: &[usize],
) -> Result<Vec<AudioEvent>> {
    validate_event_counts(event_counts)?;
    if !has_material(source, substitutions) {
        return Ok(Vec::new());
    }

    let voices = voices(source, substitutions);
    let starts: Vec<Vec<usize>> = voices.iter().map(|v| v.starts()).collect();
    let (mut voice, mut chunk) = (0, 0);
    let mut run_left = event_counts[0];

    let result = source
        .events
        .iter()
        .map(|event| {
            if run_left == 0 {
                voice = (voice + 1) % voices.len();
                chunk = (chunk + 1) % event_counts.len();
                run_left = event_counts[chunk];
            }
            run_left -= 1;

            if voice == 0 {
                return event.placed_at(event.start, event.duration);
            }

            let donor = &voices[voice].events[closest_index(&starts[voice], event.start)];
            let mut spliced = donor.placed_at(event.start, event.duration).with_fade_in(false);
            spliced.pitch = event.pitch;
            spliced
        })
        .collect();

    Ok(result)
}
