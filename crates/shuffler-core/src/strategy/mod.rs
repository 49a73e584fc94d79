//! Resequencing strategies: turn a source clip plus substitution clips into a
//! new ordered run of events
//!
//! Every strategy is a single forward pass over already-decoded clips. Inputs
//! are never mutated; the result owns fresh copies of every event it emits.
//! A source without events, no substitution clips, or a first substitution
//! clip without events all produce an empty result.

mod interleave;
mod shuffle;

pub use interleave::{interleave, interleave_in_place};
pub use shuffle::shuffle_by_duration;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clip::AudioClip;
use crate::error::{Result, ShufflerError};
use crate::event::AudioEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    #[default]
    ShuffleByDuration,
    Interleave,
    InterleaveInPlace,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Self::ShuffleByDuration, Self::Interleave, Self::InterleaveInPlace];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ShuffleByDuration => "ShuffleByDuration",
            Self::Interleave => "Interleave",
            Self::InterleaveInPlace => "InterleaveInPlace",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ShufflerError;

    /// Case-insensitive, ignoring `-` and `_` (`interleave-in-place` works).
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().to_ascii_lowercase() == key)
            .ok_or_else(|| ShufflerError::UnknownStrategy(s.to_string()))
    }
}

/// Tuning shared by all strategies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
    /// Rescale candidate durations into the source's duration range before matching
    pub normalize_durations: bool,
    /// Cyclic run lengths for the interleaving strategies
    pub event_counts: Vec<usize>,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            normalize_durations: false,
            event_counts: vec![1],
        }
    }
}

impl StrategyOptions {
    pub fn validate(&self) -> Result<()> {
        validate_event_counts(&self.event_counts)
    }
}

pub(crate) fn validate_event_counts(event_counts: &[usize]) -> Result<()> {
    if event_counts.is_empty() || event_counts.contains(&0) {
        return Err(ShufflerError::InvalidEventCounts(event_counts.to_vec()));
    }
    Ok(())
}

/// Whether there is anything to resequence at all
pub(crate) fn has_material(source: &AudioClip, substitutions: &[AudioClip]) -> bool {
    !source.is_empty() && substitutions.first().is_some_and(|clip| !clip.is_empty())
}

/// Source as voice 0 followed by every non-empty substitution clip.
pub(crate) fn voices<'a>(source: &'a AudioClip, substitutions: &'a [AudioClip]) -> Vec<&'a AudioClip> {
    std::iter::once(source)
        .chain(substitutions.iter().filter(|clip| !clip.is_empty()))
        .collect()
}

/// Run `strategy` over the clips.
pub fn run_strategy(
    strategy: Strategy,
    source: &AudioClip,
    substitutions: &[AudioClip],
    options: &StrategyOptions,
) -> Result<Vec<AudioEvent>> {
    debug!(
        strategy = %strategy,
        source_events = source.len(),
        substitution_clips = substitutions.len(),
        normalize = options.normalize_durations,
        event_counts = ?options.event_counts,
        "Running strategy"
    );

    let events = match strategy {
        Strategy::ShuffleByDuration => {
            shuffle_by_duration(source, substitutions, options.normalize_durations)?
        }
        Strategy::Interleave => interleave(source, substitutions, &options.event_counts)?,
        Strategy::InterleaveInPlace => {
            interleave_in_place(source, substitutions, &options.event_counts)?
        }
    };

    debug!(strategy = %strategy, result_events = events.len(), "Strategy finished");
    Ok(events)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::clip::{AudioClip, DEFAULT_SAMPLE_RATE};
    use crate::event::AudioEvent;

    /// Contiguous clip whose events carry `tag` as every sample value
    pub fn tagged_clip(durations: &[usize], tag: f32) -> AudioClip {
        let mut start = 0;
        let events = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let event = AudioEvent::new(start, d, vec![tag + i as f32; d]);
                start += d;
                event
            })
            .collect();
        AudioClip::new(events, DEFAULT_SAMPLE_RATE)
    }
}
