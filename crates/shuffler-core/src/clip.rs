//! Audio clips: an ordered run of events plus format metadata

use crate::event::AudioEvent;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Events in playback order. Mono only, so `num_channels` stays at 1.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub events: Vec<AudioEvent>,
    pub sample_rate: u32,
    pub num_channels: u16,
}

impl Default for AudioClip {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_SAMPLE_RATE)
    }
}

impl AudioClip {
    pub fn new(events: Vec<AudioEvent>, sample_rate: u32) -> Self {
        Self {
            events,
            sample_rate,
            num_channels: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Destination slot lengths, in event order
    pub fn durations(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.duration).collect()
    }

    /// Destination start offsets, in event order
    pub fn starts(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.start).collect()
    }

    /// Shortest and longest event duration, `None` for an empty clip
    pub fn duration_range(&self) -> Option<(usize, usize)> {
        let min = self.events.iter().map(|e| e.duration).min()?;
        let max = self.events.iter().map(|e| e.duration).max()?;
        Some((min, max))
    }

    /// Sum of event slot lengths
    pub fn total_samples(&self) -> usize {
        self.events.iter().map(|e| e.duration).sum()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.total_samples() as f64 / self.sample_rate as f64
    }

    /// Concatenate every event's faded audio in playback order.
    pub fn render(&mut self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.total_samples());
        for event in &mut self.events {
            out.extend_from_slice(event.audio_data());
        }
        out
    }
}
