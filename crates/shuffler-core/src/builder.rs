//! Building clips from decoded samples and onset boundaries

use tracing::debug;

use crate::clip::AudioClip;
use crate::event::AudioEvent;

/// Samples `[start, start + len)` of `samples`, clamped to what is available.
pub fn extract_window(samples: &[f32], start: usize, len: usize) -> &[f32] {
    let start = start.min(samples.len());
    let end = start.saturating_add(len).min(samples.len());
    &samples[start..end]
}

/// Choose a `(start, len)` window of `duration_secs` inside a recording of
/// `total_frames` frames.
///
/// `start_fraction` (expected in `[0, 1)`) positions the window. Windows that
/// cover most of the recording start at 0; otherwise the start is scaled so
/// the window stays clear of the tail and rounded down to a whole second.
pub fn pick_window(total_frames: usize, sample_rate: u32, start_fraction: f64, duration_secs: f64) -> (usize, usize) {
    if total_frames == 0 || sample_rate == 0 {
        return (0, 0);
    }
    let sample_rate = sample_rate as f64;
    let file_secs = total_frames as f64 / sample_rate;
    let clip_fraction = duration_secs / file_secs;

    let mut start_secs = 0.0;
    if clip_fraction < 0.9 {
        let fraction = start_fraction.clamp(0.0, 1.0) * (0.975 - clip_fraction);
        start_secs = (file_secs * fraction).trunc().max(0.0);
    }

    let start = ((start_secs * sample_rate) as usize).min(total_frames);
    let len = ((duration_secs.max(0.0) * sample_rate) as usize).min(total_frames - start);
    (start, len)
}

/// Partition `samples` into contiguous events at `onsets`.
///
/// Offsets 0 and `samples.len()` are always boundaries; onsets are sorted,
/// de-duplicated, and those outside the stream dropped. With `trim` the first
/// and last events are discarded as likely partial hits, provided at least
/// three events exist.
pub fn build_clip(samples: &[f32], onsets: &[usize], sample_rate: u32, trim: bool) -> AudioClip {
    let mut boundaries: Vec<usize> = onsets
        .iter()
        .copied()
        .filter(|&onset| onset > 0 && onset < samples.len())
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries.insert(0, 0);
    boundaries.push(samples.len());

    let mut events: Vec<AudioEvent> = boundaries
        .windows(2)
        .filter(|pair| pair[1] > pair[0])
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            AudioEvent::new(start, end - start, samples[start..end].to_vec())
        })
        .collect();

    if trim && events.len() >= 3 {
        events.pop();
        events.remove(0);
    }

    debug!(samples = samples.len(), onsets = onsets.len(), events = events.len(), trim, "Built clip");
    AudioClip::new(events, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_build_clip_partitions_stream() {
        let samples = ramp(1000);
        let clip = build_clip(&samples, &[600, 200, 200, 5000], 44100, false);

        assert_eq!(clip.starts(), vec![0, 200, 600]);
        assert_eq!(clip.durations(), vec![200, 400, 400]);
        assert_eq!(clip.total_samples(), 1000);
        assert_eq!(clip.events[1].raw_samples[0], 200.0);
        assert_eq!(clip.events[2].raw_samples.len(), 400);
    }

    #[test]
    fn test_build_clip_without_onsets() {
        let clip = build_clip(&ramp(300), &[], 48000, false);
        assert_eq!(clip.len(), 1);
        assert_eq!(clip.sample_rate, 48000);
        assert!(build_clip(&[], &[0, 10], 44100, false).is_empty());
    }

    #[test]
    fn test_trim_drops_edges() {
        let samples = ramp(1000);
        let clip = build_clip(&samples, &[100, 500, 900], 44100, true);
        assert_eq!(clip.starts(), vec![100, 500]);

        // Too few events to trim
        let clip = build_clip(&samples, &[500], 44100, true);
        assert_eq!(clip.len(), 2);
    }

    #[test]
    fn test_extract_window_clamps() {
        let samples = ramp(100);
        assert_eq!(extract_window(&samples, 90, 50).len(), 10);
        assert!(extract_window(&samples, 500, 50).is_empty());
        assert_eq!(extract_window(&samples, 10, usize::MAX).len(), 90);
    }

    #[test]
    fn test_pick_window() {
        let sr = 44100;
        // 2 s clip out of 20 s, halfway start fraction
        let (start, len) = pick_window(20 * sr as usize, sr, 0.5, 2.0);
        assert_eq!(len, 2 * sr as usize);
        assert_eq!(start, 8 * sr as usize);

        // Window covering most of the file starts at 0 and is clamped
        let (start, len) = pick_window(3 * sr as usize, sr, 0.8, 5.0);
        assert_eq!((start, len), (0, 3 * sr as usize));
    }
}
