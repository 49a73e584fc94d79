//! WAV encoding of result clips

use std::path::Path;

use shuffler_core::AudioClip;
use tracing::info;

use crate::error::Result;

/// Write every event's faded audio, in order, as 32-bit float WAV.
/// Returns the number of samples written.
pub fn write_clip(path: &Path, clip: &mut AudioClip) -> Result<usize> {
    let spec = hound::WavSpec {
        channels: clip.num_channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let mut written = 0;
    for event in &mut clip.events {
        for &sample in event.audio_data() {
            writer.write_sample(sample)?;
        }
        written += event.audio_data().len();
    }
    writer.finalize()?;

    info!(path = %path.display(), samples = written, events = clip.len(), "Wrote clip");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::read_mono;
    use shuffler_core::AudioEvent;

    #[test]
    fn test_write_then_read() {
        let path = std::env::temp_dir().join(format!("shuffler-encode-{}.wav", std::process::id()));
        let events = vec![
            AudioEvent::new(0, 50, vec![0.25; 80]),
            AudioEvent::new(50, 30, vec![-0.5; 30]),
        ];
        let mut clip = AudioClip::new(events, 32000);

        assert_eq!(write_clip(&path, &mut clip).unwrap(), 80);

        let audio = read_mono(&path).unwrap();
        assert_eq!(audio.sample_rate, 32000);
        assert_eq!(audio.samples.len(), 80);
        assert_eq!(audio.samples[0], 0.25);
        assert_eq!(audio.samples[79], -0.5);

        std::fs::remove_file(&path).ok();
    }
}
