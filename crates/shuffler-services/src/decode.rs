//! WAV decoding to mono f32
//!
//! `hound` handles standard files; a small RIFF walker takes over for files
//! with extended `fmt ` chunks that `hound` refuses.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use shuffler_core::{extract_window, pick_window};
use tracing::{debug, warn};

use crate::error::{AudioFileError, Result};

/// Decoded mono audio
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the file before down-mixing
    pub source_channels: u16,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Read a WAV file, keeping only its first (left) channel.
pub fn read_mono(path: &Path) -> Result<DecodedAudio> {
    let (interleaved, channels, sample_rate) = match read_with_hound(path) {
        Ok(decoded) => decoded,
        Err(AudioFileError::Wav(e)) => {
            warn!(path = %path.display(), error = %e, "hound rejected file, trying RIFF fallback");
            read_riff(path)?
        }
        Err(e) => return Err(e),
    };

    let samples = first_channel(&interleaved, channels as usize);
    debug!(path = %path.display(), frames = samples.len(), channels, sample_rate, "Decoded");
    Ok(DecodedAudio { samples, sample_rate, source_channels: channels })
}

/// Decode `path` and cut a window of `duration_secs` positioned by
/// `start_fraction`. Windows past the end of the file are clamped.
pub fn read_window(path: &Path, start_fraction: f64, duration_secs: f64) -> Result<DecodedAudio> {
    let mut audio = read_mono(path)?;
    let (start, len) = pick_window(audio.samples.len(), audio.sample_rate, start_fraction, duration_secs);
    audio.samples = extract_window(&audio.samples, start, len).to_vec();
    Ok(audio)
}

/// Every `channels`-th sample starting at the first.
pub fn first_channel(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved.iter().step_by(channels).copied().collect()
}

fn read_with_hound(path: &Path) -> Result<(Vec<f32>, u16, u32)> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<std::result::Result<_, _>>()?
        }
    };
    Ok((samples, spec.channels, spec.sample_rate))
}

fn read_riff(path: &Path) -> Result<(Vec<f32>, u16, u32)> {
    let mut f = BufReader::new(File::open(path)?);
    let mut buf4 = [0u8; 4];
    let mut buf2 = [0u8; 2];

    f.read_exact(&mut buf4)?;
    if &buf4 != b"RIFF" {
        return Err(AudioFileError::NotRiff);
    }
    f.read_exact(&mut buf4)?; // file size
    f.read_exact(&mut buf4)?;
    if &buf4 != b"WAVE" {
        return Err(AudioFileError::NotRiff);
    }

    let mut sample_rate = 0u32;
    let mut channels = 0u16;
    let mut bits = 0u16;
    let mut format = 0u16;
    let mut data: Vec<u8> = Vec::new();

    loop {
        if f.read_exact(&mut buf4).is_err() {
            break;
        }
        let chunk_id = buf4;
        f.read_exact(&mut buf4)?;
        let chunk_size = u32::from_le_bytes(buf4);

        match &chunk_id {
            b"fmt " => {
                f.read_exact(&mut buf2)?;
                format = u16::from_le_bytes(buf2);
                f.read_exact(&mut buf2)?;
                channels = u16::from_le_bytes(buf2);
                f.read_exact(&mut buf4)?;
                sample_rate = u32::from_le_bytes(buf4);
                f.read_exact(&mut buf4)?; // byte rate
                f.read_exact(&mut buf2)?; // block align
                f.read_exact(&mut buf2)?;
                bits = u16::from_le_bytes(buf2);
                if chunk_size > 16 {
                    f.seek(SeekFrom::Current(i64::from(chunk_size - 16)))?;
                }
            }
            b"data" => {
                data.resize(chunk_size as usize, 0);
                f.read_exact(&mut data)?;
                break;
            }
            _ => {
                // Chunks are padded to even length
                f.seek(SeekFrom::Current(i64::from(chunk_size + (chunk_size & 1))))?;
            }
        }
    }

    if data.is_empty() {
        return Err(AudioFileError::NoData);
    }

    // 1 = PCM, 3 = IEEE float, 0xFFFE = WAVE_FORMAT_EXTENSIBLE
    let samples: Vec<f32> = match (format, bits) {
        (3, 32) => data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        (1 | 0xFFFE, 16) => data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect(),
        (1 | 0xFFFE, 24) => data
            .chunks_exact(3)
            .map(|b| {
                let val = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
                val as f32 / 8_388_608.0
            })
            .collect(),
        (1 | 0xFFFE, 32) => data
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2_147_483_648.0)
            .collect(),
        _ => return Err(AudioFileError::Unsupported { format, bits }),
    };

    Ok((samples, channels, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shuffler-decode-{}-{name}", std::process::id()))
    }

    fn write_stereo_i16(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..frames {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(-16384i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_mono_keeps_left_channel() {
        let path = temp_path("stereo.wav");
        write_stereo_i16(&path, 100);

        let audio = read_mono(&path).unwrap();
        assert_eq!(audio.samples.len(), 100);
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.source_channels, 2);
        assert!(audio.samples.iter().all(|&s| (s - 0.5).abs() < 1e-6));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_riff_fallback_matches_hound() {
        let path = temp_path("fallback.wav");
        write_stereo_i16(&path, 10);

        let (samples, channels, rate) = read_riff(&path).unwrap();
        assert_eq!((channels, rate), (2, 22050));
        assert_eq!(samples.len(), 20);
        assert!((samples[1] + 0.5).abs() < 1e-6);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_read_window_clamps_to_file() {
        let path = temp_path("window.wav");
        write_stereo_i16(&path, 22050);

        let audio = read_window(&path, 0.5, 10.0).unwrap();
        assert_eq!(audio.samples.len(), 22050);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_not_riff() {
        let path = temp_path("junk.wav");
        std::fs::write(&path, b"JUNKJUNKJUNK").unwrap();
        assert!(matches!(read_riff(&path), Err(AudioFileError::NotRiff)));
        assert!(read_mono(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_first_channel() {
        assert_eq!(first_channel(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.0, 3.0]);
        assert_eq!(first_channel(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }
}
