//! Spectral onset detection
//!
//! Hann-windowed frames of `window_size` samples are taken every `hop_size`
//! samples and transformed with an FFT. Each frame's spectrum is compared with
//! the frames before it to form a detection curve, and local maxima of that
//! curve above an adaptive threshold become onsets.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use rustfft::FftPlanner;
use rustfft::num_complex::Complex32;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;

/// Floor for ratio denominators in the Kullback-Leibler methods
const EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnsetMethod {
    /// Rise in spectral energy
    Energy,
    /// Rise in frequency-weighted energy
    Hfc,
    /// Distance from the spectrum predicted by the previous two frames
    Complex,
    /// Magnitude-weighted phase deviation
    Phase,
    /// Half-wave rectified power spectrum difference
    SpecDiff,
    /// Kullback-Leibler distance between successive magnitude spectra
    Kl,
    /// Modified Kullback-Leibler distance
    Mkl,
    /// Sum of positive magnitude changes
    #[default]
    SpecFlux,
}

impl OnsetMethod {
    pub const ALL: [OnsetMethod; 8] = [
        Self::Energy,
        Self::Hfc,
        Self::Complex,
        Self::Phase,
        Self::SpecDiff,
        Self::Kl,
        Self::Mkl,
        Self::SpecFlux,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Hfc => "hfc",
            Self::Complex => "complex",
            Self::Phase => "phase",
            Self::SpecDiff => "specdiff",
            Self::Kl => "kl",
            Self::Mkl => "mkl",
            Self::SpecFlux => "specflux",
        }
    }

    /// Detection value of `current` given the two frames before it
    fn detection(&self, current: &Spectrum, prev: &Spectrum, before: &Spectrum) -> f32 {
        let pairs = || current.magnitude.iter().zip(&prev.magnitude);
        match self {
            Self::Energy => (current.energy() - prev.energy()).max(0.0),
            Self::Hfc => (current.hfc() - prev.hfc()).max(0.0),
            Self::Complex => (0..current.magnitude.len())
                .map(|k| {
                    let predicted =
                        Complex32::from_polar(prev.magnitude[k], 2.0 * prev.phase[k] - before.phase[k]);
                    (Complex32::from_polar(current.magnitude[k], current.phase[k]) - predicted).norm()
                })
                .sum(),
            Self::Phase => (0..current.magnitude.len())
                .map(|k| {
                    let deviation = princarg(current.phase[k] - 2.0 * prev.phase[k] + before.phase[k]);
                    current.magnitude[k] * deviation.abs()
                })
                .sum(),
            Self::SpecDiff => pairs().map(|(m, p)| (m * m - p * p).max(0.0)).sum(),
            Self::Kl => pairs().map(|(m, p)| m * (1.0 + m / (p + EPSILON)).ln()).sum(),
            Self::Mkl => pairs().map(|(m, p)| (1.0 + m / (p + EPSILON)).ln()).sum(),
            Self::SpecFlux => pairs().map(|(m, p)| (m - p).max(0.0)).sum(),
        }
    }
}

impl fmt::Display for OnsetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OnsetMethod {
    type Err = AnalysisError;

    /// Case-insensitive; `default` selects spectral flux.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase();
        if key == "default" {
            return Ok(Self::default());
        }
        Self::ALL
            .into_iter()
            .find(|method| method.name() == key)
            .ok_or_else(|| AnalysisError::UnknownOnsetMethod(s.to_string()))
    }
}

/// Wrap a phase into [-pi, pi)
fn princarg(phase: f32) -> f32 {
    (phase + PI).rem_euclid(2.0 * PI) - PI
}

/// Magnitude and phase of the non-negative frequency bins of one frame
#[derive(Debug, Clone)]
struct Spectrum {
    magnitude: Vec<f32>,
    phase: Vec<f32>,
}

impl Spectrum {
    fn silent(bins: usize) -> Self {
        Self { magnitude: vec![0.0; bins], phase: vec![0.0; bins] }
    }

    fn from_bins(bins: &[Complex32]) -> Self {
        Self {
            magnitude: bins.iter().map(|c| c.norm()).collect(),
            phase: bins.iter().map(|c| c.arg()).collect(),
        }
    }

    fn energy(&self) -> f32 {
        self.magnitude.iter().map(|m| m * m).sum()
    }

    fn hfc(&self) -> f32 {
        self.magnitude
            .iter()
            .enumerate()
            .map(|(k, m)| (k + 1) as f32 * m * m)
            .sum()
    }
}

fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetDetector {
    pub method: OnsetMethod,
    /// FFT size in samples
    pub window_size: usize,
    pub hop_size: usize,
    /// Multiplier over the local mean detection value a peak must exceed
    pub threshold: f32,
    /// Frames of context on each side for the local mean
    pub context_frames: usize,
    /// Minimum spacing between onsets in seconds
    pub min_gap_secs: f32,
    /// Frames quieter than this (mean squared amplitude) never trigger
    pub silence: f32,
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self {
            method: OnsetMethod::default(),
            window_size: 512,
            hop_size: 256,
            threshold: 1.5,
            context_frames: 8,
            min_gap_secs: 0.05,
            silence: 1e-6,
        }
    }
}

impl OnsetDetector {
    pub fn new(method: OnsetMethod) -> Self {
        Self { method, ..Default::default() }
    }

    /// Detection value and loudness of every frame
    fn analyze(&self, samples: &[f32], window: usize, hop: usize) -> (Vec<f32>, Vec<f32>) {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(window);
        let hann = hann_window(window);
        let bins = window / 2 + 1;
        let frame_count = (samples.len() - window) / hop + 1;

        let mut buffer = vec![Complex32::default(); window];
        let mut before = Spectrum::silent(bins);
        let mut prev = Spectrum::silent(bins);
        let mut detection = Vec::with_capacity(frame_count);
        let mut loudness = Vec::with_capacity(frame_count);

        for i in 0..frame_count {
            let frame = &samples[i * hop..i * hop + window];
            loudness.push(frame.iter().map(|s| s * s).sum::<f32>() / window as f32);

            for ((slot, &sample), &gain) in buffer.iter_mut().zip(frame).zip(&hann) {
                *slot = Complex32::new(sample * gain, 0.0);
            }
            fft.process(&mut buffer);

            let current = Spectrum::from_bins(&buffer[..bins]);
            detection.push(self.method.detection(&current, &prev, &before));
            before = std::mem::replace(&mut prev, current);
        }
        (detection, loudness)
    }

    /// Onset positions in samples, ascending. Never includes 0.
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> Vec<usize> {
        let hop = self.hop_size.max(1);
        let window = self.window_size.max(hop).max(2);
        if samples.len() < window {
            return Vec::new();
        }

        let (detection, loudness) = self.analyze(samples, window, hop);
        let min_gap = (self.min_gap_secs.max(0.0) * sample_rate as f32) as usize;
        let mut onsets: Vec<usize> = Vec::new();

        for i in 1..detection.len() {
            let value = detection[i];
            if value <= 0.0 || loudness[i] < self.silence {
                continue;
            }
            let lo = i.saturating_sub(self.context_frames);
            let hi = (i + self.context_frames + 1).min(detection.len());
            let local = &detection[lo..hi];
            let mean = local.iter().sum::<f32>() / local.len() as f32;
            let is_peak = local.iter().all(|&v| v <= value);
            if !is_peak || value < mean * self.threshold {
                continue;
            }

            let position = i * hop;
            if onsets.last().is_some_and(|&last| position - last < min_gap) {
                continue;
            }
            onsets.push(position);
        }

        debug!(method = %self.method, frames = detection.len(), onsets = onsets.len(), "Detected onsets");
        onsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Silence with short decaying noise bursts at the given offsets
    fn bursts(len: usize, at: &[usize]) -> Vec<f32> {
        let mut samples = vec![0.0; len];
        let mut rng = noise_source(7);
        for &start in at {
            for i in 0..2000.min(len - start) {
                let decay = 1.0 - i as f32 / 2000.0;
                samples[start + i] = rng() * decay;
            }
        }
        samples
    }

    fn noise_source(mut state: u64) -> impl FnMut() -> f32 {
        move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32 / u32::MAX as f32) * 4.0 - 1.0
        }
    }

    #[test]
    fn test_detects_bursts() {
        let at = [4096, 16384, 30000];
        let samples = bursts(44100, &at);

        for method in [
            OnsetMethod::SpecFlux,
            OnsetMethod::Hfc,
            OnsetMethod::Energy,
            OnsetMethod::Complex,
            OnsetMethod::Kl,
            OnsetMethod::Mkl,
        ] {
            let onsets = OnsetDetector::new(method).detect(&samples, 44100);
            assert_eq!(onsets.len(), at.len(), "{method}: {onsets:?}");
            for (found, expected) in onsets.iter().zip(at) {
                assert!(found.abs_diff(expected) <= 512, "{method}: {found} vs {expected}");
            }
        }
    }

    #[test]
    fn test_every_method_finds_lone_burst() {
        let samples = bursts(22050, &[8192]);
        for method in OnsetMethod::ALL {
            let onsets = OnsetDetector::new(method).detect(&samples, 44100);
            assert!(!onsets.is_empty(), "{method}");
            assert!(onsets[0].abs_diff(8192) <= 768, "{method}: {onsets:?}");
        }
    }

    #[test]
    fn test_hfc_weights_high_bins() {
        let mut low = Spectrum::silent(4);
        low.magnitude[0] = 1.0;
        let mut high = Spectrum::silent(4);
        high.magnitude[3] = 1.0;
        assert_eq!(low.energy(), high.energy());
        assert!(high.hfc() > low.hfc());
    }

    #[test]
    fn test_silence_and_short_input() {
        for method in OnsetMethod::ALL {
            let detector = OnsetDetector::new(method);
            assert!(detector.detect(&vec![0.0; 44100], 44100).is_empty(), "{method}");
            assert!(detector.detect(&[0.5; 100], 44100).is_empty(), "{method}");
        }
    }

    #[test]
    fn test_min_gap() {
        let samples = bursts(44100, &[4096, 4096 + 1024]);
        let detector = OnsetDetector { min_gap_secs: 0.1, ..Default::default() };
        assert_eq!(detector.detect(&samples, 44100).len(), 1);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("ENERGY".parse::<OnsetMethod>().unwrap(), OnsetMethod::Energy);
        assert_eq!("default".parse::<OnsetMethod>().unwrap(), OnsetMethod::SpecFlux);
        assert_eq!("specflux".parse::<OnsetMethod>().unwrap(), OnsetMethod::SpecFlux);
        assert_eq!("SpecDiff".parse::<OnsetMethod>().unwrap(), OnsetMethod::SpecDiff);
        assert!(matches!(
            "wavelet".parse::<OnsetMethod>(),
            Err(AnalysisError::UnknownOnsetMethod(name)) if name == "wavelet"
        ));
    }
}
