//! One run: pick files, build clips, resequence, write results

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use shuffler_core::{build_clip, run_strategy, AudioClip, FileChooser, OneShotSlicer, ShufflerError};
use shuffler_services::{audio_files, read_mono, read_window, write_clip};
use tracing::{info, warn};

use crate::args::OneShotMode;
use crate::config::RunSettings;

pub(crate) struct Generator {
    settings: RunSettings,
    rng: fastrand::Rng,
    source_chooser: FileChooser,
    substitution_chooser: FileChooser,
    source_files: Vec<PathBuf>,
    substitution_files: Vec<PathBuf>,
}

impl Generator {
    pub fn new(settings: RunSettings) -> Result<Self> {
        let source_files = audio_files(&settings.source_dir, false)
            .with_context(|| format!("Failed to list {}", settings.source_dir.display()))?;
        let substitution_files = audio_files(&settings.substitution_dir, settings.recurse_sub_dirs)
            .with_context(|| format!("Failed to list {}", settings.substitution_dir.display()))?;

        if source_files.is_empty() {
            bail!("No audio files were found in the source directory {}", settings.source_dir.display());
        }
        if substitution_files.is_empty() {
            bail!(
                "No audio files were found in the substitution directory {}",
                settings.substitution_dir.display()
            );
        }
        settings.options.validate()?;

        info!(
            sources = source_files.len(),
            substitutions = substitution_files.len(),
            seed = settings.seed,
            strategy = %settings.strategy,
            "Prepared run"
        );

        Ok(Self {
            rng: fastrand::Rng::with_seed(settings.seed),
            source_chooser: FileChooser::new(settings.file_selection_method),
            substitution_chooser: FileChooser::new(settings.file_selection_method),
            source_files,
            substitution_files,
            settings,
        })
    }

    /// Generate every requested sequence. Returns the files written.
    pub fn run(&mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for index in 0..self.settings.number_of_seqs {
            if let Some(path) = self.generate(index)? {
                written.push(path);
            }
        }
        Ok(written)
    }

    fn generate(&mut self, index: u32) -> Result<Option<PathBuf>> {
        let source_path = self.source_chooser.choose(&self.source_files, &mut self.rng)?.clone();
        info!(file = %source_path.display(), index, "Selected source file");

        let source = self.load_clip(&source_path)?;
        info!(events = source.len(), "Built source clip");

        let substitutions = match self.settings.one_shot_mode {
            OneShotMode::False => self.substitution_clips()?,
            OneShotMode::True => vec![self.one_shot_clip(&source, false)?],
            OneShotMode::Long => vec![self.one_shot_clip(&source, true)?],
        };

        let events = match run_strategy(self.settings.strategy, &source, &substitutions, &self.settings.options) {
            Ok(events) => events,
            Err(e @ ShufflerError::DegenerateRange(_)) => {
                warn!(file = %source_path.display(), error = %e, "Substitution durations cannot be normalized, skipping");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if events.is_empty() {
            warn!(file = %source_path.display(), "Strategy produced no events, skipping");
            return Ok(None);
        }

        let mut result = AudioClip::new(events, source.sample_rate);
        let path = self.output_path(&source_path, index);
        write_clip(&path, &mut result).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }

    /// Decode a random window of `path` and split it at its onsets.
    fn load_clip(&mut self, path: &Path) -> Result<AudioClip> {
        let start_fraction = self.rng.f64() * 0.9;
        let duration_secs = self.rng.u32(self.settings.min_duration..=self.settings.max_duration);

        let audio = read_window(path, start_fraction, duration_secs as f64)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let onsets = self.settings.detector.detect(&audio.samples, audio.sample_rate);
        Ok(build_clip(&audio.samples, &onsets, audio.sample_rate, self.settings.trim))
    }

    fn substitution_clips(&mut self) -> Result<Vec<AudioClip>> {
        let mut clips = Vec::with_capacity(self.settings.generation_depth);
        for _ in 0..self.settings.generation_depth {
            let path = self.substitution_chooser.choose(&self.substitution_files, &mut self.rng)?.clone();
            let clip = self.load_clip(&path)?;
            info!(file = %path.display(), events = clip.len(), "Built substitution clip");
            clips.push(clip);
        }
        Ok(clips)
    }

    /// Fill every source slot from whole donor files.
    fn one_shot_clip(&mut self, source: &AudioClip, long_mode: bool) -> Result<AudioClip> {
        let mut slicer = OneShotSlicer::new(source, long_mode);
        while !slicer.is_complete() {
            let path = self.substitution_chooser.choose(&self.substitution_files, &mut self.rng)?.clone();
            let donor = read_mono(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            if donor.sample_rate != source.sample_rate {
                warn!(
                    file = %path.display(),
                    donor_rate = donor.sample_rate,
                    source_rate = source.sample_rate,
                    "Sample rate mismatch, donor is used without resampling"
                );
            }
            let mapped = slicer.map_donor(&donor.samples, self.settings.fade_in_one_shots);
            info!(file = %path.display(), mapped, remaining = slicer.remaining(), "Mapped one-shot");
        }
        Ok(slicer.finish(source.sample_rate))
    }

    fn output_path(&self, source_path: &Path, index: u32) -> PathBuf {
        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("loop");
        self.settings
            .output
            .join(format!("{stem}_{}_{:03}.wav", self.settings.strategy, index + 1))
    }
}
