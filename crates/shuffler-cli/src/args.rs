use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use shuffler_core::{SelectionMode, Strategy};
use shuffler_services::OnsetMethod;

/// How substitution material is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OneShotMode {
    /// Substitution files are loops, segmented like the source
    #[default]
    False,
    /// Each substitution file is one sound filling one source slot
    True,
    /// Long sustained one-shots are sliced across several source slots
    Long,
}

/// Generate new loops by resequencing transient-delimited fragments
#[derive(Parser, Debug)]
#[command(name = "beat-shuffler")]
#[command(version)]
pub(crate) struct Args {
    /// Number of sequences to generate
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub number_of_seqs: u32,

    /// Number of substitution files involved in generating a single loop
    #[arg(short = 'd', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub generation_depth: u32,

    /// Directory containing source audio files
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Directory containing substitution audio files (defaults to the source directory)
    #[arg(short = 's', long)]
    pub substitution_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long, default_value = ".")]
    pub output: PathBuf,

    /// Seed for the random number generator (defaults to a random seed, which is logged)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Drop the first and last event of each clip, as they are likely cut mid-hit
    #[arg(long)]
    pub trim: bool,

    /// Use one-shots instead of loops as substitutions
    #[arg(long, value_enum, default_value_t = OneShotMode::False)]
    pub one_shot_mode: OneShotMode,

    /// Fade in the first slice taken from each one-shot
    #[arg(long)]
    pub fade_in_one_shots: bool,

    /// Resequencing strategy: ShuffleByDuration, Interleave or InterleaveInPlace
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Recurse into subdirectories when collecting substitution files
    #[arg(long)]
    pub recurse_sub_dirs: bool,

    /// Rescale candidate durations into the source's duration range before matching
    #[arg(long)]
    pub normalize_durations: bool,

    /// Minimum duration of extracted clips in seconds
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=15))]
    pub min_duration: Option<u32>,

    /// Maximum duration of extracted clips in seconds
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..=30))]
    pub max_duration: Option<u32>,

    /// Onset detection method: default, energy, hfc, complex, phase, specdiff, kl, mkl or specflux
    #[arg(long)]
    pub onset_method: Option<OnsetMethod>,

    /// How files are picked: random or sequential
    #[arg(long)]
    pub file_selection_method: Option<SelectionMode>,

    /// Comma-separated run lengths used by the interleaving strategies
    #[arg(long, value_delimiter = ',')]
    pub event_counts: Option<Vec<usize>>,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
