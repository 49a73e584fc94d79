use std::path::{Path, PathBuf};

use shuffler_core::{SelectionMode, Strategy, StrategyOptions};
use shuffler_services::{OnsetDetector, OnsetMethod};
use tracing::{debug, warn};

use crate::args::{Args, OneShotMode};

const DEFAULT_MIN_DURATION: u32 = 2;
const DEFAULT_MAX_DURATION: u32 = 8;

#[derive(serde::Serialize, serde::Deserialize, Default, Debug)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub defaults: RunDefaults,
    /// Fine tuning for the onset detector; `method` is overridden by
    /// `defaults.onset_method` or `--onset-method` when given
    #[serde(default)]
    pub onset: Option<OnsetDetector>,
}

/// Defaults for options that can also be given on the command line
#[derive(serde::Serialize, serde::Deserialize, Default, Debug)]
#[serde(default)]
pub(crate) struct RunDefaults {
    pub strategy: Option<Strategy>,
    pub event_counts: Option<Vec<usize>>,
    pub normalize_durations: Option<bool>,
    pub onset_method: Option<OnsetMethod>,
    pub file_selection_method: Option<SelectionMode>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
}

pub(crate) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("beat-shuffler")
        .join("config.toml")
}

/// Load the config file, falling back to defaults when it is missing or
/// malformed. Only an explicitly requested file that fails to load is warned
/// about.
pub(crate) fn load_config(explicit: Option<&Path>) -> AppConfig {
    let path = explicit.map(Path::to_path_buf).unwrap_or_else(config_path);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            if explicit.is_some() {
                warn!(path = %path.display(), error = %e, "Could not read config file, using defaults");
            }
            return AppConfig::default();
        }
    };
    match toml::from_str(&text) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded config");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
            AppConfig::default()
        }
    }
}

/// Fully resolved settings for one run: CLI flags over config over defaults
#[derive(Debug)]
pub(crate) struct RunSettings {
    pub number_of_seqs: u32,
    pub generation_depth: usize,
    pub source_dir: PathBuf,
    pub substitution_dir: PathBuf,
    pub output: PathBuf,
    pub seed: u64,
    pub trim: bool,
    pub one_shot_mode: OneShotMode,
    pub fade_in_one_shots: bool,
    pub strategy: Strategy,
    pub recurse_sub_dirs: bool,
    pub options: StrategyOptions,
    pub min_duration: u32,
    pub max_duration: u32,
    pub detector: OnsetDetector,
    pub file_selection_method: SelectionMode,
}

impl RunSettings {
    pub fn resolve(args: Args, config: AppConfig) -> Self {
        let defaults = config.defaults;

        let mut min_duration = args.min_duration.or(defaults.min_duration).unwrap_or(DEFAULT_MIN_DURATION);
        let mut max_duration = args.max_duration.or(defaults.max_duration).unwrap_or(DEFAULT_MAX_DURATION);
        if min_duration > max_duration {
            std::mem::swap(&mut min_duration, &mut max_duration);
        }

        let mut detector = config.onset.unwrap_or_default();
        if let Some(method) = args.onset_method.or(defaults.onset_method) {
            detector.method = method;
        }

        let options = StrategyOptions {
            normalize_durations: args.normalize_durations || defaults.normalize_durations.unwrap_or(false),
            event_counts: args
                .event_counts
                .or(defaults.event_counts)
                .unwrap_or_else(|| StrategyOptions::default().event_counts),
        };

        Self {
            number_of_seqs: args.number_of_seqs,
            generation_depth: args.generation_depth as usize,
            substitution_dir: args.substitution_dir.unwrap_or_else(|| args.source_dir.clone()),
            source_dir: args.source_dir,
            output: args.output,
            seed: args.seed.unwrap_or_else(|| fastrand::u64(..)),
            trim: args.trim,
            one_shot_mode: args.one_shot_mode,
            fade_in_one_shots: args.fade_in_one_shots,
            strategy: args.strategy.or(defaults.strategy).unwrap_or_default(),
            recurse_sub_dirs: args.recurse_sub_dirs,
            options,
            min_duration,
            max_duration,
            detector,
            file_selection_method: args
                .file_selection_method
                .or(defaults.file_selection_method)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("beat-shuffler").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn test_config_file_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [defaults]
            strategy = "Interleave"
            event_counts = [4, 2]
            file_selection_method = "sequential"
            onset_method = "energy"

            [onset]
            threshold = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.defaults.strategy, Some(Strategy::Interleave));
        assert_eq!(config.defaults.event_counts, Some(vec![4, 2]));
        assert_eq!(config.onset.as_ref().map(|o| o.threshold), Some(2.0));
        assert_eq!(config.onset.as_ref().map(|o| o.hop_size), Some(256));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [defaults]
            strategy = "Interleave"
            event_counts = [4, 2]
            min_duration = 9
            "#,
        )
        .unwrap();

        let settings = RunSettings::resolve(args(&["--strategy", "ShuffleByDuration", "--max-duration", "3"]), config);
        assert_eq!(settings.strategy, Strategy::ShuffleByDuration);
        assert_eq!(settings.options.event_counts, vec![4, 2]);
        // min 9 / max 3 are swapped
        assert_eq!((settings.min_duration, settings.max_duration), (3, 9));
    }

    #[test]
    fn test_builtin_defaults() {
        let settings = RunSettings::resolve(args(&["--seed", "5", "--source-dir", "loops"]), AppConfig::default());
        assert_eq!(settings.seed, 5);
        assert_eq!(settings.strategy, Strategy::ShuffleByDuration);
        assert_eq!(settings.options, StrategyOptions::default());
        assert_eq!(settings.substitution_dir, PathBuf::from("loops"));
        assert_eq!(settings.file_selection_method, SelectionMode::Random);
        assert_eq!(settings.detector.method, OnsetMethod::SpecFlux);
    }

    #[test]
    fn test_missing_config_is_default() {
        let config = load_config(Some(Path::new("/no/such/config.toml")));
        assert!(config.defaults.strategy.is_none());
        assert!(config.onset.is_none());
    }
}
