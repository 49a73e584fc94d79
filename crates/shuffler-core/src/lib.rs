//! shuffler-core: Segmentation and resequencing engine for beat-shuffler

pub mod builder;
mod clip;
mod error;
mod event;
pub mod fade;
pub mod matching;
pub mod one_shot;
pub mod selector;
pub mod strategy;

pub use builder::{build_clip, extract_window, pick_window};
pub use clip::{AudioClip, DEFAULT_SAMPLE_RATE};
pub use error::{Result, ShufflerError};
pub use event::AudioEvent;
pub use matching::{closest_index, normalize};
pub use one_shot::{OneShotSlicer, MAX_SLICES, ONE_SHOT_SLICE_THRESHOLD, SHORTEST_ONE_SHOT};
pub use selector::{Chooser, FileChooser, SelectionMode};
pub use strategy::{
    interleave, interleave_in_place, run_strategy, shuffle_by_duration, Strategy, StrategyOptions,
};
