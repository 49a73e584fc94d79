//! shuffler-services: Audio file I/O, onset detection and file discovery

pub mod decode;
pub mod encode;
mod error;
pub mod library;
pub mod onset;

pub use decode::{read_mono, read_window, DecodedAudio};
pub use encode::write_clip;
pub use error::{AnalysisError, AudioFileError, Result};
pub use library::audio_files;
pub use onset::{OnsetDetector, OnsetMethod};
