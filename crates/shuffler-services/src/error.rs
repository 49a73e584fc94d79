//! Errors from reading and writing audio files

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Not a RIFF/WAVE file")]
    NotRiff,
    #[error("No data chunk")]
    NoData,
    #[error("Unsupported WAV encoding: format {format}, {bits} bits")]
    Unsupported { format: u16, bits: u16 },
}

pub type Result<T> = std::result::Result<T, AudioFileError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(
        "Unknown onset method '{0}' (expected default, energy, hfc, complex, phase, specdiff, kl, mkl or specflux)"
    )]
    UnknownOnsetMethod(String),
}
