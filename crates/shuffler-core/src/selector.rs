//! Pick-one-of-N selection, random or rotating
//!
//! The random source is always passed in by the caller. A run creates one
//! seeded [`fastrand::Rng`] and threads it through every selection, so the
//! same seed and the same call order reproduce the same run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShufflerError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Random,
    Sequential,
}

impl SelectionMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionMode {
    type Err = ShufflerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            _ => Err(ShufflerError::UnknownSelectionMode(s.to_string())),
        }
    }
}

fn pick_index(mode: SelectionMode, cursor: &mut usize, len: usize, rng: &mut fastrand::Rng) -> Result<usize> {
    if len == 0 {
        return Err(ShufflerError::EmptyPool);
    }
    match mode {
        SelectionMode::Random => Ok(rng.usize(..len)),
        SelectionMode::Sequential => {
            let idx = *cursor % len;
            *cursor += 1;
            Ok(idx)
        }
    }
}

/// Selector owning its pool of candidates
#[derive(Debug, Clone)]
pub struct Chooser<T> {
    pub mode: SelectionMode,
    index: usize,
    values: Vec<T>,
}

impl<T> Chooser<T> {
    pub fn new(mode: SelectionMode, values: Vec<T>) -> Self {
        Self { mode, index: 0, values }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }

    pub fn choose(&mut self, rng: &mut fastrand::Rng) -> Result<&T> {
        let idx = pick_index(self.mode, &mut self.index, self.values.len(), rng)?;
        Ok(&self.values[idx])
    }

    /// Rewind the sequential cursor. Random mode is unaffected.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

/// Selector whose pool is supplied on every call (used for picking files)
#[derive(Debug, Clone, Default)]
pub struct FileChooser {
    pub mode: SelectionMode,
    index: usize,
}

impl FileChooser {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode, index: 0 }
    }

    pub fn choose<'a, T>(&mut self, values: &'a [T], rng: &mut fastrand::Rng) -> Result<&'a T> {
        let idx = pick_index(self.mode, &mut self.index, values.len(), rng)?;
        Ok(&values[idx])
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
