//! Finding candidate audio files on disk

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &["wav", "wave"];

fn is_audio_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("._"));
    let known = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)));
    known && !hidden
}

/// WAV files in `dir` (and its subdirectories when `recurse` is set),
/// sorted by path so sequential selection is stable across runs.
///
/// macOS resource-fork files (`._name.wav`) are skipped. Symlinked files are
/// kept but symlinked directories are not entered.
pub fn audio_files(dir: &Path, recurse: bool) -> io::Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .max_depth(if recurse { usize::MAX } else { 1 });

    let mut found = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
                if is_file && is_audio_file(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => warn!(error = %e, "Skipping unreadable entry"),
        }
    }
    found.sort();
    Ok(found)
}
