//! Normalized source metadata.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata describing the acquired source video, whichever way it was
/// acquired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    /// Length in seconds.
    pub duration: f64,
    /// `m:ss` rendering of `duration`.
    pub duration_text: String,
    /// Only the video-host downloader supplies one.
    pub thumbnail: Option<String>,
    /// Where the media lives on disk.
    pub source_path: PathBuf,
}

impl MediaMetadata {
    /// Build metadata, normalizing the duration and deriving its display text.
    pub fn new(
        title: impl Into<String>,
        duration: f64,
        thumbnail: Option<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        let duration = normalize_duration(duration);
        Self {
            title: title.into(),
            duration,
            duration_text: format_duration(duration),
            thumbnail,
            source_path: source_path.into(),
        }
    }
}

fn normalize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Render seconds as `minutes:seconds`, seconds zero-padded to two digits.
///
/// Minutes are not padded and not folded into hours: `3725.0` is `62:05`.
pub fn format_duration(seconds: f64) -> String {
    let seconds = normalize_duration(seconds);
    let minutes = (seconds / 60.0).floor() as u64;
    let rest = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{rest:02}")
}
