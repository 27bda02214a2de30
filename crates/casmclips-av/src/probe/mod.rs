//! Local media inspection.
//!
//! Sources are inspected with the `ffprobe` CLI in JSON mode. Only the
//! fields the pipeline and the `probe` command display are kept.

mod ffprobe;

pub use ffprobe::{parse_ffprobe_output, probe_with_ffprobe};

use serde::Serialize;
use std::path::PathBuf;

/// Container-level facts about a media file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeInfo {
    pub file_path: PathBuf,
    pub container: String,
    /// Seconds, when the container reports it.
    pub duration: Option<f64>,
    pub video_streams: Vec<VideoStream>,
    pub audio_streams: Vec<AudioStream>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStream {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStream {
    pub codec: String,
    pub channels: u32,
    pub language: Option<String>,
}

impl ProbeInfo {
    /// Final path component, used as the display title of local sources.
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.to_string_lossy().into_owned())
    }
}
