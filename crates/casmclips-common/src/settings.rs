//! Run settings.
//!
//! [`Settings`] is a plain value: a run receives it by reference and the
//! analysis phase clones it into the project's `settings_snapshot`, so later
//! edits never reach an already persisted project.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User-facing pipeline options, serialized with the camelCase keys the UI
/// layer uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Root under which workspaces are allocated.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_caption_style")]
    pub caption_style: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Adds `--gpu` to render invocations when set.
    #[serde(default = "default_true")]
    pub gpu_acceleration: bool,

    /// Carried in the snapshot; no pipeline stage reads it.
    #[serde(default)]
    pub auto_music: bool,

    /// Language code handed to the analysis worker, or `auto`.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_clips_per_video")]
    pub clips_per_video: u32,

    #[serde(default = "default_min_clip_seconds")]
    pub min_clip_seconds: u32,

    #[serde(default = "default_max_clip_seconds")]
    pub max_clip_seconds: u32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/Videos/CasmClips").as_ref())
}

fn default_caption_style() -> String {
    "neon".to_string()
}

fn default_font_family() -> String {
    "Inter".to_string()
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_clips_per_video() -> u32 {
    5
}

fn default_min_clip_seconds() -> u32 {
    15
}

fn default_max_clip_seconds() -> u32 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            caption_style: default_caption_style(),
            font_family: default_font_family(),
            gpu_acceleration: default_true(),
            auto_music: false,
            language: default_language(),
            clips_per_video: default_clips_per_video(),
            min_clip_seconds: default_min_clip_seconds(),
            max_clip_seconds: default_max_clip_seconds(),
        }
    }
}
