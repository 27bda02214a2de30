use casmclips_av::{ToolPaths, WorkerConfig};
use casmclips_common::Settings;
use serde::{Deserialize, Serialize};

/// Everything the binary reads from its TOML file.
///
/// ```toml
/// [settings]
/// outputDir = "~/Videos/CasmClips"
/// clipsPerVideo = 3
///
/// [worker]
/// program = "python3"
/// script = "python_service/app.py"
/// timeout_secs = 1800
///
/// [tools]
/// ffprobe_path = "/opt/ffmpeg/bin/ffprobe"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub tools: ToolPaths,
}
