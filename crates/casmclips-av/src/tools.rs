//! External tool detection.
//!
//! The [`ToolRegistry`] knows where each external program lives (configured
//! override or bare name resolved through `PATH`) and probes them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::ToolCommand;

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";
pub const YT_DLP: &str = "yt-dlp";

/// Version queries are expected to answer almost instantly.
const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Optional per-tool path overrides, the `[tools]` section of the config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolPaths {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether a trivial invocation succeeded.
    pub available: bool,
    /// First line of the version output, if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// The four capabilities the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub ffmpeg: bool,
    pub ffprobe: bool,
    /// The runtime hosting the worker script.
    pub python3: bool,
    pub yt_dlp: bool,
}

/// Resolved program locations for every external tool.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    yt_dlp: PathBuf,
    worker_runtime: PathBuf,
}

impl ToolRegistry {
    /// Build the registry from config overrides.
    ///
    /// A configured path is used only if it exists; otherwise the bare tool
    /// name is kept and resolved through `PATH` when spawned.
    pub fn new(paths: &ToolPaths, worker_runtime: &Path) -> Self {
        Self {
            ffmpeg: resolve(FFMPEG, paths.ffmpeg_path.as_deref()),
            ffprobe: resolve(FFPROBE, paths.ffprobe_path.as_deref()),
            yt_dlp: resolve(YT_DLP, paths.yt_dlp_path.as_deref()),
            worker_runtime: worker_runtime.to_path_buf(),
        }
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    pub fn yt_dlp(&self) -> &Path {
        &self.yt_dlp
    }

    /// Probe every capability. Each check runs on its own; a missing tool
    /// only clears its own flag.
    pub async fn probe(&self) -> Capabilities {
        let infos = self.check_all().await;
        let available = |i: usize| infos[i].available;
        Capabilities {
            ffmpeg: available(0),
            ffprobe: available(1),
            python3: available(2),
            yt_dlp: available(3),
        }
    }

    /// Check all tools, returning version and location details.
    ///
    /// Order: ffmpeg, ffprobe, worker runtime, yt-dlp.
    pub async fn check_all(&self) -> Vec<ToolInfo> {
        let runtime_name = runtime_name(&self.worker_runtime);
        let (ffmpeg, ffprobe, runtime, yt_dlp) = tokio::join!(
            check_tool(FFMPEG, &self.ffmpeg),
            check_tool(FFPROBE, &self.ffprobe),
            check_tool(&runtime_name, &self.worker_runtime),
            check_tool(YT_DLP, &self.yt_dlp),
        );
        vec![ffmpeg, ffprobe, runtime, yt_dlp]
    }
}

fn resolve(name: &str, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(p) if p.exists() => p.to_path_buf(),
        Some(p) => {
            tracing::warn!(
                "Configured {} path {} does not exist; falling back to PATH",
                name,
                p.display()
            );
            PathBuf::from(name)
        }
        None => PathBuf::from(name),
    }
}

fn runtime_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string_lossy().into_owned())
}

/// Run the tool's version query and report whether it answered.
///
/// ffmpeg and ffprobe take `-version`; everything else `--version`.
pub async fn check_tool(name: &str, program: &Path) -> ToolInfo {
    let version_arg = match name {
        FFMPEG | FFPROBE => "-version",
        _ => "--version",
    };

    let result = ToolCommand::new(program)
        .arg(version_arg)
        .timeout(Some(PROBE_TIMEOUT))
        .output()
        .await;

    match result {
        Ok(output) if output.success() => {
            // Older Python releases print their version to stderr.
            let version = output
                .stdout
                .lines()
                .chain(output.stderr.lines())
                .find(|l| !l.trim().is_empty())
                .map(|s| s.trim().to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        Ok(output) => {
            tracing::debug!("{} {} exited with {}", name, version_arg, output.status);
            unavailable(name)
        }
        Err(e) => {
            tracing::debug!("{} unavailable: {}", name, e);
            unavailable(name)
        }
    }
}

fn unavailable(name: &str) -> ToolInfo {
    ToolInfo {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    }
}
