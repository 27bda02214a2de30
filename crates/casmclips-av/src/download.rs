//! Video-host downloads through yt-dlp.

use std::path::{Path, PathBuf};
use std::time::Duration;

use casmclips_common::{Error, Result};
use serde::Deserialize;

use crate::command::ToolCommand;

/// Downloads of long videos can legitimately take a while.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const METADATA_TIMEOUT: Duration = Duration::from_secs(120);

/// The subset of `--dump-single-json` the pipeline keeps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostedMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Thin wrapper around the yt-dlp CLI.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Download `url` as mp4 to exactly `target`.
    pub async fn download(&self, url: &str, target: &Path) -> Result<()> {
        tracing::info!("Downloading {} to {}", url, target.display());

        let output = ToolCommand::new(&self.program)
            .args(["-f", "mp4", "-o"])
            .path_arg(target)
            .arg(url)
            .timeout(Some(DOWNLOAD_TIMEOUT))
            .output()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        if !output.success() {
            return Err(Error::download(url, output.diagnostic()));
        }

        Ok(())
    }

    /// Fetch title, duration and thumbnail for `url` without downloading.
    pub async fn metadata(&self, url: &str) -> Result<HostedMetadata> {
        let output = ToolCommand::new(&self.program)
            .arg("--dump-single-json")
            .arg(url)
            .timeout(Some(METADATA_TIMEOUT))
            .output()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        if !output.success() {
            return Err(Error::download(url, output.diagnostic()));
        }

        parse_metadata(&output.stdout)
            .map_err(|e| Error::download(url, format!("malformed metadata: {e}")))
    }
}

/// Parse a `--dump-single-json` document.
pub fn parse_metadata(json: &str) -> serde_json::Result<HostedMetadata> {
    serde_json::from_str(json.trim())
}
