//! External worker invocation.
//!
//! Analysis and rendering run out of process. A worker is invoked as
//! `<program> <script> <analyze|render> <args...>`, must exit 0, and must
//! print exactly one JSON document on stdout. Anything else is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use casmclips_common::{Error, Result, Settings, WorkerKind};
use casmclips_store::Clip;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::{CommandError, ToolCommand};

/// The `[worker]` section of the config.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Runtime that hosts the worker script.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Script handed to the runtime as its first argument.
    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// Upper bound for a single invocation; 0 waits forever.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("python3")
}

fn default_script() -> PathBuf {
    PathBuf::from("python_service/app.py")
}

fn default_timeout_secs() -> u64 {
    60 * 60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: default_script(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WorkerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Inputs of an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    pub input: PathBuf,
    pub workspace: PathBuf,
    pub clips_per_video: u32,
    pub min_seconds: u32,
    pub max_seconds: u32,
    pub language: String,
}

impl AnalyzeRequest {
    pub fn from_settings(input: &Path, workspace: &Path, settings: &Settings) -> Self {
        Self {
            input: input.to_path_buf(),
            workspace: workspace.to_path_buf(),
            clips_per_video: settings.clips_per_video,
            min_seconds: settings.min_clip_seconds,
            max_seconds: settings.max_clip_seconds,
            language: settings.language.clone(),
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--input".into(),
            self.input.to_string_lossy().into_owned(),
            "--workspace".into(),
            self.workspace.to_string_lossy().into_owned(),
            "--clips-per-video".into(),
            self.clips_per_video.to_string(),
            "--min-seconds".into(),
            self.min_seconds.to_string(),
            "--max-seconds".into(),
            self.max_seconds.to_string(),
            "--language".into(),
            self.language.clone(),
        ]
    }
}

/// Inputs of a render run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub project_file: PathBuf,
    pub caption_style: String,
    pub font_family: String,
    pub gpu: bool,
}

impl RenderRequest {
    pub fn from_settings(project_file: &Path, settings: &Settings) -> Self {
        Self {
            project_file: project_file.to_path_buf(),
            caption_style: settings.caption_style.clone(),
            font_family: settings.font_family.clone(),
            gpu: settings.gpu_acceleration,
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--project".into(),
            self.project_file.to_string_lossy().into_owned(),
            "--caption-style".into(),
            self.caption_style.clone(),
            "--font-family".into(),
            self.font_family.clone(),
        ];
        if self.gpu {
            args.push("--gpu".into());
        }
        args
    }
}

/// What an analysis worker reports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisOutput {
    pub transcript_path: PathBuf,
    pub clips: Vec<Clip>,
    /// Passed through to the project untouched.
    pub recommendations: Value,
}

/// What a render worker reports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOutput {
    pub clips: Vec<Clip>,
    pub export_path: PathBuf,
    pub rendered_count: u64,
}

/// An out-of-process analysis and render capability.
#[async_trait]
pub trait Worker: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutput>;

    async fn render(&self, request: &RenderRequest) -> Result<RenderOutput>;
}

/// Runs the worker script as a child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessWorker {
    config: WorkerConfig,
}

impl ProcessWorker {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run one worker operation and parse its stdout as JSON.
    ///
    /// The call returns only once the child has exited (or been killed on
    /// timeout). stdout is never parsed after a non-zero exit.
    pub async fn invoke(&self, kind: WorkerKind, args: &[String]) -> Result<Value> {
        tracing::info!(
            "Invoking {} worker: {} {}",
            kind,
            self.config.program.display(),
            self.config.script.display()
        );

        let output = ToolCommand::new(&self.config.program)
            .path_arg(&self.config.script)
            .arg(kind.subcommand())
            .args(args.iter().cloned())
            .timeout(self.config.timeout())
            .output()
            .await
            .map_err(|e| match e {
                CommandError::Timeout { timeout, .. } => Error::WorkerTimeout { kind, timeout },
                other => Error::worker_execution(kind, other.to_string()),
            })?;

        if !output.success() {
            let diagnostic = output.diagnostic();
            tracing::error!("{} worker exited with {}: {}", kind, output.status, diagnostic);
            return Err(Error::worker_execution(kind, diagnostic));
        }

        serde_json::from_str(output.stdout.trim()).map_err(|e| Error::worker_protocol(kind, e))
    }
}

/// Convert a worker's JSON document into its typed output.
pub fn decode_output<T: DeserializeOwned>(kind: WorkerKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::worker_protocol(kind, e))
}

#[async_trait]
impl Worker for ProcessWorker {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutput> {
        let value = self.invoke(WorkerKind::Analyze, &request.to_args()).await?;
        let output: AnalysisOutput = decode_output(WorkerKind::Analyze, value)?;
        tracing::info!("Analysis produced {} clips", output.clips.len());
        Ok(output)
    }

    async fn render(&self, request: &RenderRequest) -> Result<RenderOutput> {
        let value = self.invoke(WorkerKind::Render, &request.to_args()).await?;
        let output: RenderOutput = decode_output(WorkerKind::Render, value)?;
        tracing::info!("Rendered {} clips", output.rendered_count);
        Ok(output)
    }
}
