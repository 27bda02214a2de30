//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a [`Pipeline`] to an in-memory
//! [`FakeBackend`] and a scripted [`FakeWorker`] over a temporary output
//! root.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use casmclips::pipeline::{Pipeline, PipelineState};
use casmclips_av::{
    AnalysisOutput, AnalyzeRequest, MediaBackend, RenderOutput, RenderRequest, Worker,
};
use casmclips_common::{Error, MediaMetadata, Result, Settings, WorkerKind};
use casmclips_store::Clip;
use serde_json::json;
use tempfile::TempDir;

/// Acquisition calls seen by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Inspect(PathBuf),
    Download(String, PathBuf),
    Fetch(String, PathBuf),
}

/// Media backend that never touches tools or the network.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<BackendCall>>,
    /// When set, every inspection fails with this message.
    pub inspect_error: Option<String>,
}

impl FakeBackend {
    pub fn failing_inspect(message: &str) -> Self {
        Self {
            inspect_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    async fn inspect(&self, path: &Path) -> Result<MediaMetadata> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Inspect(path.to_path_buf()));
        if let Some(ref msg) = self.inspect_error {
            return Err(Error::source_not_found(path.to_string_lossy(), msg.clone()));
        }
        let title = path.file_name().unwrap().to_string_lossy().into_owned();
        Ok(MediaMetadata::new(title, 754.2, None, path))
    }

    async fn download(&self, url: &str, target: &Path) -> Result<MediaMetadata> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Download(url.to_string(), target.to_path_buf()));
        std::fs::write(target, b"video").unwrap();
        Ok(MediaMetadata::new(
            "Conference Keynote",
            3725.0,
            Some("https://i.ytimg.com/vi/abc/maxresdefault.jpg".into()),
            target,
        ))
    }

    async fn fetch(&self, url: &str, target: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Fetch(url.to_string(), target.to_path_buf()));
        std::fs::write(target, b"video").unwrap();
        Ok(())
    }
}

/// Worker that fabricates plausible output and records every request.
#[derive(Default)]
pub struct FakeWorker {
    pub analyze_requests: Mutex<Vec<AnalyzeRequest>>,
    pub render_requests: Mutex<Vec<RenderRequest>>,
    /// Diagnostic of a simulated non-zero exit for analysis.
    pub analyze_failure: Option<String>,
    /// Diagnostic of a simulated non-zero exit for render.
    pub render_failure: Option<String>,
}

impl FakeWorker {
    pub fn failing_analyze(diagnostic: &str) -> Self {
        Self {
            analyze_failure: Some(diagnostic.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_render(diagnostic: &str) -> Self {
        Self {
            render_failure: Some(diagnostic.to_string()),
            ..Default::default()
        }
    }

    pub fn analyze_requests(&self) -> Vec<AnalyzeRequest> {
        self.analyze_requests.lock().unwrap().clone()
    }

    pub fn render_requests(&self) -> Vec<RenderRequest> {
        self.render_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Worker for FakeWorker {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutput> {
        self.analyze_requests.lock().unwrap().push(request.clone());
        if let Some(ref diag) = self.analyze_failure {
            return Err(Error::worker_execution(WorkerKind::Analyze, diag.clone()));
        }

        let length = f64::from(request.min_seconds + request.max_seconds) / 2.0;
        let clips = (0..request.clips_per_video)
            .map(|i| {
                let start = f64::from(i) * 90.0 + 4.5;
                clip(start, start + length, 0.9 - f64::from(i) * 0.1)
            })
            .collect();

        let transcript_path = request.workspace.join("transcript.json");
        std::fs::write(&transcript_path, b"[]").unwrap();

        Ok(AnalysisOutput {
            transcript_path,
            clips,
            recommendations: json!({
                "titles": ["Hook 1"],
                "hashtags": ["#clips"],
                "language": request.language,
            }),
        })
    }

    async fn render(&self, request: &RenderRequest) -> Result<RenderOutput> {
        self.render_requests.lock().unwrap().push(request.clone());
        if let Some(ref diag) = self.render_failure {
            return Err(Error::worker_execution(WorkerKind::Render, diag.clone()));
        }

        // Like the real worker, rebuild clips from the persisted document.
        let project = casmclips_store::load(&request.project_file)?;
        let exports = project.workspace.join("exports");
        let clips: Vec<Clip> = project
            .clips
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut c = c.clone();
                let out = exports.join(format!("clip_{:02}.mp4", i + 1));
                c.output_path = Some(out.clone());
                c.preview_path = Some(out);
                c
            })
            .collect();

        Ok(RenderOutput {
            rendered_count: clips.len() as u64,
            clips,
            export_path: exports,
        })
    }
}

pub fn clip(start: f64, end: f64, score: f64) -> Clip {
    serde_json::from_value(json!({
        "start": start,
        "end": end,
        "score": score,
        "retention": 0.8,
        "emotion": 0.5,
        "energy": 0.6,
        "hook_text": "You won't believe this",
        "title_suggestions": ["Hook 1", "Hook 2"],
        "hashtags": ["#clips"],
        "subtitles_path": "",
        "output_path": "",
        "preview_path": ""
    }))
    .unwrap()
}

/// Pipeline over a temporary output root with recording fakes.
pub struct TestHarness {
    pub root: TempDir,
    pub backend: Arc<FakeBackend>,
    pub worker: Arc<FakeWorker>,
    pub states: Arc<Mutex<Vec<PipelineState>>>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_fakes(FakeBackend::default(), FakeWorker::default())
    }

    pub fn with_fakes(backend: FakeBackend, worker: FakeWorker) -> Self {
        Self {
            root: tempfile::tempdir().expect("failed to create temp dir"),
            backend: Arc::new(backend),
            worker: Arc::new(worker),
            states: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("CasmClips")
    }

    /// Default settings pointed at the temporary output root.
    pub fn settings(&self) -> Settings {
        Settings {
            output_dir: self.output_dir(),
            ..Settings::default()
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        let states = Arc::clone(&self.states);
        Pipeline::new(self.backend.clone(), self.worker.clone()).with_observer(Box::new(
            move |s: &PipelineState| states.lock().unwrap().push(s.clone()),
        ))
    }

    /// Take the recorded transitions, clearing the log.
    pub fn take_states(&self) -> Vec<PipelineState> {
        std::mem::take(&mut *self.states.lock().unwrap())
    }

    /// Workspace directories currently under the output root.
    pub fn workspaces(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.output_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
