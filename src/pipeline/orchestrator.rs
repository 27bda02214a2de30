//! Analyze and render runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use casmclips_av::{
    AnalyzeRequest, Capabilities, MediaBackend, ProcessWorker, RenderRequest, SourceResolver,
    ToolBackend, ToolPaths, ToolRegistry, Worker, Workspace,
};
use casmclips_common::{Error, Result, Settings, WorkerKind};
use casmclips_store::{self as store, Clip, Project, ProjectSummary};

use super::state::{PipelineState, StateCallback};
use crate::config::Config;

/// Result of a successful analyze run.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub project: Project,
    pub project_file: PathBuf,
}

/// Result of a successful render run.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub rendered_count: u64,
    pub project: Project,
    pub project_file: PathBuf,
}

/// Composes source resolution, the worker and the project store.
///
/// A `Pipeline` holds no per-run state, so one instance can drive several
/// runs at once; each run gets its own workspace.
pub struct Pipeline {
    resolver: SourceResolver,
    worker: Arc<dyn Worker>,
    tools: ToolRegistry,
    observer: Option<StateCallback>,
}

impl Pipeline {
    pub fn new(backend: Arc<dyn MediaBackend>, worker: Arc<dyn Worker>) -> Self {
        Self {
            resolver: SourceResolver::new(backend),
            worker,
            tools: ToolRegistry::new(&ToolPaths::default(), Path::new("python3")),
            observer: None,
        }
    }

    /// Wire up the production backend and process worker from config.
    pub fn from_config(config: &Config) -> Self {
        let tools = ToolRegistry::new(&config.tools, &config.worker.program);
        let backend = Arc::new(ToolBackend::new(&tools));
        let worker = Arc::new(ProcessWorker::new(config.worker.clone()));
        Self::new(backend, worker).with_tools(tools)
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_observer(mut self, observer: StateCallback) -> Self {
        self.observer = Some(observer);
        self
    }

    fn transition(&self, state: PipelineState) {
        match &state {
            PipelineState::Failed(msg) => tracing::error!("Pipeline failed: {}", msg),
            other => tracing::info!("Pipeline state: {}", other),
        }
        if let Some(ref cb) = self.observer {
            cb(&state);
        }
    }

    fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.transition(PipelineState::Persisted),
            Err(e) => self.transition(PipelineState::Failed(e.to_string())),
        }
        result
    }

    /// Acquire `source`, analyze it and persist a new project.
    ///
    /// Nothing is persisted unless every stage succeeds. The workspace
    /// directory is left behind on failure.
    pub async fn analyze(&self, source: &str, settings: &Settings) -> Result<AnalyzeOutcome> {
        self.transition(PipelineState::Idle);
        let result = self.run_analyze(source, settings).await;
        self.finish(result)
    }

    async fn run_analyze(&self, source: &str, settings: &Settings) -> Result<AnalyzeOutcome> {
        self.transition(PipelineState::SourceResolving);
        let workspace = Workspace::allocate(&settings.output_dir)?;
        let resolved = self.resolver.resolve(source, workspace.path()).await?;

        self.transition(PipelineState::Analyzing);
        let request = AnalyzeRequest::from_settings(&resolved.local_path, workspace.path(), settings);
        let output = self.worker.analyze(&request).await?;
        check_clips(WorkerKind::Analyze, &output.clips)?;

        let project = Project::new(
            workspace.path(),
            resolved.metadata,
            output.transcript_path,
            output.clips,
            output.recommendations,
            settings,
        );
        warn_escaping_paths(&project);

        let project_file = workspace.project_file();
        store::persist(&project_file, &project)?;
        tracing::info!(
            "Project {} saved with {} clips",
            project.id,
            project.clips.len()
        );

        Ok(AnalyzeOutcome {
            project,
            project_file,
        })
    }

    /// Render the clips of an already persisted project and merge the
    /// result back into it.
    pub async fn render(&self, project_file: &Path, settings: &Settings) -> Result<RenderOutcome> {
        self.transition(PipelineState::Idle);
        let result = self.run_render(project_file, settings).await;
        self.finish(result)
    }

    async fn run_render(&self, project_file: &Path, settings: &Settings) -> Result<RenderOutcome> {
        self.transition(PipelineState::Rendering);
        let mut project = store::load(project_file)?;

        let request = RenderRequest::from_settings(project_file, settings);
        let output = self.worker.render(&request).await?;
        check_clips(WorkerKind::Render, &output.clips)?;

        project.apply_render(output.clips, output.export_path);
        warn_escaping_paths(&project);
        store::persist(project_file, &project)?;

        Ok(RenderOutcome {
            rendered_count: output.rendered_count,
            project,
            project_file: project_file.to_path_buf(),
        })
    }

    /// Projects under the configured output root, newest first.
    pub fn list_projects(&self, settings: &Settings) -> Result<Vec<ProjectSummary>> {
        store::list(&settings.output_dir)
    }

    pub fn load_project(&self, project_file: &Path) -> Result<Project> {
        store::load(project_file)
    }

    pub async fn capabilities(&self) -> Capabilities {
        self.tools.probe().await
    }
}

/// Every clip must span a positive interval.
fn check_clips(kind: WorkerKind, clips: &[Clip]) -> Result<()> {
    match clips.iter().position(|c| !(c.end > c.start)) {
        Some(i) => Err(Error::worker_protocol(
            kind,
            format!(
                "clip {} ends at {} but starts at {}",
                i + 1,
                clips[i].end,
                clips[i].start
            ),
        )),
        None => Ok(()),
    }
}

fn warn_escaping_paths(project: &Project) {
    for path in project.paths_outside_workspace() {
        tracing::warn!(
            "Project {} references {:?} outside its workspace",
            project.id,
            path
        );
    }
}
