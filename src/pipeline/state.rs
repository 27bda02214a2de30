use std::fmt;

/// Where a single analyze or render run currently is.
///
/// Analyze walks `Idle -> SourceResolving -> Analyzing -> Persisted`, render
/// walks `Idle -> Rendering -> Persisted`. Any failure jumps to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    SourceResolving,
    Analyzing,
    Rendering,
    Persisted,
    Failed(String),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::SourceResolving => f.write_str("resolving source"),
            PipelineState::Analyzing => f.write_str("analyzing"),
            PipelineState::Rendering => f.write_str("rendering"),
            PipelineState::Persisted => f.write_str("persisted"),
            PipelineState::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// Observer invoked on every state transition of a run.
pub type StateCallback = Box<dyn Fn(&PipelineState) + Send + Sync>;
