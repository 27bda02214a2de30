mod orchestrator;
mod state;

pub use orchestrator::{AnalyzeOutcome, Pipeline, RenderOutcome};
pub use state::{PipelineState, StateCallback};
