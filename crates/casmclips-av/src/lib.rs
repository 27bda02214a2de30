//! Casmclips-AV: everything that touches external programs or the network.
//!
//! - **Tools**: [`ToolCommand`] with kill-on-timeout, [`ToolRegistry`] for
//!   capability probing
//! - **Sources**: [`SourceResolver`] classifies an input and acquires it via
//!   ffprobe, yt-dlp or an HTTP fetch
//! - **Workspaces**: [`Workspace::allocate`] creates one collision-free
//!   directory per run
//! - **Workers**: the [`Worker`] trait and [`ProcessWorker`], which runs the
//!   analysis and render script and decodes its JSON reply

pub mod command;
pub mod download;
pub mod fetch;
pub mod probe;
pub mod source;
pub mod tools;
pub mod worker;
pub mod workspace;

pub use command::{CommandError, ToolCommand, ToolOutput};
pub use download::{HostedMetadata, YtDlp};
pub use fetch::HttpFetcher;
pub use probe::{probe_with_ffprobe, ProbeInfo};
pub use source::{
    classify, MediaBackend, ResolvedSource, SourceKind, SourceResolver, ToolBackend,
    SOURCE_FILE_NAME,
};
pub use tools::{check_tool, Capabilities, ToolInfo, ToolPaths, ToolRegistry};
pub use worker::{
    decode_output, AnalysisOutput, AnalyzeRequest, ProcessWorker, RenderOutput, RenderRequest,
    Worker, WorkerConfig,
};
pub use workspace::Workspace;
