//! Unified error type for the clip pipeline.
//!
//! Every stage funnels its failures into [`Error`]. Messages are meant to be
//! shown to the user verbatim, so each variant carries the diagnostic text of
//! the subprocess that failed when there is one.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The two operations an external worker performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Analyze,
    Render,
}

impl WorkerKind {
    /// Subcommand passed to the worker script.
    pub fn subcommand(&self) -> &'static str {
        match self {
            WorkerKind::Analyze => "analyze",
            WorkerKind::Render => "render",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

/// Failure modes of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A local source (or a fetched file) could not be inspected.
    #[error("Source not found: {input}: {message}")]
    SourceNotFound {
        /// The path that was inspected.
        input: String,
        /// Diagnostic from the inspection tool.
        message: String,
    },

    /// The video-host downloader failed or produced unusable metadata.
    #[error("Download failed for {url}: {message}")]
    Download {
        /// The URL handed to the downloader.
        url: String,
        /// Diagnostic from the downloader.
        message: String,
    },

    /// A generic HTTP fetch failed.
    #[error("Fetch failed for {url}: {message}")]
    Fetch {
        /// The URL that was requested.
        url: String,
        /// Transport or status description.
        message: String,
    },

    /// A worker exited with a non-zero status (or could not be started).
    #[error("{kind} worker failed: {diagnostic}")]
    WorkerExecution {
        /// Which worker operation failed.
        kind: WorkerKind,
        /// Captured stderr, or stdout when stderr was empty.
        diagnostic: String,
    },

    /// A worker exited cleanly but its output broke the JSON contract.
    #[error("{kind} worker returned invalid output: {message}")]
    WorkerProtocol {
        /// Which worker operation misbehaved.
        kind: WorkerKind,
        /// Parse or shape error.
        message: String,
    },

    /// A worker was killed after exceeding its time budget.
    #[error("{kind} worker timed out after {}s", timeout.as_secs())]
    WorkerTimeout {
        /// Which worker operation hung.
        kind: WorkerKind,
        /// The budget that was exceeded.
        timeout: Duration,
    },

    /// A persisted project document could not be read or parsed.
    #[error("Project document {} is corrupt: {message}", path.display())]
    ProjectCorrupt {
        /// Location of the document.
        path: PathBuf,
        /// Read or parse error.
        message: String,
    },

    /// A directory or file operation failed.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::SourceNotFound`].
    pub fn source_not_found(input: impl Into<String>, message: impl Into<String>) -> Self {
        Error::SourceNotFound {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Download`].
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Fetch`].
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::WorkerExecution`].
    pub fn worker_execution(kind: WorkerKind, diagnostic: impl Into<String>) -> Self {
        Error::WorkerExecution {
            kind,
            diagnostic: diagnostic.into(),
        }
    }

    /// Convenience constructor for [`Error::WorkerProtocol`].
    pub fn worker_protocol(kind: WorkerKind, message: impl fmt::Display) -> Self {
        Error::WorkerProtocol {
            kind,
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::ProjectCorrupt`].
    pub fn project_corrupt(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::ProjectCorrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Filesystem`].
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Diagnostic text captured from a failing worker, if any.
    pub fn worker_diagnostic(&self) -> Option<&str> {
        match self {
            Error::WorkerExecution { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
