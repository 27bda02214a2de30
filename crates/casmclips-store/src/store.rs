//! Reading, writing and enumerating project documents.

use std::cmp::Reverse;
use std::io::Write;
use std::path::{Path, PathBuf};

use casmclips_common::{Error, ProjectId, Result};
use serde_json::Value;

use crate::model::{Project, ProjectSummary};

/// File name of the project document inside every workspace.
pub const PROJECT_FILE_NAME: &str = "project.json";

/// Literal used in summaries whose document has no `created_at`.
const UNKNOWN_CREATED_AT: &str = "unknown";

/// Mode of a freshly written document.
#[cfg(unix)]
const DOCUMENT_MODE: u32 = 0o644;

pub fn project_file(workspace: &Path) -> PathBuf {
    workspace.join(PROJECT_FILE_NAME)
}

/// Write `project` to `path` as pretty JSON, replacing any previous document.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it, so readers see either the old or the new version.
pub fn persist(path: &Path, project: &Project) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let json = serde_json::to_vec_pretty(project).map_err(|e| {
        Error::filesystem(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::filesystem(dir, e))?;
    // Temporary files are owner-only; documents are shared like any other output.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(DOCUMENT_MODE))
            .map_err(|e| Error::filesystem(tmp.path(), e))?;
    }
    tmp.write_all(&json)
        .and_then(|_| tmp.flush())
        .map_err(|e| Error::filesystem(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::filesystem(path, e.error))?;

    tracing::debug!("Persisted project {} to {}", project.id, path.display());
    Ok(())
}

/// Read a project document.
pub fn load(path: &Path) -> Result<Project> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::project_corrupt(path, e))?;
    serde_json::from_str(&contents).map_err(|e| Error::project_corrupt(path, e))
}

/// Summarize every project under `root`, newest first.
///
/// A missing root yields an empty list. Workspaces without a document are
/// skipped; a document that is not valid JSON fails the whole listing.
pub fn list(root: &Path) -> Result<Vec<ProjectSummary>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::filesystem(root, e)),
    };

    let mut summaries = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::filesystem(root, e))?;
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        if !ProjectId::is_project_dir_name(&dir_name) || !entry.path().is_dir() {
            continue;
        }

        let doc_path = project_file(&entry.path());
        if !doc_path.is_file() {
            tracing::debug!("Skipping {}: no {}", dir_name, PROJECT_FILE_NAME);
            continue;
        }

        summaries.push(summarize(&dir_name, doc_path)?);
    }

    // `unknown` trails every real timestamp.
    summaries.sort_by_cached_key(|s| {
        Reverse((s.created_at != UNKNOWN_CREATED_AT).then(|| s.created_at.clone()))
    });

    Ok(summaries)
}

/// Build a summary from only the header fields, tolerating anything else.
fn summarize(dir_name: &str, doc_path: PathBuf) -> Result<ProjectSummary> {
    let contents =
        std::fs::read_to_string(&doc_path).map_err(|e| Error::project_corrupt(&doc_path, e))?;
    let doc: Value =
        serde_json::from_str(&contents).map_err(|e| Error::project_corrupt(&doc_path, e))?;
    if !doc.is_object() {
        return Err(Error::project_corrupt(&doc_path, "document is not a JSON object"));
    }

    let name = doc
        .pointer("/metadata/title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(dir_name)
        .to_string();
    let created_at = doc
        .get("created_at")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_CREATED_AT)
        .to_string();
    let clip_count = doc
        .get("clips")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Ok(ProjectSummary {
        path: doc_path,
        name,
        created_at,
        clip_count,
    })
}
