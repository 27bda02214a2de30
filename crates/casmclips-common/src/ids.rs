//! Typed project identifier.
//!
//! A project id is the name of its workspace directory: the fixed
//! [`PROJECT_DIR_PREFIX`] followed by 128 random bits in lowercase hex.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix shared by every workspace directory name.
pub const PROJECT_DIR_PREFIX: &str = "project-";

/// Identifier of a project, equal to its workspace directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Draw a fresh id from the thread-local CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("{PROJECT_DIR_PREFIX}{}", hex::encode(bytes)))
    }

    /// Derive the id from a workspace path (its final component).
    pub fn from_workspace(workspace: &Path) -> Option<Self> {
        workspace
            .file_name()
            .map(|name| Self(name.to_string_lossy().into_owned()))
    }

    /// Whether a directory name looks like a project workspace.
    pub fn is_project_dir_name(name: &str) -> bool {
        name.starts_with(PROJECT_DIR_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
