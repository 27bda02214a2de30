//! Per-run project workspaces.

use std::io;
use std::path::{Path, PathBuf};

use casmclips_common::{Error, ProjectId, Result};

/// Collisions on 128 random bits are not expected; this only bounds the loop.
const MAX_ALLOCATION_ATTEMPTS: usize = 8;

/// A freshly created, uniquely named directory under the output root.
///
/// Every file a run produces (downloaded source, transcript, clips, the
/// project document) lives under [`Workspace::path`]. Workspaces are never
/// removed by the pipeline.
///
/// # Example
///
/// ```no_run
/// use casmclips_av::Workspace;
///
/// let workspace = Workspace::allocate("/home/me/Videos/CasmClips")?;
/// println!("writing to {}", workspace.project_file().display());
/// # Ok::<(), casmclips_common::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: ProjectId,
    path: PathBuf,
}

impl Workspace {
    /// Create a new workspace directory under `root`, creating `root` (and
    /// its parents) first if needed.
    ///
    /// The leaf is created with `create_dir`, so two concurrent allocations
    /// can never share a directory.
    pub fn allocate(root: impl AsRef<Path>) -> Result<Self> {
        let root = absolute(root.as_ref())?;
        std::fs::create_dir_all(&root).map_err(|e| Error::filesystem(&root, e))?;

        let mut last_err = None;
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let id = ProjectId::generate();
            let path = root.join(id.as_str());
            match std::fs::create_dir(&path) {
                Ok(()) => {
                    tracing::info!("Allocated workspace {}", path.display());
                    return Ok(Self { id, path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::warn!("Workspace {} already exists, retrying", path.display());
                    last_err = Some((path, e));
                }
                Err(e) => return Err(Error::filesystem(path, e)),
            }
        }

        let (path, e) = last_err.unwrap_or_else(|| {
            (
                root.clone(),
                io::Error::new(io::ErrorKind::AlreadyExists, "no attempts made"),
            )
        });
        Err(Error::filesystem(path, e))
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project_file(&self) -> PathBuf {
        casmclips_store::project_file(&self.path)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::filesystem(path, e))?;
    Ok(cwd.join(path))
}
