//! Casmclips-Store: the project document and its on-disk lifecycle.
//!
//! A [`Project`] is written once by analysis and rewritten by render, always
//! as `<workspace>/project.json`. [`list`] summarizes every project under an
//! output root without requiring the full document to be well-typed.

pub mod model;
pub mod store;
pub mod timestamp;

pub use model::{Clip, Project, ProjectSummary};
pub use store::{list, load, persist, project_file, PROJECT_FILE_NAME};
