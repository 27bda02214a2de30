//! Casmclips-Common: shared types used across the clip pipeline.
//!
//! - **Errors**: the pipeline-wide failure taxonomy and `Result` alias
//! - **Ids**: the typed project identifier derived from a workspace name
//! - **Settings**: the immutable run configuration captured into projects
//! - **Media**: normalized source metadata and duration formatting
//!
//! # Examples
//!
//! ```
//! use casmclips_common::{format_duration, Settings};
//!
//! let settings = Settings::default();
//! assert_eq!(settings.clips_per_video, 5);
//! assert_eq!(format_duration(125.7), "2:05");
//! ```

pub mod error;
pub mod ids;
pub mod media;
pub mod settings;

pub use error::{Error, Result, WorkerKind};
pub use ids::ProjectId;
pub use media::{format_duration, MediaMetadata};
pub use settings::Settings;
