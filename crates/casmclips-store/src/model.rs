//! Project document model.

use std::path::{Path, PathBuf};

use casmclips_common::{MediaMetadata, ProjectId, Settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::timestamp;

/// The durable record of one source video across analysis and render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Absent until the first render.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,

    pub workspace: PathBuf,
    pub metadata: MediaMetadata,

    #[serde(default)]
    pub transcript_path: Option<PathBuf>,

    /// Ranking order from analysis, not start-time order.
    #[serde(default)]
    pub clips: Vec<Clip>,

    /// Opaque worker payload.
    #[serde(default)]
    pub recommendations: Value,

    pub settings_snapshot: Settings,

    #[serde(default)]
    pub export_path: Option<PathBuf>,
}

impl Project {
    /// Assemble a freshly analyzed project. The id is the workspace's
    /// directory name and the settings are copied in.
    pub fn new(
        workspace: &Path,
        metadata: MediaMetadata,
        transcript_path: PathBuf,
        clips: Vec<Clip>,
        recommendations: Value,
        settings: &Settings,
    ) -> Self {
        let id = ProjectId::from_workspace(workspace)
            .unwrap_or_else(|| ProjectId::from(workspace.to_string_lossy().into_owned()));
        Self {
            id,
            created_at: timestamp::now(),
            updated_at: None,
            workspace: workspace.to_path_buf(),
            metadata,
            transcript_path: Some(transcript_path),
            clips,
            recommendations,
            settings_snapshot: settings.clone(),
            export_path: None,
        }
    }

    /// Merge a render result: clips are replaced wholesale, the export
    /// location and `updated_at` are set, everything else is untouched.
    pub fn apply_render(&mut self, clips: Vec<Clip>, export_path: PathBuf) {
        self.clips = clips;
        self.export_path = Some(export_path);
        self.updated_at = Some(timestamp::now());
    }

    /// Artifact paths that do not lie under the workspace.
    pub fn paths_outside_workspace(&self) -> Vec<&Path> {
        let clip_paths = self
            .clips
            .iter()
            .flat_map(|c| [c.preview_path.as_deref(), c.output_path.as_deref()]);

        [self.transcript_path.as_deref(), self.export_path.as_deref()]
            .into_iter()
            .chain(clip_paths)
            .flatten()
            .filter(|p| !p.starts_with(&self.workspace))
            .collect()
    }
}

/// One candidate segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Seconds from the start of the source.
    pub start: f64,
    pub end: f64,
    pub score: f64,
    #[serde(default)]
    pub retention: f64,
    #[serde(default)]
    pub emotion: f64,
    #[serde(default)]
    pub hook_text: String,
    #[serde(default)]
    pub title_suggestions: Vec<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub preview_path: Option<PathBuf>,

    /// Set by render.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub output_path: Option<PathBuf>,

    /// Fields this crate does not interpret (`energy`, `hashtags`,
    /// `subtitles_path`, ...). The render worker rebuilds its clip records
    /// from the document, so they are written back verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Clip {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Workers write `""` for unset paths.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()).map(PathBuf::from))
}

/// A listing entry, shaped for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// The project document, ready to hand back to `load`.
    pub path: PathBuf,
    pub name: String,
    /// Stored timestamp text, or `unknown`.
    pub created_at: String,
    pub clip_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clip_json() -> Value {
        json!({
            "start": 12.5, "end": 40.0, "score": 0.91, "retention": 0.8,
            "emotion": 0.6, "energy": 0.72, "hook_text": "Wait for it",
            "title_suggestions": ["First", "Second"],
            "description": "A moment", "hashtags": ["#talk"], "keywords": ["talk"],
            "subtitles_path": "", "output_path": "", "preview_path": ""
        })
    }

    fn project(workspace: &Path) -> Project {
        Project::new(
            workspace,
            MediaMetadata::new("talk.mp4", 754.2, None, "/videos/talk.mp4"),
            workspace.join("transcript.json"),
            vec![serde_json::from_value(clip_json()).unwrap()],
            json!({"titles": ["First"]}),
            &Settings::default(),
        )
    }

    #[test]
    fn empty_paths_read_as_none() {
        let clip: Clip = serde_json::from_value(clip_json()).unwrap();
        assert!(clip.preview_path.is_none());
        assert!(clip.output_path.is_none());
        assert_eq!(clip.duration(), 27.5);
    }

    #[test]
    fn unknown_clip_fields_survive() {
        let clip: Clip = serde_json::from_value(clip_json()).unwrap();
        assert_eq!(clip.extra["energy"], json!(0.72));
        assert_eq!(clip.extra["subtitles_path"], json!(""));

        let back = serde_json::to_value(&clip).unwrap();
        assert_eq!(back["hashtags"], json!(["#talk"]));
        assert_eq!(back["description"], json!("A moment"));
        assert_eq!(back["output_path"], Value::Null);
    }

    #[test]
    fn clip_without_bounds_is_rejected() {
        let result: Result<Clip, _> = serde_json::from_value(json!({"score": 1.0}));
        assert!(result.is_err());
    }

    #[test]
    fn new_project_takes_id_from_workspace() {
        let p = project(Path::new("/out/project-0a1b"));
        assert_eq!(p.id.as_str(), "project-0a1b");
        assert!(p.updated_at.is_none());
        assert!(p.export_path.is_none());

        let doc = serde_json::to_value(&p).unwrap();
        assert!(doc.get("updated_at").is_none());
        assert!(doc["created_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(doc["settings_snapshot"]["clipsPerVideo"], json!(5));
    }

    #[test]
    fn render_merge_replaces_clips_only() {
        let mut p = project(Path::new("/out/project-0a1b"));
        let before = p.clone();

        let mut rendered: Clip = serde_json::from_value(clip_json()).unwrap();
        rendered.output_path = Some(PathBuf::from("/out/project-0a1b/exports/clip_01.mp4"));
        p.apply_render(
            vec![rendered.clone()],
            PathBuf::from("/out/project-0a1b/exports"),
        );

        assert_eq!(p.clips, vec![rendered]);
        assert!(p.updated_at.is_some());
        assert_eq!(p.created_at, before.created_at);
        assert_eq!(p.settings_snapshot, before.settings_snapshot);
        assert_eq!(p.metadata, before.metadata);
        assert_eq!(p.recommendations, before.recommendations);
    }

    #[test]
    fn flags_paths_escaping_workspace() {
        let mut p = project(Path::new("/out/project-0a1b"));
        assert!(p.paths_outside_workspace().is_empty());

        p.export_path = Some(PathBuf::from("/tmp/elsewhere"));
        assert_eq!(p.paths_outside_workspace(), vec![Path::new("/tmp/elsewhere")]);
    }
}
