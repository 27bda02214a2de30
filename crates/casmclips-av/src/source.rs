//! Source classification and acquisition.
//!
//! Every input string falls into exactly one [`SourceKind`]. Remote sources
//! are always materialized at [`SOURCE_FILE_NAME`] inside the workspace, so
//! later stages never care which branch produced the file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use casmclips_common::{MediaMetadata, Result};
use regex::Regex;

use crate::download::YtDlp;
use crate::fetch::HttpFetcher;
use crate::probe::probe_with_ffprobe;
use crate::tools::ToolRegistry;

/// Fixed file name of downloaded or fetched media inside a workspace.
pub const SOURCE_FILE_NAME: &str = "source.mp4";

/// How an input string is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A filesystem path, inspected in place.
    Local,
    /// A video-hosting page handled by the downloader.
    HostedVideo,
    /// Any other URL, fetched over HTTP.
    Url,
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid regex"))
}

fn hosted_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:youtube\.com|youtu\.be)").expect("valid regex"))
}

/// Classify an input string. First match wins: no `scheme://` means a local
/// path; then known video hosts; everything else is a generic URL.
pub fn classify(source: &str) -> SourceKind {
    let source = source.trim();
    if !url_pattern().is_match(source) {
        SourceKind::Local
    } else if hosted_pattern().is_match(source) {
        SourceKind::HostedVideo
    } else {
        SourceKind::Url
    }
}

/// The acquisition capabilities the resolver delegates to.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Inspect a file on disk.
    async fn inspect(&self, path: &Path) -> Result<MediaMetadata>;

    /// Download a hosted video to `target` and return its metadata.
    async fn download(&self, url: &str, target: &Path) -> Result<MediaMetadata>;

    /// Fetch a URL's body to `target`.
    async fn fetch(&self, url: &str, target: &Path) -> Result<()>;
}

/// Result of resolving a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub kind: SourceKind,
    /// Where the media can be read from.
    pub local_path: PathBuf,
    pub metadata: MediaMetadata,
}

/// Classifies inputs and acquires them into a workspace.
#[derive(Clone)]
pub struct SourceResolver {
    backend: Arc<dyn MediaBackend>,
}

impl SourceResolver {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self { backend }
    }

    pub async fn resolve(&self, source: &str, workspace: &Path) -> Result<ResolvedSource> {
        let source = source.trim();
        let kind = classify(source);
        tracing::info!("Resolving {:?} source {}", kind, source);

        let (local_path, metadata) = match kind {
            SourceKind::Local => {
                let path = PathBuf::from(source);
                let metadata = self.backend.inspect(&path).await?;
                (path, metadata)
            }
            SourceKind::HostedVideo => {
                let target = workspace.join(SOURCE_FILE_NAME);
                let metadata = self.backend.download(source, &target).await?;
                (target, metadata)
            }
            SourceKind::Url => {
                let target = workspace.join(SOURCE_FILE_NAME);
                self.backend.fetch(source, &target).await?;
                let metadata = self.backend.inspect(&target).await?;
                (target, metadata)
            }
        };

        tracing::debug!(
            "Resolved {} ({}, {})",
            local_path.display(),
            metadata.title,
            metadata.duration_text
        );

        Ok(ResolvedSource {
            kind,
            local_path,
            metadata,
        })
    }
}

/// Production backend: ffprobe for inspection, yt-dlp for hosts, reqwest for
/// everything else.
#[derive(Debug, Clone)]
pub struct ToolBackend {
    ffprobe: PathBuf,
    yt_dlp: YtDlp,
    fetcher: HttpFetcher,
}

impl ToolBackend {
    pub fn new(registry: &ToolRegistry) -> Self {
        Self {
            ffprobe: registry.ffprobe().to_path_buf(),
            yt_dlp: YtDlp::new(registry.yt_dlp()),
            fetcher: HttpFetcher::default(),
        }
    }
}

#[async_trait]
impl MediaBackend for ToolBackend {
    async fn inspect(&self, path: &Path) -> Result<MediaMetadata> {
        let info = probe_with_ffprobe(&self.ffprobe, path).await?;
        Ok(MediaMetadata::new(
            info.file_name(),
            info.duration.unwrap_or(0.0),
            None,
            path,
        ))
    }

    async fn download(&self, url: &str, target: &Path) -> Result<MediaMetadata> {
        self.yt_dlp.download(url, target).await?;
        let meta = self.yt_dlp.metadata(url).await?;
        let title = meta
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| url.to_string());
        Ok(MediaMetadata::new(
            title,
            meta.duration.unwrap_or(0.0),
            meta.thumbnail,
            target,
        ))
    }

    async fn fetch(&self, url: &str, target: &Path) -> Result<()> {
        self.fetcher.fetch_to(url, target).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use casmclips_common::Error;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Inspect(PathBuf),
        Download(String, PathBuf),
        Fetch(String, PathBuf),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        fail_inspect: bool,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaBackend for RecordingBackend {
        async fn inspect(&self, path: &Path) -> Result<MediaMetadata> {
            self.calls.lock().unwrap().push(Call::Inspect(path.to_path_buf()));
            if self.fail_inspect {
                return Err(Error::source_not_found(path.to_string_lossy(), "No such file"));
            }
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            Ok(MediaMetadata::new(name, 90.0, None, path))
        }

        async fn download(&self, url: &str, target: &Path) -> Result<MediaMetadata> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Download(url.to_string(), target.to_path_buf()));
            Ok(MediaMetadata::new(
                "Hosted",
                61.5,
                Some("https://img/thumb.jpg".into()),
                target,
            ))
        }

        async fn fetch(&self, url: &str, target: &Path) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Fetch(url.to_string(), target.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn classifies_inputs() {
        assert_eq!(classify("/videos/talk.mp4"), SourceKind::Local);
        assert_eq!(classify("relative/clip.mov"), SourceKind::Local);
        assert_eq!(classify(r"C:\Users\me\clip.mp4"), SourceKind::Local);
        assert_eq!(classify("youtube.com/watch?v=x"), SourceKind::Local);
        assert_eq!(
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            SourceKind::HostedVideo
        );
        assert_eq!(classify("https://YOUTU.BE/dQw4w9WgXcQ"), SourceKind::HostedVideo);
        assert_eq!(classify("http://cdn.example.com/a.mp4"), SourceKind::Url);
        assert_eq!(classify("ftp://files.example.com/a.mp4"), SourceKind::Url);
    }

    #[tokio::test]
    async fn local_paths_are_only_inspected() {
        let backend = Arc::new(RecordingBackend::default());
        let resolver = SourceResolver::new(backend.clone());

        let resolved = resolver
            .resolve("/videos/talk.mp4", Path::new("/out/project-1"))
            .await
            .unwrap();

        assert_eq!(resolved.kind, SourceKind::Local);
        assert_eq!(resolved.local_path, PathBuf::from("/videos/talk.mp4"));
        assert_eq!(resolved.metadata.title, "talk.mp4");
        assert_eq!(
            backend.calls(),
            vec![Call::Inspect(PathBuf::from("/videos/talk.mp4"))]
        );
    }

    #[tokio::test]
    async fn hosted_urls_never_fetch() {
        let backend = Arc::new(RecordingBackend::default());
        let resolver = SourceResolver::new(backend.clone());
        let ws = Path::new("/out/project-2");

        let resolved = resolver
            .resolve("https://youtu.be/abc", ws)
            .await
            .unwrap();

        assert_eq!(resolved.local_path, ws.join(SOURCE_FILE_NAME));
        assert_eq!(resolved.metadata.duration_text, "1:01");
        assert_eq!(
            resolved.metadata.thumbnail.as_deref(),
            Some("https://img/thumb.jpg")
        );
        assert_eq!(
            backend.calls(),
            vec![Call::Download(
                "https://youtu.be/abc".into(),
                ws.join(SOURCE_FILE_NAME)
            )]
        );
    }

    #[tokio::test]
    async fn generic_urls_fetch_then_inspect() {
        let backend = Arc::new(RecordingBackend::default());
        let resolver = SourceResolver::new(backend.clone());
        let ws = Path::new("/out/project-3");
        let target = ws.join(SOURCE_FILE_NAME);

        let resolved = resolver
            .resolve("https://cdn.example.com/v.mp4", ws)
            .await
            .unwrap();

        assert_eq!(resolved.kind, SourceKind::Url);
        assert_eq!(resolved.local_path, target);
        assert!(resolved.metadata.thumbnail.is_none());
        assert_eq!(
            backend.calls(),
            vec![
                Call::Fetch("https://cdn.example.com/v.mp4".into(), target.clone()),
                Call::Inspect(target),
            ]
        );
    }

    #[tokio::test]
    async fn inspection_failure_propagates() {
        let backend = Arc::new(RecordingBackend {
            fail_inspect: true,
            ..Default::default()
        });
        let resolver = SourceResolver::new(backend);
        let result = resolver
            .resolve("/videos/missing.mp4", Path::new("/out/project-4"))
            .await;
        assert_matches!(result, Err(Error::SourceNotFound { .. }));
    }
}
