//! FFprobe-based media probing.

use super::{AudioStream, ProbeInfo, VideoStream};
use crate::command::ToolCommand;
use casmclips_common::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const FFPROBE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    format_name: String,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// Probe a media file using ffprobe.
///
/// Any failure (file missing, tool missing, non-zero exit, unparseable
/// output) is reported as [`Error::SourceNotFound`].
pub async fn probe_with_ffprobe(ffprobe: &Path, path: &Path) -> Result<ProbeInfo> {
    let input = path.to_string_lossy().into_owned();

    let output = ToolCommand::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .path_arg(path)
        .timeout(Some(FFPROBE_TIMEOUT))
        .output()
        .await
        .map_err(|e| Error::source_not_found(&input, e.to_string()))?;

    if !output.success() {
        let diagnostic = output.diagnostic();
        let message = if diagnostic.is_empty() {
            format!("ffprobe exited with {}", output.status)
        } else {
            diagnostic
        };
        return Err(Error::source_not_found(&input, message));
    }

    parse_ffprobe_output(path, &output.stdout)
        .map_err(|e| Error::source_not_found(&input, format!("unreadable ffprobe output: {e}")))
}

/// Parse ffprobe's `-print_format json -show_format -show_streams` output.
pub fn parse_ffprobe_output(path: &Path, json: &str) -> serde_json::Result<ProbeInfo> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let duration = output
        .format
        .duration
        .and_then(|s| s.trim().parse::<f64>().ok());

    let mut info = ProbeInfo {
        file_path: path.to_path_buf(),
        container: output.format.format_name,
        duration,
        video_streams: Vec::new(),
        audio_streams: Vec::new(),
    };

    for stream in output.streams {
        match stream.codec_type.as_str() {
            "video" => info.video_streams.push(VideoStream {
                codec: stream.codec_name.unwrap_or_default(),
                width: stream.width.unwrap_or(0),
                height: stream.height.unwrap_or(0),
                frame_rate: stream.r_frame_rate.and_then(|s| parse_frame_rate(&s)),
            }),
            "audio" => info.audio_streams.push(AudioStream {
                codec: stream.codec_name.unwrap_or_default(),
                channels: stream.channels.unwrap_or(2),
                language: stream.tags.language,
            }),
            _ => {}
        }
    }

    Ok(info)
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        return (den != 0.0).then(|| num / den);
    }
    rate_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264",
             "width": 1920, "height": 1080, "r_frame_rate": "30000/1001"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac",
             "channels": 2, "tags": {"language": "eng"}},
            {"index": 2, "codec_type": "data"}
        ],
        "format": {"filename": "talk.mp4", "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                   "duration": "754.200000", "size": "1048576"}
    }"#;

    #[test]
    fn parses_streams_and_duration() {
        let info = parse_ffprobe_output(Path::new("/videos/talk.mp4"), SAMPLE).unwrap();
        assert_eq!(info.duration, Some(754.2));
        assert_eq!(info.container, "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(info.file_name(), "talk.mp4");

        let video = &info.video_streams[0];
        assert_eq!(video.codec, "h264");
        assert_eq!((video.width, video.height), (1920, 1080));
        assert!((video.frame_rate.unwrap() - 29.97).abs() < 0.01);

        assert_eq!(info.audio_streams.len(), 1);
        assert_eq!(info.audio_streams[0].language.as_deref(), Some("eng"));
    }

    #[test]
    fn missing_duration_is_none() {
        let json = r#"{"format": {"format_name": "matroska"}, "streams": []}"#;
        let info = parse_ffprobe_output(Path::new("a.mkv"), json).unwrap();
        assert!(info.duration.is_none());
        assert!(info.video_streams.is_empty());
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_ffprobe_output(Path::new("a.mkv"), "not json").is_err());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("24000/1001"), Some(23.976023976023978));
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[tokio::test]
    async fn missing_tool_is_source_not_found() {
        let result = probe_with_ffprobe(
            Path::new("nonexistent_ffprobe_12345"),
            Path::new("/videos/talk.mp4"),
        )
        .await;
        assert_matches!(result, Err(Error::SourceNotFound { .. }));
    }
}
