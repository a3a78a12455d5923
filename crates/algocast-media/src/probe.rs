//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Duration assumed when a probe fails.
pub const DEFAULT_PROBE_DURATION: f64 = 2.0;

/// Audio stream layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u32,
    pub channel_layout: Option<String>,
}

/// Video stream geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Media file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration: f64,
    pub audio: Option<AudioStreamInfo>,
    pub video: Option<VideoStreamInfo>,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    channel_layout: Option<String>,
    duration: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse ffprobe's JSON document.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "audio")
        .map(|s| AudioStreamInfo {
            codec: s.codec_name.clone().unwrap_or_default(),
            sample_rate: s
                .sample_rate
                .as_deref()
                .and_then(|r| r.parse().ok())
                .unwrap_or(44_100),
            channels: s.channels.unwrap_or(1),
            channel_layout: s.channel_layout.clone(),
        });

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .map(|s| VideoStreamInfo {
            codec: s.codec_name.clone().unwrap_or_default(),
            width: s.width.unwrap_or(0),
            height: s.height.unwrap_or(0),
            fps: s
                .avg_frame_rate
                .as_deref()
                .or(s.r_frame_rate.as_deref())
                .and_then(parse_frame_rate)
                .unwrap_or(30.0),
        });

    // Prefer the container duration, fall back to the longest stream
    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| s.duration.as_deref()?.parse::<f64>().ok())
                .reduce(f64::max)
        })
        .ok_or_else(|| MediaError::InvalidMedia("no duration reported".to_string()))?;

    Ok(MediaInfo {
        duration,
        audio,
        video,
    })
}

/// Get media duration in seconds.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let info = probe_media(path).await?;
    Ok(info.duration)
}

/// Get media duration, substituting `default` on any failure.
pub async fn probe_duration_or(path: impl AsRef<Path>, default: f64) -> f64 {
    let path = path.as_ref();
    match probe_duration(path).await {
        Ok(d) if d.is_finite() && d > 0.0 => d,
        Ok(d) => {
            debug!("Probe returned unusable duration {} for {}", d, path.display());
            default
        }
        Err(e) => {
            debug!("Probe failed for {}: {}", path.display(), e);
            default
        }
    }
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
    }

    #[test]
    fn test_parse_audio_only_output() {
        let json = br#"{
            "streams": [{"codec_type": "audio", "codec_name": "mp3", "sample_rate": "24000",
                         "channels": 1, "channel_layout": "mono", "duration": "2.016"}],
            "format": {"duration": "2.016000"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 2.016).abs() < 1e-9);
        let audio = info.audio.unwrap();
        assert_eq!(audio.sample_rate, 24_000);
        assert_eq!(audio.channel_layout.as_deref(), Some("mono"));
        assert!(info.video.is_none());
    }

    #[test]
    fn test_stream_duration_fallback() {
        let json = br#"{
            "streams": [{"codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720,
                         "avg_frame_rate": "30/1", "duration": "2.250"}],
            "format": {}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 2.25).abs() < 1e-9);
        assert_eq!(info.video.unwrap().width, 1280);
    }

    #[test]
    fn test_missing_duration_is_invalid() {
        let json = br#"{"streams": [], "format": {}}"#;
        assert!(matches!(parse_probe_output(json), Err(MediaError::InvalidMedia(_))));
    }

    #[tokio::test]
    async fn test_probe_missing_file_uses_default() {
        let d = probe_duration_or("/definitely/not/here.wav", DEFAULT_PROBE_DURATION).await;
        assert_eq!(d, DEFAULT_PROBE_DURATION);
    }
}
