use anyhow::Context;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{VideoInfo, VideoValidation};

/// Distinct I/O failure kind for videos that cannot be opened or decoded at
/// all. Per-frame misses are not errors and never surface here.
#[derive(Error, Debug)]
pub enum VideoProbeError {
    #[error("failed to execute {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },
    #[error("{tool} failed on {path}: {stderr}")]
    CommandFailed {
        tool: &'static str,
        path: String,
        stderr: String,
    },
    #[error("unreadable probe output for {path}: {message}")]
    InvalidProbeOutput { path: String, message: String },
    #[error("no video stream found in {path}")]
    NoVideoStream { path: String },
    #[error("frame grab produced no image")]
    EmptyFrameGrab,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Frame access contract the sequence builder depends on. Implemented by
/// [`VideoProbeService`]; mocked in tests so sequence building can be
/// exercised without ffmpeg or real video files.
#[cfg_attr(test, mockall::automock)]
pub trait FrameGrabber: Send {
    /// Return the encoded image bytes of the frame nearest `seconds`.
    fn grab_frame(&self, path: &Path, seconds: f64) -> Result<Vec<u8>, VideoProbeError>;
}

/// Service for video metadata probing and frame grabs using FFmpeg
pub struct VideoProbeService {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl VideoProbeService {
    /// Create a new VideoProbeService
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }

    /// Create service with custom FFmpeg paths
    pub fn with_paths(ffmpeg_path: String, ffprobe_path: String) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    /// Extract video metadata (duration, resolution, format, codec, size)
    pub fn probe(&self, video_path: &Path) -> Result<VideoInfo, VideoProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,duration,codec_name,r_frame_rate",
                "-show_entries",
                "format=duration,size,format_name",
                "-of",
                "json",
            ])
            .arg(video_path)
            .output()
            .map_err(|source| VideoProbeError::Spawn {
                tool: "ffprobe",
                source,
            })?;

        if !output.status.success() {
            return Err(VideoProbeError::CommandFailed {
                tool: "ffprobe",
                path: video_path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parsed: Result<FfprobeOutput, anyhow::Error> = std::str::from_utf8(&output.stdout)
            .context("non-utf8 ffprobe output")
            .and_then(|json| {
                serde_json::from_str(json).context("unexpected ffprobe JSON shape")
            });

        let metadata = parsed.map_err(|e| VideoProbeError::InvalidProbeOutput {
            path: video_path.display().to_string(),
            message: format!("{e:#}"),
        })?;

        self.parse_video_info(video_path, metadata)
    }

    /// Validate video file format and quality before scoring
    pub fn validate(&self, video_path: &Path) -> Result<VideoValidation, VideoProbeError> {
        let info = self.probe(video_path)?;
        let issues = Self::validation_issues(&info);

        if !issues.is_empty() {
            warn!(
                "Video {} has {} validation issue(s)",
                video_path.display(),
                issues.len()
            );
        }

        Ok(VideoValidation {
            is_valid: issues.is_empty(),
            issues,
            info,
        })
    }

    /// Extract the frame nearest the given timestamp as JPEG bytes
    pub fn grab_frame(&self, video_path: &Path, seconds: f64) -> Result<Vec<u8>, VideoProbeError> {
        let scratch = TempDir::new()?;
        let frame_path = scratch.path().join("frame.jpg");

        let timestamp = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        };

        let output = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-ss", &format!("{timestamp:.3}")])
            .arg("-i")
            .arg(video_path)
            .args(["-frames:v", "1", "-q:v", "2", "-y"])
            .arg(&frame_path)
            .output()
            .map_err(|source| VideoProbeError::Spawn {
                tool: "ffmpeg",
                source,
            })?;

        if !output.status.success() {
            return Err(VideoProbeError::CommandFailed {
                tool: "ffmpeg",
                path: video_path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        match fs::read(&frame_path) {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            // ffmpeg exits zero on a seek past the end of stream without
            // writing anything.
            _ => Err(VideoProbeError::EmptyFrameGrab),
        }
    }

    /// Check if codec is supported
    fn is_supported_codec(codec: &str) -> bool {
        matches!(
            codec.to_lowercase().as_str(),
            "h264" | "h265" | "hevc" | "vp8" | "vp9" | "av1"
        )
    }

    fn validation_issues(info: &VideoInfo) -> Vec<String> {
        let mut issues = Vec::new();

        // Check minimum resolution (360p)
        if info.width < 640 || info.height < 360 {
            issues.push("Video resolution too low (minimum 640x360)".to_string());
        }

        // Check duration (minimum 1s, maximum 10 minutes)
        if info.duration_seconds < 1.0 {
            issues.push("Video too short (minimum 1 second)".to_string());
        }
        if info.duration_seconds > 600.0 {
            issues.push("Video too long (maximum 10 minutes)".to_string());
        }

        // Check codec compatibility
        if !Self::is_supported_codec(&info.video_codec) {
            issues.push(format!(
                "Unsupported video codec: {} (supported: h264, h265, vp8, vp9, av1)",
                info.video_codec
            ));
        }

        issues
    }

    /// Parse ffprobe output into VideoInfo
    fn parse_video_info(
        &self,
        video_path: &Path,
        metadata: FfprobeOutput,
    ) -> Result<VideoInfo, VideoProbeError> {
        let stream =
            metadata
                .streams
                .first()
                .ok_or_else(|| VideoProbeError::NoVideoStream {
                    path: video_path.display().to_string(),
                })?;

        let format = metadata.format;

        let info = VideoInfo {
            width: stream.width,
            height: stream.height,
            duration_seconds: stream
                .duration
                .clone()
                .or(format.duration)
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0),
            video_codec: stream.codec_name.clone(),
            fps: Self::parse_frame_rate(&stream.r_frame_rate),
            size_bytes: format.size.and_then(|s| s.parse::<i64>().ok()).unwrap_or(0),
            format_name: format.format_name,
        };

        info!(
            "Probed {}: {} {:.1}s {}fps",
            video_path.display(),
            info.resolution_string(),
            info.duration_seconds,
            info.fps
        );

        Ok(info)
    }

    /// Parse frame rate string (e.g., "30/1" -> 30.0)
    fn parse_frame_rate(rate_str: &str) -> f64 {
        if let Some((num, den)) = rate_str.split_once('/') {
            if let (Ok(n), Ok(d)) = (num.parse::<f64>(), den.parse::<f64>()) {
                if d != 0.0 {
                    return n / d;
                }
            }
        }
        0.0
    }
}

impl Default for VideoProbeService {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameGrabber for VideoProbeService {
    fn grab_frame(&self, path: &Path, seconds: f64) -> Result<Vec<u8>, VideoProbeError> {
        VideoProbeService::grab_frame(self, path, seconds)
    }
}

// FFprobe JSON output structures
#[derive(Debug, serde::Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, serde::Deserialize)]
struct FfprobeStream {
    width: i32,
    height: i32,
    duration: Option<String>,
    codec_name: String,
    r_frame_rate: String,
}

#[derive(Debug, serde::Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
    format_name: String,
}
