use serde::Serialize;

/// Video metadata information extracted by the probe.
#[derive(Debug, Clone, Serialize)]
pub struct VideoInfo {
    pub width: i32,
    pub height: i32,
    pub duration_seconds: f64,
    pub video_codec: String,
    pub fps: f64,
    pub size_bytes: i64,
    pub format_name: String,
}

impl VideoInfo {
    pub fn resolution_string(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Duration in whole milliseconds, floored at 1ms so ratio math never
    /// divides by zero.
    pub fn duration_ms(&self) -> u64 {
        let ms = (self.duration_seconds * 1000.0).round();
        if ms.is_finite() && ms >= 1.0 {
            ms as u64
        } else {
            1
        }
    }
}

/// Pre-scoring validation outcome for one video.
#[derive(Debug, Serialize)]
pub struct VideoValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub info: VideoInfo,
}
