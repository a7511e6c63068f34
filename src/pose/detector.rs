use thiserror::Error;

use crate::models::Skeleton;

/// One sampled video frame as handed to the detector: encoded image bytes
/// (JPEG from the frame grab) plus its source timestamp.
#[derive(Debug, Clone)]
pub struct FrameImage {
    pub data: Vec<u8>,
    pub timestamp_seconds: f64,
}

impl FrameImage {
    pub fn new(data: Vec<u8>, timestamp_seconds: f64) -> Self {
        Self {
            data,
            timestamp_seconds,
        }
    }
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("pose model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("pose inference failed: {0}")]
    Inference(String),
}

/// External pose detector contract.
///
/// `detect` takes `&mut self` on purpose: detector implementations wrap
/// stateful native inference handles that are not safe to invoke
/// concurrently, and the exclusive borrow makes sharing one instance across
/// threads a compile error.
#[cfg_attr(test, mockall::automock)]
pub trait PoseDetector: Send {
    /// Run pose detection on one frame. `Ok(None)` means no subject was
    /// found in the frame; an error means inference itself failed. Both are
    /// treated as detection dropout by the sequence builder.
    fn detect(&mut self, frame: &FrameImage) -> Result<Option<Skeleton>, DetectorError>;
}

/// Creates detector instances, surfacing initialization failures (missing or
/// corrupt model assets) before any frame is processed.
#[cfg_attr(test, mockall::automock)]
pub trait PoseDetectorFactory: Send {
    fn create(&self) -> Result<Box<dyn PoseDetector>, DetectorError>;
}
