use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::{DescriptorSequence, VideoInfo};
use crate::pose::{FrameImage, PoseDetector};
use crate::services::pose_feature_service::PoseFeatureService;
use crate::services::video_probe_service::FrameGrabber;

/// Service that turns one video into a descriptor sequence.
///
/// Frames are grabbed and detected strictly in timestamp order with a single
/// detector instance; the detector is a non-reentrant resource and must never
/// be shared across concurrent invocations.
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilderService {
    features: PoseFeatureService,
}

impl SequenceBuilderService {
    pub fn new() -> Self {
        Self {
            features: PoseFeatureService::new(),
        }
    }

    /// Sample the video at evenly spaced timestamps and collect a descriptor
    /// per frame where detection and extraction both succeed.
    ///
    /// Detection dropout is expected and never aborts the build: a failed
    /// grab, an empty detection or an unusable skeleton just leaves a gap.
    /// The returned sequence therefore has anywhere from zero to
    /// `target_frame_count` entries, ordered by source timestamp. Whether a
    /// video can be opened at all is the probe's concern, settled before this
    /// is called.
    pub fn build_sequence(
        &self,
        grabber: &dyn FrameGrabber,
        video_path: &Path,
        info: &VideoInfo,
        target_frame_count: usize,
        detector: &mut dyn PoseDetector,
    ) -> DescriptorSequence {
        let timestamps = Self::sample_timestamps(info.duration_seconds, target_frame_count);
        let mut sequence = DescriptorSequence::new();

        for (index, &seconds) in timestamps.iter().enumerate() {
            let frame = match grabber.grab_frame(video_path, seconds) {
                Ok(bytes) => FrameImage::new(bytes, seconds),
                Err(e) => {
                    debug!("Sample {} at {:.3}s dropped (grab): {}", index, seconds, e);
                    continue;
                }
            };

            let skeleton = match detector.detect(&frame) {
                Ok(Some(skeleton)) => skeleton,
                Ok(None) => {
                    debug!("Sample {} at {:.3}s dropped (no subject)", index, seconds);
                    continue;
                }
                Err(e) => {
                    warn!("Sample {} at {:.3}s dropped (inference): {}", index, seconds, e);
                    continue;
                }
            };

            match self.features.extract(&skeleton) {
                Some(descriptor) => sequence.push(descriptor),
                None => {
                    debug!(
                        "Sample {} at {:.3}s dropped (incomplete skeleton)",
                        index, seconds
                    );
                }
            }
        }

        info!(
            "Built sequence for {}: {} usable of {} sampled frames",
            video_path.display(),
            sequence.len(),
            timestamps.len()
        );

        sequence
    }

    /// Evenly spaced sample timestamps across the video duration:
    /// `t_i = i * duration / max(1, target - 1)`.
    ///
    /// An unknown or non-positive duration falls back to a unit time base so
    /// the division stays defined; the resulting undersized sequence is
    /// handled by the downstream quality gate.
    fn sample_timestamps(duration_seconds: f64, target_frame_count: usize) -> Vec<f64> {
        let duration = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            duration_seconds
        } else {
            1.0
        };

        let spacing_base = target_frame_count.saturating_sub(1).max(1) as f64;
        (0..target_frame_count)
            .map(|i| i as f64 * duration / spacing_base)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Landmark, Skeleton};
    use crate::pose::{DetectorError, MockPoseDetector};
    use crate::services::video_probe_service::{MockFrameGrabber, VideoProbeError};

    fn full_skeleton() -> Skeleton {
        Skeleton::new(vec![Landmark::new(0.1, 0.2, 0.0); 33])
    }

    fn test_info(duration_seconds: f64) -> VideoInfo {
        VideoInfo {
            width: 1280,
            height: 720,
            duration_seconds,
            video_codec: "h264".to_string(),
            fps: 30.0,
            size_bytes: 4_000_000,
            format_name: "mp4".to_string(),
        }
    }

    #[test]
    fn test_sample_timestamps_even_spacing() {
        let ts = SequenceBuilderService::sample_timestamps(10.0, 5);
        assert_eq!(ts, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn test_sample_timestamps_single_sample() {
        let ts = SequenceBuilderService::sample_timestamps(10.0, 1);
        assert_eq!(ts, vec![0.0]);
    }

    #[test]
    fn test_sample_timestamps_unknown_duration_uses_unit_base() {
        let ts = SequenceBuilderService::sample_timestamps(0.0, 3);
        assert_eq!(ts, vec![0.0, 0.5, 1.0]);

        let ts = SequenceBuilderService::sample_timestamps(f64::NAN, 2);
        assert_eq!(ts, vec![0.0, 1.0]);
    }

    #[test]
    fn test_build_sequence_full_detection() {
        let mut grabber = MockFrameGrabber::new();
        grabber
            .expect_grab_frame()
            .times(8)
            .returning(|_, _| Ok(vec![0u8; 16]));

        let mut detector = MockPoseDetector::new();
        detector
            .expect_detect()
            .times(8)
            .returning(|_| Ok(Some(full_skeleton())));

        let builder = SequenceBuilderService::new();
        let sequence = builder.build_sequence(
            &grabber,
            Path::new("recorded.mp4"),
            &test_info(8.0),
            8,
            &mut detector,
        );

        assert_eq!(sequence.len(), 8);
    }

    #[test]
    fn test_build_sequence_skips_detection_misses() {
        let mut grabber = MockFrameGrabber::new();
        grabber.expect_grab_frame().returning(|_, _| Ok(vec![0u8; 16]));

        let mut detector = MockPoseDetector::new();
        let mut calls = 0u32;
        detector.expect_detect().returning(move |_| {
            calls += 1;
            if calls % 2 == 0 {
                Ok(Some(full_skeleton()))
            } else {
                Ok(None)
            }
        });

        let builder = SequenceBuilderService::new();
        let sequence = builder.build_sequence(
            &grabber,
            Path::new("recorded.mp4"),
            &test_info(10.0),
            10,
            &mut detector,
        );

        assert_eq!(sequence.len(), 5);
    }

    #[test]
    fn test_build_sequence_grab_failures_are_dropout() {
        let mut grabber = MockFrameGrabber::new();
        grabber
            .expect_grab_frame()
            .returning(|_, _| Err(VideoProbeError::EmptyFrameGrab));

        let mut detector = MockPoseDetector::new();
        detector.expect_detect().never();

        let builder = SequenceBuilderService::new();
        let sequence = builder.build_sequence(
            &grabber,
            Path::new("recorded.mp4"),
            &test_info(5.0),
            6,
            &mut detector,
        );

        assert!(sequence.is_empty());
    }

    #[test]
    fn test_build_sequence_inference_errors_are_dropout() {
        let mut grabber = MockFrameGrabber::new();
        grabber.expect_grab_frame().returning(|_, _| Ok(vec![0u8; 16]));

        let mut detector = MockPoseDetector::new();
        detector
            .expect_detect()
            .returning(|_| Err(DetectorError::Inference("delegate crashed".to_string())));

        let builder = SequenceBuilderService::new();
        let sequence = builder.build_sequence(
            &grabber,
            Path::new("recorded.mp4"),
            &test_info(5.0),
            4,
            &mut detector,
        );

        assert!(sequence.is_empty());
    }

    #[test]
    fn test_build_sequence_incomplete_skeletons_are_dropout() {
        let mut grabber = MockFrameGrabber::new();
        grabber.expect_grab_frame().returning(|_, _| Ok(vec![0u8; 16]));

        let mut detector = MockPoseDetector::new();
        // Upper body only: extraction cannot produce a descriptor.
        detector
            .expect_detect()
            .returning(|_| Ok(Some(Skeleton::new(vec![Landmark::new(0.0, 0.0, 0.0); 17]))));

        let builder = SequenceBuilderService::new();
        let sequence = builder.build_sequence(
            &grabber,
            Path::new("recorded.mp4"),
            &test_info(5.0),
            4,
            &mut detector,
        );

        assert!(sequence.is_empty());
    }
}
