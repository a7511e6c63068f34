use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ScoringConfig;
use crate::models::{ScoreBreakdown, ScoringStrategy};
use crate::pose::{DetectorError, PoseDetector, PoseDetectorFactory};
use crate::services::heuristic_scoring_service::HeuristicScoringService;
use crate::services::sequence_builder_service::SequenceBuilderService;
use crate::services::similarity_service::SimilarityService;
use crate::services::temporal_alignment_service::TemporalAlignmentService;
use crate::services::video_probe_service::{VideoProbeError, VideoProbeService};

/// The two unrecoverable setup failures of the feature pipeline. Everything
/// else (dropout, short sequences, degenerate vectors) is absorbed into the
/// numeric output.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("video unreadable: {0}")]
    VideoUnreadable(#[from] VideoProbeError),
    #[error("pose detector unavailable: {0}")]
    DetectorUnavailable(#[from] DetectorError),
}

/// The scoring engine: compares a recorded practice video against a
/// reference video and produces one bounded score.
///
/// The engine exclusively owns one detector instance, acquired lazily on the
/// first scoring call and held until [`release`](Self::release) or drop.
/// `score` takes `&mut self`, so concurrent calls on one engine are a
/// compile error rather than a data race on the non-reentrant detector.
pub struct MovementScoringService {
    config: ScoringConfig,
    probe: VideoProbeService,
    builder: SequenceBuilderService,
    aligner: TemporalAlignmentService,
    similarity: SimilarityService,
    heuristic: HeuristicScoringService,
    detector_factory: Box<dyn PoseDetectorFactory>,
    detector: Option<Box<dyn PoseDetector>>,
}

impl MovementScoringService {
    pub fn new(config: ScoringConfig, detector_factory: Box<dyn PoseDetectorFactory>) -> Self {
        Self {
            config: config.sanitized(),
            probe: VideoProbeService::new(),
            builder: SequenceBuilderService::new(),
            aligner: TemporalAlignmentService::new(),
            similarity: SimilarityService::new(),
            heuristic: HeuristicScoringService::new(),
            detector_factory,
            detector: None,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score through the feature pipeline.
    ///
    /// Blocks for two full video probes plus per-frame inference; run it off
    /// any latency-sensitive thread. Only the two setup failures surface as
    /// errors so the caller can tell "no result" from "low-confidence
    /// result"; use [`score_or_fallback`](Self::score_or_fallback) when a
    /// number is always required.
    pub fn score(
        &mut self,
        recorded: &Path,
        reference: &Path,
    ) -> Result<ScoreBreakdown, ScoringError> {
        self.ensure_detector()?;

        let recorded_info = self.probe.probe(recorded)?;
        let reference_info = self.probe.probe(reference)?;

        let detector = self
            .detector
            .as_mut()
            .ok_or_else(|| DetectorError::ModelUnavailable("detector not initialized".into()))?;

        // One detector instance, two videos, strictly one after the other.
        let recorded_seq = self.builder.build_sequence(
            &self.probe,
            recorded,
            &recorded_info,
            self.config.target_frame_count,
            detector.as_mut(),
        );
        let reference_seq = self.builder.build_sequence(
            &self.probe,
            reference,
            &reference_info,
            self.config.target_frame_count,
            detector.as_mut(),
        );

        let (aligned_a, aligned_b) = self.aligner.align(
            &recorded_seq,
            &reference_seq,
            self.config.min_valid_frames,
            self.config.target_frame_count,
        );

        let breakdown = self.similarity.score_aligned(
            &self.config,
            &aligned_a,
            &aligned_b,
            recorded_seq.len(),
            reference_seq.len(),
        );

        info!(
            "Scored {} against {}: {:.1} ({:?})",
            recorded.display(),
            reference.display(),
            breakdown.value,
            breakdown.strategy
        );

        Ok(breakdown)
    }

    /// Score, falling back to the heuristic strategy instead of failing.
    ///
    /// This is the policy the practice-session layer uses when it must
    /// always persist some outcome.
    pub fn score_or_fallback(&mut self, recorded: &Path, reference: &Path) -> ScoreBreakdown {
        match self.select_strategy() {
            ScoringStrategy::FeatureBased => match self.score(recorded, reference) {
                Ok(breakdown) => breakdown,
                Err(e) => {
                    warn!("Feature scoring failed ({}), switching to heuristic", e);
                    self.heuristic_breakdown(recorded, reference)
                }
            },
            ScoringStrategy::Heuristic => self.heuristic_breakdown(recorded, reference),
        }
    }

    /// Pick a scoring strategy from detector availability. Initializes the
    /// detector as a side effect when it is available.
    pub fn select_strategy(&mut self) -> ScoringStrategy {
        match self.ensure_detector() {
            Ok(()) => ScoringStrategy::FeatureBased,
            Err(e) => {
                warn!("Pose detector unavailable ({}), heuristic strategy selected", e);
                ScoringStrategy::Heuristic
            }
        }
    }

    /// Release the detector and its native resources.
    ///
    /// Idempotent: calling it repeatedly or before the detector was ever
    /// initialized is a no-op. A later scoring call re-acquires lazily.
    pub fn release(&mut self) {
        if self.detector.take().is_some() {
            info!("Released pose detector");
        }
    }

    fn ensure_detector(&mut self) -> Result<(), DetectorError> {
        if self.detector.is_none() {
            info!("Initializing pose detector");
            self.detector = Some(self.detector_factory.create()?);
        }
        Ok(())
    }

    fn heuristic_breakdown(&self, recorded: &Path, reference: &Path) -> ScoreBreakdown {
        let recorded_ms = self
            .probe
            .probe(recorded)
            .map(|info| info.duration_ms())
            .unwrap_or(1);
        let reference_ms = self
            .probe
            .probe(reference)
            .map(|info| info.duration_ms())
            .unwrap_or(1);
        let recorded_bytes = fs::metadata(recorded).map(|m| m.len()).unwrap_or(0);

        let value = self
            .heuristic
            .heuristic_score(recorded_ms, reference_ms, recorded_bytes);

        info!(
            "Heuristic score for {} against {}: {:.1}",
            recorded.display(),
            reference.display(),
            value
        );

        ScoreBreakdown::heuristic(value)
    }
}
