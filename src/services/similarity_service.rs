use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::models::{PoseDescriptor, ScoreBreakdown, ScoringStrategy};

/// Norms below this make cosine similarity undefined.
const COSINE_EPSILON: f64 = 1e-9;

/// Service aggregating aligned descriptor pairs into one bounded score.
#[derive(Debug, Clone, Default)]
pub struct SimilarityService;

impl SimilarityService {
    pub fn new() -> Self {
        Self
    }

    /// Score two aligned descriptor runs.
    ///
    /// `valid_a` / `valid_b` are the original (pre-alignment) sequence
    /// lengths; they drive both the quality gate and the coverage penalty.
    ///
    /// The gate comes first: sequences below `min_valid_frames` are not
    /// statistically meaningful, so the conservative fallback score is
    /// returned without looking at the descriptors. Undefined pairs
    /// (zero-norm or mismatched dimensionality) are excluded from the mean
    /// rather than counted as zero, so degenerate frames do not drag an
    /// otherwise good match down. With no valid pair left, the result is
    /// again the conservative fallback: "insufficient information", not
    /// "zero similarity".
    pub fn score_aligned(
        &self,
        config: &ScoringConfig,
        aligned_a: &[PoseDescriptor],
        aligned_b: &[PoseDescriptor],
        valid_a: usize,
        valid_b: usize,
    ) -> ScoreBreakdown {
        if valid_a < config.min_valid_frames || valid_b < config.min_valid_frames {
            warn!(
                "Sequences too sparse for feature scoring ({} / {} valid, need {}), \
                 returning conservative score",
                valid_a, valid_b, config.min_valid_frames
            );
            return ScoreBreakdown::conservative(config.fallback_score, valid_a, valid_b);
        }

        let mut similarities = Vec::with_capacity(aligned_a.len());
        for (a, b) in aligned_a.iter().zip(aligned_b.iter()) {
            match Self::cosine_similarity(a, b) {
                Some(similarity) => similarities.push(similarity),
                None => debug!("Skipping undefined descriptor pair"),
            }
        }

        if similarities.is_empty() {
            warn!("No valid descriptor pairs, returning conservative score");
            return ScoreBreakdown::conservative(config.fallback_score, valid_a, valid_b);
        }

        let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
        let mapped = ((mean + 1.0) / 2.0) * 100.0;
        let base_score = (mapped * config.similarity_weight).clamp(0.0, 100.0);

        let coverage = ((valid_a + valid_b) as f64 / (2.0 * config.target_frame_count as f64))
            .clamp(0.0, 1.0);
        let coverage_penalty = (1.0 - coverage) * config.coverage_penalty_max;
        let value = (base_score - coverage_penalty).clamp(0.0, 100.0);

        ScoreBreakdown {
            strategy: ScoringStrategy::FeatureBased,
            value,
            base_score,
            coverage,
            coverage_penalty,
            valid_frames_recorded: valid_a,
            valid_frames_reference: valid_b,
        }
    }

    /// Cosine similarity of two descriptors, clamped to [-1, 1].
    ///
    /// `None` when either vector is near zero-norm or the dimensionalities
    /// differ; such pairs are excluded from aggregation.
    fn cosine_similarity(a: &PoseDescriptor, b: &PoseDescriptor) -> Option<f64> {
        if a.len() != b.len() {
            warn!(
                "Descriptor dimensionality mismatch: {} vs {}",
                a.len(),
                b.len()
            );
            return None;
        }

        let norm_a = a.norm();
        let norm_b = b.norm();
        if norm_a < COSINE_EPSILON || norm_b < COSINE_EPSILON {
            return None;
        }

        let dot = a.angles().dot(b.angles());
        Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}
