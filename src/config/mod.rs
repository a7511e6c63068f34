use serde::{Deserialize, Serialize};
use std::env;

/// Engine configuration.
///
/// `fallback_score` and `coverage_penalty_max` are tunable defaults rather
/// than load-bearing constants; the shipped values were chosen empirically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// How many evenly spaced samples to request per video.
    pub target_frame_count: usize,
    /// Minimum usable frames per sequence for feature-based scoring to be
    /// statistically meaningful.
    pub min_valid_frames: usize,
    /// Linear stretch applied to the mapped similarity (1.0 = no change).
    pub similarity_weight: f64,
    /// Score returned when feature-based scoring lacks enough information.
    pub fallback_score: f64,
    /// Largest deduction the coverage penalty can apply.
    pub coverage_penalty_max: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_frame_count: 64,
            min_valid_frames: 12,
            similarity_weight: 1.0,
            fallback_score: 35.0,
            coverage_penalty_max: 10.0,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let target_frame_count = env::var("SCORING_TARGET_FRAME_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.target_frame_count);
        let min_valid_frames = env::var("SCORING_MIN_VALID_FRAMES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_valid_frames);
        let similarity_weight = env::var("SCORING_SIMILARITY_WEIGHT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.similarity_weight);
        let fallback_score = env::var("SCORING_FALLBACK_SCORE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.fallback_score);
        let coverage_penalty_max = env::var("SCORING_COVERAGE_PENALTY_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.coverage_penalty_max);

        Self {
            target_frame_count,
            min_valid_frames,
            similarity_weight,
            fallback_score,
            coverage_penalty_max,
        }
        .sanitized()
    }

    /// Clamp out-of-range values into something the pipeline can run with.
    /// A target below one sample or a negative weight is a configuration
    /// mistake, not a reason to fail scoring.
    pub fn sanitized(mut self) -> Self {
        self.target_frame_count = self.target_frame_count.max(1);
        self.min_valid_frames = self.min_valid_frames.max(1);
        if !self.similarity_weight.is_finite() || self.similarity_weight <= 0.0 {
            self.similarity_weight = 1.0;
        }
        if !self.fallback_score.is_finite() {
            self.fallback_score = 35.0;
        }
        self.fallback_score = self.fallback_score.clamp(0.0, 100.0);
        if !self.coverage_penalty_max.is_finite() || self.coverage_penalty_max < 0.0 {
            self.coverage_penalty_max = 10.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.target_frame_count, 64);
        assert_eq!(config.min_valid_frames, 12);
        assert_eq!(config.similarity_weight, 1.0);
        assert_eq!(config.fallback_score, 35.0);
        assert_eq!(config.coverage_penalty_max, 10.0);
    }

    #[test]
    fn test_sanitized_repairs_degenerate_values() {
        let config = ScoringConfig {
            target_frame_count: 0,
            min_valid_frames: 0,
            similarity_weight: -2.0,
            fallback_score: 250.0,
            coverage_penalty_max: -1.0,
        }
        .sanitized();

        assert_eq!(config.target_frame_count, 1);
        assert_eq!(config.min_valid_frames, 1);
        assert_eq!(config.similarity_weight, 1.0);
        assert_eq!(config.fallback_score, 100.0);
        assert_eq!(config.coverage_penalty_max, 10.0);
    }
}
