use serde::Serialize;

/// Which of the two independent scoring paths produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Joint-angle descriptors compared frame-pairwise (primary path).
    FeatureBased,
    /// Duration/size heuristic, no pose detection involved.
    Heuristic,
}

/// Result of one scoring call.
///
/// `value` is the single bounded score in [0, 100]; the remaining fields
/// exist so the practice-session layer can persist how the number came to be.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub strategy: ScoringStrategy,
    pub value: f64,
    /// Mapped similarity before the coverage penalty (equals `value` for the
    /// heuristic strategy).
    pub base_score: f64,
    /// Fraction of target samples that yielded a usable descriptor, across
    /// both videos.
    pub coverage: f64,
    pub coverage_penalty: f64,
    pub valid_frames_recorded: usize,
    pub valid_frames_reference: usize,
}

impl ScoreBreakdown {
    /// Fixed conservative outcome for sequences too sparse to be
    /// statistically meaningful.
    pub fn conservative(
        fallback_score: f64,
        valid_frames_recorded: usize,
        valid_frames_reference: usize,
    ) -> Self {
        Self {
            strategy: ScoringStrategy::FeatureBased,
            value: fallback_score,
            base_score: fallback_score,
            coverage: 0.0,
            coverage_penalty: 0.0,
            valid_frames_recorded,
            valid_frames_reference,
        }
    }

    pub fn heuristic(value: f64) -> Self {
        Self {
            strategy: ScoringStrategy::Heuristic,
            value,
            base_score: value,
            coverage: 0.0,
            coverage_penalty: 0.0,
            valid_frames_recorded: 0,
            valid_frames_reference: 0,
        }
    }
}
