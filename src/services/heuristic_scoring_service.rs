use tracing::debug;

/// A recording running long past the reference gets at most this ratio
/// credit.
const DURATION_RATIO_CAP: f64 = 1.2;

/// File size at which the stability proxy saturates.
const STABILITY_FULL_SIZE_MB: f64 = 25.0;
const STABILITY_FLOOR: f64 = 0.3;

const DURATION_WEIGHT: f64 = 70.0;
const STABILITY_WEIGHT: f64 = 20.0;

const MIN_SCORE: f64 = 30.0;
const MAX_SCORE: f64 = 95.0;

/// Scoring path that needs only durations and a file size.
///
/// This is the mandatory fallback whenever the feature pipeline's detector
/// is unavailable: it never consults pose detection and never fails. The
/// size factor is a crude stability proxy (larger files weakly correlate
/// with higher bitrate), not a real quality metric.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScoringService;

impl HeuristicScoringService {
    pub fn new() -> Self {
        Self
    }

    /// Heuristic score in [30, 95] from durations and recorded file size.
    ///
    /// Durations are floored at 1ms so the ratio stays defined.
    pub fn heuristic_score(
        &self,
        recorded_duration_ms: u64,
        reference_duration_ms: u64,
        recorded_size_bytes: u64,
    ) -> f64 {
        let recorded = recorded_duration_ms.max(1) as f64;
        let reference = reference_duration_ms.max(1) as f64;
        let duration_ratio = (recorded / reference).min(DURATION_RATIO_CAP);

        let size_mb = recorded_size_bytes as f64 / (1024.0 * 1024.0);
        let stability = (size_mb / STABILITY_FULL_SIZE_MB).clamp(STABILITY_FLOOR, 1.0);

        let base = DURATION_WEIGHT * duration_ratio + STABILITY_WEIGHT * stability;
        let score = base.clamp(MIN_SCORE, MAX_SCORE);

        debug!(
            "Heuristic score {:.1} (ratio {:.3}, stability {:.3})",
            score, duration_ratio, stability
        );

        score
    }
}
