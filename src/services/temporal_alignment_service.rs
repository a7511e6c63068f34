use crate::models::{DescriptorSequence, PoseDescriptor};

/// Service reconciling two descriptor sequences into equal-length aligned
/// pairs.
///
/// Equal-length inputs are paired directly, without interpolation; unequal
/// inputs are both resampled to a common length. Alignment is fully
/// deterministic: no randomness, no parallelism.
#[derive(Debug, Clone, Default)]
pub struct TemporalAlignmentService;

impl TemporalAlignmentService {
    pub fn new() -> Self {
        Self
    }

    /// Align two sequences to a common length.
    ///
    /// When lengths already match the inputs are returned as-is (exact
    /// correspondence is cheaper and avoids needless smoothing). Otherwise
    /// both are resampled to
    /// `clamp(min(len_a, len_b), min_valid_frames, target_frame_count)`.
    pub fn align(
        &self,
        seq_a: &DescriptorSequence,
        seq_b: &DescriptorSequence,
        min_valid_frames: usize,
        target_frame_count: usize,
    ) -> (Vec<PoseDescriptor>, Vec<PoseDescriptor>) {
        if seq_a.len() == seq_b.len() {
            return (seq_a.frames().to_vec(), seq_b.frames().to_vec());
        }

        // An empty side has nothing to pair against; the scorer's quality
        // gate owns that case.
        if seq_a.is_empty() || seq_b.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let floor = min_valid_frames.min(target_frame_count);
        let common = seq_a
            .len()
            .min(seq_b.len())
            .clamp(floor, target_frame_count);

        (
            Self::resample(seq_a.frames(), common),
            Self::resample(seq_b.frames(), common),
        )
    }

    /// Resample `frames` to exactly `length` entries by linear interpolation
    /// between the two nearest original samples.
    ///
    /// Output index i maps to position `p = i * (n - 1) / (length - 1)` in
    /// the original sequence; `floor(p)` and `floor(p) + 1` (clamped to the
    /// last index) are blended by the fractional part. A single-sample input
    /// maps everywhere, and a single-sample output takes the first frame, so
    /// neither end divides by zero. An empty input stays empty.
    fn resample(frames: &[PoseDescriptor], length: usize) -> Vec<PoseDescriptor> {
        if frames.is_empty() || length == 0 {
            return Vec::new();
        }

        let n = frames.len();
        if n == 1 {
            return vec![frames[0].clone(); length];
        }
        if length == 1 {
            return vec![frames[0].clone()];
        }

        let span = (n - 1) as f64 / (length - 1) as f64;
        (0..length)
            .map(|i| {
                let position = i as f64 * span;
                let lower = position.floor() as usize;
                let upper = (lower + 1).min(n - 1);
                let fraction = position - lower as f64;
                frames[lower].lerp(&frames[upper], fraction)
            })
            .collect()
    }
}
