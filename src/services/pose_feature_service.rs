use crate::models::{landmark_index as idx, Landmark, PoseDescriptor, Skeleton};

/// Number of joint angles in a descriptor.
pub const DESCRIPTOR_LEN: usize = 8;

/// Landmarks the detector flags below this are treated as absent.
const MIN_VISIBILITY: f64 = 0.5;

/// Norms below this make an angle undefined; the angle is reported as 0.
const DEGENERATE_NORM: f64 = 1e-9;

/// Service converting one skeleton into a joint-angle descriptor.
///
/// Descriptors carry eight angles, each measured at a middle joint between
/// two adjacent joints: elbows (shoulder-elbow-wrist), shoulders
/// (elbow-shoulder-hip), hips (shoulder-hip-knee) and knees
/// (hip-knee-ankle), left then right. Angles are invariant to where the
/// subject stands and how large they appear, which is what makes recorded
/// and reference videos comparable at all.
#[derive(Debug, Clone, Default)]
pub struct PoseFeatureService;

impl PoseFeatureService {
    pub fn new() -> Self {
        Self
    }

    /// Extract a descriptor from one skeleton.
    ///
    /// Returns `None` when any required landmark is missing or below the
    /// visibility cutoff; the caller treats that as a dropped frame. Never
    /// panics on malformed input.
    pub fn extract(&self, skeleton: &Skeleton) -> Option<PoseDescriptor> {
        let left_shoulder = self.required(skeleton, idx::LEFT_SHOULDER)?;
        let right_shoulder = self.required(skeleton, idx::RIGHT_SHOULDER)?;
        let left_elbow = self.required(skeleton, idx::LEFT_ELBOW)?;
        let right_elbow = self.required(skeleton, idx::RIGHT_ELBOW)?;
        let left_wrist = self.required(skeleton, idx::LEFT_WRIST)?;
        let right_wrist = self.required(skeleton, idx::RIGHT_WRIST)?;
        let left_hip = self.required(skeleton, idx::LEFT_HIP)?;
        let right_hip = self.required(skeleton, idx::RIGHT_HIP)?;
        let left_knee = self.required(skeleton, idx::LEFT_KNEE)?;
        let right_knee = self.required(skeleton, idx::RIGHT_KNEE)?;
        let left_ankle = self.required(skeleton, idx::LEFT_ANKLE)?;
        let right_ankle = self.required(skeleton, idx::RIGHT_ANKLE)?;

        let angles = vec![
            Self::joint_angle(left_shoulder, left_elbow, left_wrist),
            Self::joint_angle(right_shoulder, right_elbow, right_wrist),
            Self::joint_angle(left_elbow, left_shoulder, left_hip),
            Self::joint_angle(right_elbow, right_shoulder, right_hip),
            Self::joint_angle(left_shoulder, left_hip, left_knee),
            Self::joint_angle(right_shoulder, right_hip, right_knee),
            Self::joint_angle(left_hip, left_knee, left_ankle),
            Self::joint_angle(right_hip, right_knee, right_ankle),
        ];

        Some(PoseDescriptor::from_vec(angles))
    }

    fn required<'a>(&self, skeleton: &'a Skeleton, index: usize) -> Option<&'a Landmark> {
        let landmark = skeleton.landmark(index)?;
        match landmark.visibility {
            Some(v) if v < MIN_VISIBILITY => None,
            _ => Some(landmark),
        }
    }

    /// Angle at vertex `b` between segments b->a and b->c, in radians.
    ///
    /// A near-zero segment (overlapping landmarks) makes the angle
    /// undefined; it is reported as 0 rather than NaN.
    fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
        let u = (a.x - b.x, a.y - b.y, a.z - b.z);
        let v = (c.x - b.x, c.y - b.y, c.z - b.z);

        let norm_u = (u.0 * u.0 + u.1 * u.1 + u.2 * u.2).sqrt();
        let norm_v = (v.0 * v.0 + v.1 * v.1 + v.2 * v.2).sqrt();
        if norm_u < DEGENERATE_NORM || norm_v < DEGENERATE_NORM {
            return 0.0;
        }

        let dot = u.0 * v.0 + u.1 * v.1 + u.2 * v.2;
        (dot / (norm_u * norm_v)).clamp(-1.0, 1.0).acos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    /// A full 33-landmark skeleton with every point at the origin.
    fn blank_skeleton() -> Vec<Landmark> {
        vec![Landmark::new(0.0, 0.0, 0.0); 33]
    }

    /// A plausible standing pose: arms straight down, legs straight.
    fn standing_skeleton() -> Vec<Landmark> {
        let mut lms = blank_skeleton();
        lms[idx::LEFT_SHOULDER] = Landmark::new(-0.2, 1.4, 0.0);
        lms[idx::RIGHT_SHOULDER] = Landmark::new(0.2, 1.4, 0.0);
        lms[idx::LEFT_ELBOW] = Landmark::new(-0.2, 1.1, 0.0);
        lms[idx::RIGHT_ELBOW] = Landmark::new(0.2, 1.1, 0.0);
        lms[idx::LEFT_WRIST] = Landmark::new(-0.2, 0.8, 0.0);
        lms[idx::RIGHT_WRIST] = Landmark::new(0.2, 0.8, 0.0);
        lms[idx::LEFT_HIP] = Landmark::new(-0.15, 0.9, 0.0);
        lms[idx::RIGHT_HIP] = Landmark::new(0.15, 0.9, 0.0);
        lms[idx::LEFT_KNEE] = Landmark::new(-0.15, 0.45, 0.0);
        lms[idx::RIGHT_KNEE] = Landmark::new(0.15, 0.45, 0.0);
        lms[idx::LEFT_ANKLE] = Landmark::new(-0.15, 0.0, 0.0);
        lms[idx::RIGHT_ANKLE] = Landmark::new(0.15, 0.0, 0.0);
        lms
    }

    #[test]
    fn test_straight_arm_is_pi() {
        let shoulder = Landmark::new(0.0, 2.0, 0.0);
        let elbow = Landmark::new(0.0, 1.0, 0.0);
        let wrist = Landmark::new(0.0, 0.0, 0.0);

        let angle = PoseFeatureService::joint_angle(&shoulder, &elbow, &wrist);
        assert!((angle - PI).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let a = Landmark::new(1.0, 0.0, 0.0);
        let b = Landmark::new(0.0, 0.0, 0.0);
        let c = Landmark::new(0.0, 1.0, 0.0);

        let angle = PoseFeatureService::joint_angle(&a, &b, &c);
        assert!((angle - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_segment_is_zero() {
        let point = Landmark::new(0.3, 0.3, 0.3);
        let other = Landmark::new(1.0, 0.0, 0.0);

        assert_eq!(PoseFeatureService::joint_angle(&point, &point, &other), 0.0);
        assert_eq!(PoseFeatureService::joint_angle(&other, &point, &point), 0.0);
    }

    #[test]
    fn test_extract_descriptor_length() {
        let service = PoseFeatureService::new();
        let descriptor = service
            .extract(&Skeleton::new(standing_skeleton()))
            .unwrap();
        assert_eq!(descriptor.len(), DESCRIPTOR_LEN);
    }

    #[test]
    fn test_extract_standing_pose_angles() {
        let service = PoseFeatureService::new();
        let descriptor = service
            .extract(&Skeleton::new(standing_skeleton()))
            .unwrap();

        // Straight arms: elbow angles are pi.
        assert!((descriptor.angles()[0] - PI).abs() < 1e-9);
        assert!((descriptor.angles()[1] - PI).abs() < 1e-9);
        // Straight legs: knee angles are pi.
        assert!((descriptor.angles()[6] - PI).abs() < 1e-9);
        assert!((descriptor.angles()[7] - PI).abs() < 1e-9);
    }

    #[test]
    fn test_extract_short_skeleton_is_none() {
        let service = PoseFeatureService::new();
        let skeleton = Skeleton::new(blank_skeleton()[..20].to_vec());
        assert!(service.extract(&skeleton).is_none());

        assert!(service.extract(&Skeleton::new(Vec::new())).is_none());
    }

    #[test]
    fn test_extract_low_visibility_required_landmark_is_none() {
        let service = PoseFeatureService::new();
        let mut lms = standing_skeleton();
        lms[idx::LEFT_KNEE].visibility = Some(0.2);
        assert!(service.extract(&Skeleton::new(lms)).is_none());
    }

    #[test]
    fn test_extract_ignores_face_landmark_visibility() {
        let service = PoseFeatureService::new();
        let mut lms = standing_skeleton();
        // Nose occluded: irrelevant, not a required landmark.
        lms[0].visibility = Some(0.0);
        assert!(service.extract(&Skeleton::new(lms)).is_some());
    }

    #[test]
    fn test_extract_degenerate_all_origin_pose() {
        let service = PoseFeatureService::new();
        let descriptor = service.extract(&Skeleton::new(blank_skeleton())).unwrap();
        assert!(descriptor.angles().iter().all(|&a| a == 0.0));
    }
}
