//! Motion similarity scoring engine for exercise practice videos.
//!
//! Given a recorded practice video and a reference video, the engine samples
//! both at evenly spaced timestamps, converts detected skeletons into
//! position/scale-invariant joint-angle descriptors, aligns the two
//! descriptor sequences to a common length and aggregates frame-pairwise
//! cosine similarity into one bounded score in [0, 100]. A duration/size
//! heuristic provides an independent fallback whenever pose detection is
//! unavailable.
//!
//! Pose detection itself is external: callers plug in a detector through the
//! [`pose::PoseDetectorFactory`] seam.

pub mod config;
pub mod models;
pub mod pose;
pub mod services;

pub use config::ScoringConfig;
pub use models::{ScoreBreakdown, ScoringStrategy};
pub use services::{MovementScoringService, ScoringError};
