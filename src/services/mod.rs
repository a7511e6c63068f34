// Scoring pipeline services

pub mod heuristic_scoring_service;
pub mod movement_scoring_service;
pub mod pose_feature_service;
pub mod sequence_builder_service;
pub mod similarity_service;
pub mod temporal_alignment_service;
pub mod video_probe_service;

pub use heuristic_scoring_service::HeuristicScoringService;
pub use movement_scoring_service::{MovementScoringService, ScoringError};
pub use pose_feature_service::PoseFeatureService;
pub use sequence_builder_service::SequenceBuilderService;
pub use similarity_service::SimilarityService;
pub use temporal_alignment_service::TemporalAlignmentService;
pub use video_probe_service::{FrameGrabber, VideoProbeError, VideoProbeService};
