pub mod compose;
pub mod garment;
pub mod harmonize;
pub mod landmarks;
pub mod pipeline;
pub mod pose;
pub mod transform;
pub mod warp;

// Re-export commonly used types
pub use garment::GarmentCategory;
pub use landmarks::{AnchorSet, LandmarkResult, PoseEstimator};
pub use pipeline::{TryOn, TryOnError, TryOnPipeline};
pub use pose::OnnxPoseEstimator;
pub use transform::PerspectiveTransform;
