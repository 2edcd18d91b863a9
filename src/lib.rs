pub mod config;
pub mod store;

// Re-export vision types for convenience
pub use vton_vision::{
    garment, pipeline, GarmentCategory, OnnxPoseEstimator, TryOn, TryOnError, TryOnPipeline,
};
