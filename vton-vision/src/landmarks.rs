//! Body landmark types and anchor extraction.
//!
//! Pose estimation itself is an external collaborator behind the
//! [`PoseEstimator`] trait; this module only converts its normalized
//! output into the four pixel-space anchors the fitting stage consumes.

use image::DynamicImage;

use crate::pipeline::TryOnError;

/// The body keypoints the fitting stage cares about.
///
/// Garment corners correspond to these in a fixed order (see [`AnchorSet`]),
/// so the set is closed: exactly shoulders and hips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkKind {
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
}

/// A single named landmark in normalized image coordinates.
///
/// `x` and `y` are in [0, 1] relative to the image the estimator saw;
/// `score` is the estimator's confidence for this keypoint.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedLandmark {
    pub kind: LandmarkKind,
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

/// Result of one pose-estimation call.
#[derive(Debug, Clone)]
pub enum LandmarkResult {
    /// No person found in the frame.
    NoPerson,
    /// Landmarks for the most confident person. May be missing entries
    /// when individual keypoints fell under the estimator's threshold.
    Landmarks(Vec<NormalizedLandmark>),
}

impl LandmarkResult {
    pub fn get(&self, kind: LandmarkKind) -> Option<&NormalizedLandmark> {
        match self {
            LandmarkResult::NoPerson => None,
            LandmarkResult::Landmarks(lms) => lms.iter().find(|l| l.kind == kind),
        }
    }
}

/// Pose-estimation collaborator boundary.
///
/// Implementations are stateless per call but may own a loaded model
/// session, so `estimate` takes `&mut self` (ort sessions require it).
pub trait PoseEstimator {
    fn estimate(&mut self, img: &DynamicImage) -> Result<LandmarkResult, TryOnError>;
}

/// The four pixel-space destination anchors, in correspondence order:
/// left-shoulder, right-shoulder, right-hip, left-hip.
///
/// This order must match the garment corner order (top-left, top-right,
/// bottom-right, bottom-left) or the fitted warp mirrors or rotates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSet {
    pub left_shoulder: (f64, f64),
    pub right_shoulder: (f64, f64),
    pub right_hip: (f64, f64),
    pub left_hip: (f64, f64),
}

impl AnchorSet {
    /// Anchors as an array in correspondence order.
    pub fn points(&self) -> [(f64, f64); 4] {
        [
            self.left_shoulder,
            self.right_shoulder,
            self.right_hip,
            self.left_hip,
        ]
    }
}

/// Convert normalized landmarks to pixel anchors for a target image size.
///
/// Returns `None` when the estimator found no person or any of the four
/// required landmarks is missing. That is reported, not retried: the
/// caller degrades to "garment cannot be fitted".
pub fn extract_anchors(landmarks: &LandmarkResult, width: u32, height: u32) -> Option<AnchorSet> {
    let to_pixel = |lm: &NormalizedLandmark| {
        (
            (lm.x as f64 * width as f64).round(),
            (lm.y as f64 * height as f64).round(),
        )
    };

    Some(AnchorSet {
        left_shoulder: to_pixel(landmarks.get(LandmarkKind::LeftShoulder)?),
        right_shoulder: to_pixel(landmarks.get(LandmarkKind::RightShoulder)?),
        right_hip: to_pixel(landmarks.get(LandmarkKind::RightHip)?),
        left_hip: to_pixel(landmarks.get(LandmarkKind::LeftHip)?),
    })
}
