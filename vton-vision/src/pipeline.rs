//! Try-on orchestration: pose lookup → anchors → fit → warp →
//! composite → harmonize.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage, RgbaImage};
use log::{debug, info};

use crate::compose::composite_over;
use crate::garment::{self, GarmentCategory};
use crate::harmonize::harmonize;
use crate::landmarks::{extract_anchors, PoseEstimator};
use crate::transform::PerspectiveTransform;
use crate::warp::warp_rgba;

/// Failures that abort a try-on call.
///
/// A missing pose is not an error: it degrades to
/// [`TryOn::PoseNotDetected`] so the caller still receives the original
/// image.
#[derive(Debug, thiserror::Error)]
pub enum TryOnError {
    #[error("failed to load image {path}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("pose estimator failure")]
    Estimator(#[source] anyhow::Error),
}

/// Outcome of a completed pipeline run.
#[derive(Debug)]
pub enum TryOn {
    /// The full harmonized composite.
    Fitted(RgbImage),
    /// No usable pose: the person image, unchanged. Callers must check
    /// this variant rather than assume any returned image is a fit.
    PoseNotDetected(RgbImage),
}

impl TryOn {
    pub fn is_fitted(&self) -> bool {
        matches!(self, TryOn::Fitted(_))
    }

    /// The result image regardless of outcome.
    pub fn into_image(self) -> RgbImage {
        match self {
            TryOn::Fitted(img) | TryOn::PoseNotDetected(img) => img,
        }
    }
}

/// Sequences the fitting stages and owns the pose-estimation collaborator.
///
/// Single-threaded and synchronous; each call works on its own buffers, so
/// independent pipelines may run in parallel threads without locking.
pub struct TryOnPipeline {
    estimator: Box<dyn PoseEstimator>,
}

impl TryOnPipeline {
    pub fn new(estimator: Box<dyn PoseEstimator>) -> Self {
        Self { estimator }
    }

    /// Path-based entry point: loads the person image, then the garment,
    /// then runs [`Self::fit`].
    ///
    /// Pose lookup happens before the garment load, so a missing pose
    /// returns the original image without touching the garment path.
    pub fn try_on_paths(
        &mut self,
        person_path: &Path,
        garment_path: &Path,
        category: GarmentCategory,
    ) -> Result<TryOn, TryOnError> {
        let person = image::open(person_path)
            .map_err(|source| TryOnError::ImageLoad {
                path: person_path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let landmarks = self
            .estimator
            .estimate(&DynamicImage::ImageRgb8(person.clone()))?;
        let anchors = match extract_anchors(&landmarks, person.width(), person.height()) {
            Some(anchors) => anchors,
            None => {
                info!("no usable pose detected; returning original image");
                return Ok(TryOn::PoseNotDetected(person));
            }
        };

        let garment = garment::load_garment(garment_path)?;
        Ok(TryOn::Fitted(fit_garment(&person, &garment, category, &anchors)))
    }

    /// In-memory entry point for callers that already hold decoded buffers.
    pub fn try_on(
        &mut self,
        person: &RgbImage,
        garment: &RgbaImage,
        category: GarmentCategory,
    ) -> Result<TryOn, TryOnError> {
        let landmarks = self
            .estimator
            .estimate(&DynamicImage::ImageRgb8(person.clone()))?;

        match extract_anchors(&landmarks, person.width(), person.height()) {
            Some(anchors) => Ok(TryOn::Fitted(fit_garment(person, garment, category, &anchors))),
            None => {
                info!("no usable pose detected; returning original image");
                Ok(TryOn::PoseNotDetected(person.clone()))
            }
        }
    }
}

/// Fit, warp, composite and harmonize. Infallible once anchors and both
/// buffers are in hand; a degenerate anchor quad yields a visibly wrong
/// warp rather than an error.
fn fit_garment(
    person: &RgbImage,
    garment: &RgbaImage,
    category: GarmentCategory,
    anchors: &crate::landmarks::AnchorSet,
) -> RgbImage {
    debug!(
        "fitting {} garment {}x{} onto anchors {:?}",
        category,
        garment.width(),
        garment.height(),
        anchors
    );

    let transform = PerspectiveTransform::fit_quad(garment.width(), garment.height(), anchors);
    let warped = warp_rgba(garment, &transform, person.width(), person.height());
    let composite = composite_over(person, &warped);
    harmonize(&composite)
}
