//! ONNX pose-estimation adapter.
//!
//! Wraps a single-person keypoint network behind [`PoseEstimator`]. The
//! expected model contract:
//! - input: `[1, 3, S, S]` f32, BGR, values in [0, 255]
//! - output: `[1, K, 3]` with (x, y, score) per keypoint, coordinates
//!   normalized to the square input canvas, COCO keypoint ordering
//!   (5/6 shoulders, 11/12 hips)
//!
//! MoveNet- and BlazePose-family exports fit this shape. The model file
//! is supplied by the caller; it is an external collaborator, not an
//! asset of this crate.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};

use crate::landmarks::{LandmarkKind, LandmarkResult, NormalizedLandmark, PoseEstimator};
use crate::pipeline::TryOnError;

// COCO keypoint indices for the torso anchors
const COCO_ANCHORS: [(usize, LandmarkKind); 4] = [
    (5, LandmarkKind::LeftShoulder),
    (6, LandmarkKind::RightShoulder),
    (11, LandmarkKind::LeftHip),
    (12, LandmarkKind::RightHip),
];

fn session_builder() -> Result<ort::session::builder::SessionBuilder> {
    #[allow(unused_mut)]
    let mut builder =
        Session::builder()?.with_optimization_level(GraphOptimizationLevel::Level3)?;

    #[cfg(feature = "openvino")]
    {
        use ort::ep::{self, ExecutionProvider};
        let ep = ep::OpenVINO::default();
        if ep.is_available()? {
            ep.register(&mut builder)?;
        } else {
            log::warn!("openvino feature is enabled, onnx runtime not compiled with openvino")
        }
    }

    #[cfg(feature = "cuda")]
    {
        use ort::ep::{self, ExecutionProvider};
        let ep = ep::CUDA::default();
        if ep.is_available()? {
            ep.register(&mut builder)?;
        } else {
            log::warn!("cuda feature is enabled, onnx runtime not compiled with cuda")
        }
    }

    Ok(builder)
}

/// Pose estimator backed by an ONNX Runtime session.
///
/// One session per adapter; the session is acquired on construction and
/// released on drop, bracketing the pipeline that owns it.
pub struct OnnxPoseEstimator {
    session: Session,
    input_size: u32,
    score_threshold: f32,
}

impl OnnxPoseEstimator {
    pub fn from_file(model_path: &Path, input_size: u32, score_threshold: f32) -> Result<Self> {
        let session = session_builder()?
            .commit_from_file(model_path)
            .with_context(|| format!("load pose model {}", model_path.display()))?;
        Ok(Self {
            session,
            input_size,
            score_threshold,
        })
    }

    fn run(&mut self, img: &DynamicImage) -> Result<LandmarkResult> {
        let target_size = self.input_size;
        let (orig_width, orig_height) = img.dimensions();

        // Letterbox into a square canvas to avoid distortion
        let max_dim = orig_width.max(orig_height);
        let scale = target_size as f32 / max_dim as f32;
        let new_width = (orig_width as f32 * scale) as u32;
        let new_height = (orig_height as f32 * scale) as u32;

        let resized =
            img.resize_exact(new_width, new_height, image::imageops::FilterType::Triangle);
        let mut canvas = DynamicImage::new_rgb8(target_size, target_size);
        let offset_x = (target_size - new_width) / 2;
        let offset_y = (target_size - new_height) / 2;
        image::imageops::overlay(&mut canvas, &resized, offset_x as i64, offset_y as i64);

        let img_rgb = canvas.to_rgb8();

        // CHW planes in BGR order, values kept in [0, 255]
        let pixel_count = (target_size * target_size) as usize;
        let mut input_data = vec![0.0f32; 3 * pixel_count];
        let (b_channel, rest) = input_data.split_at_mut(pixel_count);
        let (g_channel, r_channel) = rest.split_at_mut(pixel_count);

        let pixels = img_rgb.as_raw();
        for i in 0..pixel_count {
            let idx = i * 3;
            r_channel[i] = pixels[idx] as f32;
            g_channel[i] = pixels[idx + 1] as f32;
            b_channel[i] = pixels[idx + 2] as f32;
        }

        let input_array = Array4::from_shape_vec(
            (1, 3, target_size as usize, target_size as usize),
            input_data,
        )?;
        let input_tensor = Value::from_array(input_array)?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;

        anyhow::ensure!(
            shape.len() == 3 && shape[2] == 3,
            "unexpected keypoint tensor shape {:?}",
            shape
        );
        let num_keypoints = shape[1] as usize;

        // Decode the torso anchors, un-letterboxing each coordinate back
        // to normalized original-image space.
        let mut landmarks = Vec::with_capacity(COCO_ANCHORS.len());
        for &(idx, kind) in &COCO_ANCHORS {
            if idx >= num_keypoints {
                continue;
            }
            let x = data[idx * 3];
            let y = data[idx * 3 + 1];
            let score = data[idx * 3 + 2];
            if score < self.score_threshold {
                continue;
            }

            let x_px = x * target_size as f32;
            let y_px = y * target_size as f32;
            landmarks.push(NormalizedLandmark {
                kind,
                x: ((x_px - offset_x as f32) / scale) / orig_width as f32,
                y: ((y_px - offset_y as f32) / scale) / orig_height as f32,
                score,
            });
        }

        if landmarks.is_empty() {
            return Ok(LandmarkResult::NoPerson);
        }
        Ok(LandmarkResult::Landmarks(landmarks))
    }
}

impl PoseEstimator for OnnxPoseEstimator {
    fn estimate(&mut self, img: &DynamicImage) -> Result<LandmarkResult, TryOnError> {
        self.run(img).map_err(TryOnError::Estimator)
    }
}
