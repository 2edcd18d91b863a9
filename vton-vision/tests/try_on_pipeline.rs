use std::path::PathBuf;

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use vton_vision::landmarks::{LandmarkKind, LandmarkResult, NormalizedLandmark, PoseEstimator};
use vton_vision::{GarmentCategory, TryOn, TryOnError, TryOnPipeline};

/// Test double for the external pose collaborator.
struct FixedEstimator(LandmarkResult);

impl PoseEstimator for FixedEstimator {
    fn estimate(&mut self, _img: &DynamicImage) -> Result<LandmarkResult, TryOnError> {
        Ok(self.0.clone())
    }
}

fn torso_landmarks() -> LandmarkResult {
    // Normalized for a 400x600 frame: shoulders at (120,150)/(280,150),
    // hips at (270,400)/(130,400)
    let lm = |kind, x, y| NormalizedLandmark {
        kind,
        x,
        y,
        score: 0.95,
    };
    LandmarkResult::Landmarks(vec![
        lm(LandmarkKind::LeftShoulder, 0.3, 0.25),
        lm(LandmarkKind::RightShoulder, 0.7, 0.25),
        lm(LandmarkKind::RightHip, 0.675, 0.6667),
        lm(LandmarkKind::LeftHip, 0.325, 0.6667),
    ])
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("vton-pipeline-tests").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_green_garment_tints_torso_quad_only() {
    let dir = scratch_dir("green");
    let person_path = dir.join("person.png");
    let garment_path = dir.join("garment.png");

    let person = RgbImage::from_pixel(400, 600, Rgb([90, 80, 70]));
    person.save(&person_path).unwrap();
    RgbaImage::from_pixel(300, 300, Rgba([0, 200, 0, 255]))
        .save(&garment_path)
        .unwrap();

    let mut pipeline = TryOnPipeline::new(Box::new(FixedEstimator(torso_landmarks())));
    let outcome = pipeline
        .try_on_paths(&person_path, &garment_path, GarmentCategory::Top)
        .unwrap();

    assert!(outcome.is_fitted());
    let result = outcome.into_image();
    assert_eq!(result.dimensions(), (400, 600));

    // Inside the destination quadrilateral: green-tinted
    let inside = result.get_pixel(200, 275);
    assert!(
        inside[1] > 150 && inside[0] < 60 && inside[2] < 60,
        "inside = {:?}",
        inside
    );

    // Outside the quad only harmonization applies, which nudges
    // brightness but keeps the person's color
    let outside = result.get_pixel(20, 550);
    assert!(
        (outside[0] as i32 - 90).abs() < 15
            && (outside[1] as i32 - 80).abs() < 15
            && (outside[2] as i32 - 70).abs() < 15,
        "outside = {:?}",
        outside
    );
}

#[test]
fn test_no_landmarks_returns_original_unchanged() {
    let dir = scratch_dir("no-pose");
    let person_path = dir.join("person.png");
    let garment_path = dir.join("garment.png");

    let person = RgbImage::from_pixel(64, 96, Rgb([33, 44, 55]));
    person.save(&person_path).unwrap();
    RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]))
        .save(&garment_path)
        .unwrap();

    let mut pipeline = TryOnPipeline::new(Box::new(FixedEstimator(LandmarkResult::NoPerson)));
    let outcome = pipeline
        .try_on_paths(&person_path, &garment_path, GarmentCategory::Top)
        .unwrap();

    assert!(!outcome.is_fitted());
    assert_eq!(outcome.into_image(), person);
}

#[test]
fn test_missing_garment_path_is_load_error() {
    let dir = scratch_dir("missing-garment");
    let person_path = dir.join("person.png");
    RgbImage::from_pixel(64, 96, Rgb([33, 44, 55]))
        .save(&person_path)
        .unwrap();

    let mut pipeline = TryOnPipeline::new(Box::new(FixedEstimator(torso_landmarks())));
    let err = pipeline
        .try_on_paths(
            &person_path,
            &dir.join("does-not-exist.png"),
            GarmentCategory::Top,
        )
        .unwrap_err();

    assert!(matches!(err, TryOnError::ImageLoad { .. }));
}

#[test]
fn test_missing_person_path_is_load_error() {
    let dir = scratch_dir("missing-person");
    let garment_path = dir.join("garment.png");
    RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]))
        .save(&garment_path)
        .unwrap();

    let mut pipeline = TryOnPipeline::new(Box::new(FixedEstimator(torso_landmarks())));
    let err = pipeline
        .try_on_paths(
            &dir.join("does-not-exist.jpg"),
            &garment_path,
            GarmentCategory::Top,
        )
        .unwrap_err();

    assert!(matches!(err, TryOnError::ImageLoad { .. }));
}
