//! Garment image loading.

use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::pipeline::TryOnError;

/// Garment kind tag carried by the record store.
///
/// Currently read but not used to change anchor selection: every garment is
/// fitted to the same shoulder/hip torso quad regardless of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GarmentCategory {
    Top,
    Bottom,
    Full,
}

impl std::str::FromStr for GarmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(GarmentCategory::Top),
            "bottom" => Ok(GarmentCategory::Bottom),
            "full" => Ok(GarmentCategory::Full),
            other => Err(format!("unknown garment category: {other}")),
        }
    }
}

impl std::fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GarmentCategory::Top => write!(f, "top"),
            GarmentCategory::Bottom => write!(f, "bottom"),
            GarmentCategory::Full => write!(f, "full"),
        }
    }
}

/// Load a garment image, guaranteeing an alpha channel.
///
/// PNG garments carry their own transparency; 3-channel inputs (JPEG) get a
/// synthesized fully-opaque alpha plane so every downstream stage can assume
/// four channels. An unreadable or undecodable path aborts the try-on for
/// this garment with [`TryOnError::ImageLoad`].
pub fn load_garment(path: &Path) -> Result<RgbaImage, TryOnError> {
    let img = image::open(path).map_err(|source| TryOnError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    // `to_rgba8` fills alpha with 255 for opaque inputs.
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_opaque_alpha_synthesized_for_rgb_input() {
        let dir = std::env::temp_dir().join("vton-garment-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flat.png");

        let rgb = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        rgb.save(&path).unwrap();

        let garment = load_garment(&path).unwrap();
        for px in garment.pixels() {
            assert_eq!(px.0, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn test_missing_path_is_load_error() {
        let err = load_garment(Path::new("/nonexistent/garment.png")).unwrap_err();
        assert!(matches!(err, TryOnError::ImageLoad { .. }));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("TOP".parse::<GarmentCategory>(), Ok(GarmentCategory::Top));
        assert_eq!(
            "bottom".parse::<GarmentCategory>(),
            Ok(GarmentCategory::Bottom)
        );
        assert!("dress".parse::<GarmentCategory>().is_err());
    }
}
