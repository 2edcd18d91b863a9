use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("VTON_CONFIG_PATH").unwrap_or("/usr/local/etc/vton/config.toml"))
});

pub static STORE_PREFIX: Lazy<&'static Path> =
    Lazy::new(|| Path::new(option_env!("VTON_STORE_PREFIX").unwrap_or("/usr/local/etc/vton")));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the pose-estimation ONNX model. Required for try-on runs;
    /// the estimator is an external collaborator, not bundled.
    pub pose_model: Option<PathBuf>,
    /// Square input size the pose model expects.
    pub pose_input_size: u32,
    /// Minimum keypoint confidence; anchors under this are discarded.
    pub score_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pose_model: None,
            pose_input_size: 256,
            score_threshold: 0.3,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
