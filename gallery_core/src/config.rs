use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::hover::HoverFeedbackKind;
use crate::media::MediaSource;
use crate::tween::Easing;

/// Top-level gallery settings. Every section falls back to the stock
/// constants when omitted from the JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub hover: HoverConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default)]
    pub media: Vec<MediaSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of planes; defaults to one per media source.
    pub plane_count: Option<usize>,
    /// Plane height in world units; width follows the footage aspect.
    pub plane_scale: f32,
    /// Side of the cube home positions are sampled from.
    pub plane_distance: f32,
    /// Lower bound of the per-tick pivot rotation, in radians.
    pub min_speed: f32,
    /// Upper bound of the per-tick pivot rotation, in radians.
    pub max_speed: f32,
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            plane_count: None,
            plane_scale: 1.0,
            plane_distance: 3.0,
            min_speed: 0.005,
            max_speed: 0.007,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub zoom: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: 120.0,
            distance: 5.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub duration_ms: u64,
    pub scale: f32,
    pub easing: Easing,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            scale: 3.0,
            easing: Easing::ExponentialInOut,
        }
    }
}

impl FocusConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub feedback: HoverFeedbackKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub enabled: bool,
    pub fade_ms: u64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fade_ms: 1500,
        }
    }
}

fn default_background() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

impl GalleryConfig {
    pub fn validate(&self) -> Result<()> {
        let scene = &self.scene;
        ensure!(
            scene.plane_scale > 0.0,
            "scene.plane_scale must be positive (got {})",
            scene.plane_scale
        );
        ensure!(
            scene.plane_distance >= 0.0,
            "scene.plane_distance must not be negative (got {})",
            scene.plane_distance
        );
        ensure!(
            scene.min_speed <= scene.max_speed,
            "scene.min_speed ({}) exceeds scene.max_speed ({})",
            scene.min_speed,
            scene.max_speed
        );
        ensure!(
            self.camera.zoom > 0.0,
            "camera.zoom must be positive (got {})",
            self.camera.zoom
        );
        ensure!(
            self.camera.near < self.camera.far,
            "camera.near ({}) must be closer than camera.far ({})",
            self.camera.near,
            self.camera.far
        );
        ensure!(
            self.focus.scale > 0.0,
            "focus.scale must be positive (got {})",
            self.focus.scale
        );
        Ok(())
    }
}

pub fn load_gallery_config(path: &Path) -> Result<GalleryConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading gallery config {}", path.display()))?;
    let config: GalleryConfig = serde_json::from_str(&data)
        .with_context(|| format!("parsing gallery config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating gallery config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_stock_constants() {
        let config = GalleryConfig::default();
        assert_eq!(config.scene.plane_distance, 3.0);
        assert_eq!(config.scene.min_speed, 0.005);
        assert_eq!(config.scene.max_speed, 0.007);
        assert_eq!(config.camera.zoom, 120.0);
        assert_eq!(config.focus.duration(), Duration::from_millis(1000));
        assert_eq!(config.focus.scale, 3.0);
        assert_eq!(config.focus.easing, Easing::ExponentialInOut);
        assert_eq!(config.hover.feedback, HoverFeedbackKind::Outline);
    }

    #[test]
    fn partial_file_keeps_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{
                "scene": {{ "plane_count": 6, "seed": 7 }},
                "hover": {{ "feedback": "wireframe" }},
                "media": [
                    {{ "identifier": "rainy",
                       "preview": "loops/loop_rainy_landscape.m3u8",
                       "full": "full/rainy_full.m3u8" }}
                ]
            }}"#
        )?;
        let config = load_gallery_config(file.path())?;
        assert_eq!(config.scene.plane_count, Some(6));
        assert_eq!(config.scene.seed, Some(7));
        assert_eq!(config.scene.plane_scale, 1.0);
        assert_eq!(config.hover.feedback, HoverFeedbackKind::Wireframe);
        assert_eq!(config.media.len(), 1);
        assert_eq!(config.camera.distance, 5.0);
        Ok(())
    }

    #[test]
    fn inverted_speed_range_is_rejected() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{ "scene": {{ "min_speed": 0.5, "max_speed": 0.1 }} }}"#)?;
        let err = load_gallery_config(file.path()).expect_err("range is inverted");
        assert!(format!("{err:#}").contains("min_speed"));
        Ok(())
    }
}
