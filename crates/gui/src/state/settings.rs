//! Viewer settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutOptions;
use crate::scene::builder::TreemapStyle;
use crate::scene::city::CityConfig;
use crate::tooltip::TooltipKind;

/// Perspective camera setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.2,
            far: 1500.0,
        }
    }
}

/// Orbit controls limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Max angle from the vertical axis (radians)
    pub max_polar_angle: f32,
    /// Degrees of orbit per dragged pixel
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            min_distance: 150.0,
            max_distance: 750.0,
            max_polar_angle: std::f32::consts::PI / 2.5,
            rotate_speed: 0.4,
            zoom_speed: 0.002,
        }
    }
}

/// Heights and durations of the overview / focus camera transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    /// Camera height in the overview pose (camera sits above the origin)
    pub overview_height: f32,
    /// Camera height when focused on an object
    pub focus_height: f32,
    /// Height the camera is pulled back to before leaving the overview
    pub dolly_height: f32,
    pub dolly_duration: f32,
    pub duration: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            overview_height: 750.0,
            focus_height: 450.0,
            dolly_height: 600.0,
            dolly_duration: 0.1,
            duration: 0.25,
        }
    }
}

impl ZoomSettings {
    /// Poses scaled for the default toy city
    pub fn city() -> Self {
        Self {
            overview_height: 400.0,
            focus_height: 200.0,
            dolly_height: 320.0,
            ..Self::default()
        }
    }
}

/// Picking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingSettings {
    /// Max ray distance (world units) for an edge to count as hit
    pub line_threshold: f32,
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self { line_threshold: 1.0 }
    }
}

/// All viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub layout: LayoutOptions,
    pub treemap: TreemapStyle,
    pub camera: CameraSettings,
    pub controls: ControlsSettings,
    pub treemap_zoom: ZoomSettings,
    pub city_zoom: ZoomSettings,
    pub city: CityConfig,
    pub picking: PickingSettings,
    pub tooltip: TooltipKind,
    /// Background color RGB
    pub background_color: [u8; 3],
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            treemap: TreemapStyle::default(),
            camera: CameraSettings::default(),
            controls: ControlsSettings::default(),
            treemap_zoom: ZoomSettings::default(),
            city_zoom: ZoomSettings::city(),
            city: CityConfig::default(),
            picking: PickingSettings::default(),
            tooltip: TooltipKind::default(),
            background_color: [255, 255, 255],
        }
    }
}

impl ViewerSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "treemap3d", "treemap3d")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config directory, or defaults if missing or unreadable
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Read settings from `path`. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Option<Self> {
        let json = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring invalid settings: {e}");
                None
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(dir) = path.parent() {
            if std::fs::create_dir_all(dir).is_err() {
                return;
            }
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            if let Err(e) = std::fs::write(&path, json) {
                tracing::warn!(path = %path.display(), "failed to save settings: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "tooltip": "sprite", "camera": { "fov": 60.0 } }"#;
        let settings: ViewerSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.tooltip, TooltipKind::Sprite);
        assert_eq!(settings.camera.fov, 60.0);
        assert_eq!(settings.camera.far, 1500.0);
        assert_eq!(settings.layout, LayoutOptions::default());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("treemap3d-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let mut settings = ViewerSettings::default();
        settings.city.seed = 99;
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();
        assert_eq!(ViewerSettings::load_from(&path), Some(settings));

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(ViewerSettings::load_from(&path), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_defaults_match_treemap_scene() {
        let s = ViewerSettings::default();
        assert_eq!(s.controls.min_distance, 150.0);
        assert_eq!(s.treemap_zoom.overview_height, 750.0);
        assert_eq!(s.city_zoom.focus_height, 200.0);
        assert_eq!(s.background_color, [255, 255, 255]);
    }
}
