//! Application configuration.
//!
//! Every section carries `#[serde(default)]`, so a JSON document only
//! needs the keys it overrides.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::Period;
use crate::error::{ConfigError, Result};
use crate::geometry::StepPolicy;
use crate::math::polygon_2d::Winding;
use crate::render::OutlineParams;
use crate::scale::ScaleLaw;
use crate::scene::{Light, Rgb};
use crate::transition::Easing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    Orthographic,
    Perspective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub projection: ProjectionKind,
    /// Vertical field of view in degrees (perspective only).
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub zoom: f64,
    pub position: [f64; 3],
    pub target: [f64; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Orthographic,
            fov: 105.0,
            near: 0.01,
            far: 1000.0,
            zoom: 1.9,
            position: [0.0, -150.0, 250.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub screen_space_panning: bool,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_polar_angle: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            screen_space_panning: false,
            min_distance: 100.0,
            max_distance: 500.0,
            min_zoom: 0.25,
            max_zoom: 20.0,
            max_polar_angle: PI,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub law: ScaleLaw,
    pub range: [f64; 2],
    pub min_depth: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            law: ScaleLaw::default(),
            range: [0.0, 45.0],
            min_depth: crate::scale::MIN_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Winding of subpaths that are solids; the opposite winding marks holes.
    pub solid_winding: Winding,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            solid_winding: Winding::CounterClockwise,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Seconds.
    pub duration: f64,
    pub easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            easing: Easing::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub pixelation: bool,
    pub pixel_size: f64,
    pub outline: OutlineParams,
    pub fxaa: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            pixelation: true,
            pixel_size: 8.0,
            outline: OutlineParams::default(),
            fxaa: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Clear the highlighted region when the pointer leaves every mesh.
    pub clear_on_miss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Length of the axes gizmo; `None` hides it.
    pub axes_size: Option<f64>,
    pub camera_helper: bool,
    pub lights: Vec<Light>,
    /// Solid colors per category; categories not listed use the height
    /// gradient material.
    pub category_colors: BTreeMap<String, Rgb>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            axes_size: Some(350.0),
            camera_helper: true,
            lights: vec![
                Light::Ambient {
                    color: Rgb::WHITE,
                    intensity: 0.6,
                },
                Light::Directional {
                    color: Rgb::WHITE,
                    intensity: 0.8,
                    position: [100.0, -100.0, 200.0],
                },
            ],
            category_colors: BTreeMap::new(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub scale: ScaleConfig,
    pub outline: OutlineConfig,
    pub extrusion: StepPolicy,
    pub transition: TransitionConfig,
    pub post: PostConfig,
    pub surface: SurfaceConfig,
    pub interaction: InteractionConfig,
    pub scene: SceneConfig,
    /// Selectable periods; the first one is shown at startup.
    pub periods: Vec<Period>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            scale: ScaleConfig::default(),
            outline: OutlineConfig::default(),
            extrusion: StepPolicy::default(),
            transition: TransitionConfig::default(),
            post: PostConfig::default(),
            surface: SurfaceConfig::default(),
            interaction: InteractionConfig::default(),
            scene: SceneConfig::default(),
            periods: [2000, 2004, 2008, 2012, 2016, 2020]
                .into_iter()
                .map(Period)
                .collect(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_json_str(&text)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.into()));

        if self.periods.is_empty() {
            return invalid("at least one period is required");
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return invalid("camera near must be positive and below far");
        }
        if self.camera.zoom <= 0.0 {
            return invalid("camera zoom must be positive");
        }
        if self.controls.min_distance > self.controls.max_distance {
            return invalid("controls min_distance exceeds max_distance");
        }
        if !(self.controls.min_zoom > 0.0 && self.controls.min_zoom <= self.controls.max_zoom) {
            return invalid("controls zoom bounds are inverted or non-positive");
        }
        if !(0.0..=1.0).contains(&self.controls.damping_factor) {
            return invalid("controls damping_factor must lie in [0, 1]");
        }
        if self.scale.range[0] > self.scale.range[1] {
            return invalid("scale range must be ascending");
        }
        if self.scale.min_depth <= 0.0 {
            return invalid("scale min_depth must be positive");
        }
        match self.scale.law {
            ScaleLaw::Log { base } if !(base > 0.0 && (base - 1.0).abs() > f64::EPSILON) => {
                return invalid("log base must be positive and not 1");
            }
            ScaleLaw::Symlog { constant } if constant <= 0.0 => {
                return invalid("symlog constant must be positive");
            }
            _ => {}
        }
        if self.extrusion.step_height <= 0.0 || self.extrusion.max_steps == 0 {
            return invalid("extrusion step_height and max_steps must be positive");
        }
        if self.transition.duration <= 0.0 {
            return invalid("transition duration must be positive");
        }
        if self.post.pixel_size < 1.0 {
            return invalid("pixel_size must be at least 1");
        }
        if self.surface.width == 0 || self.surface.height == 0 || self.surface.pixel_ratio <= 0.0 {
            return invalid("surface dimensions must be positive");
        }
        Ok(())
    }
}
