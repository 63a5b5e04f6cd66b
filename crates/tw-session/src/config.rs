//! Session configuration.
//!
//! Every field has a default, so an empty JSON object is a complete config
//! describing the torus-knot flythrough with step navigation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tw_core::{Result, TwError, Validate};
use tw_geometry::curve::{Circle, TorusKnot};
use tw_geometry::Curve;
use tw_math::{Easing, Point3, Vector3};
use tw_scene::HighlightOptions;

/// Which closed curve the tube follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveConfig {
    TorusKnot {
        scale: f64,
        #[serde(default = "default_p")]
        p: u32,
        #[serde(default = "default_q")]
        q: u32,
    },
    /// Circle in the XZ plane around the origin.
    Circle { radius: f64 },
}

fn default_p() -> u32 {
    3
}

fn default_q() -> u32 {
    4
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self::TorusKnot {
            scale: 20.0,
            p: 3,
            q: 4,
        }
    }
}

impl CurveConfig {
    pub fn build(&self) -> Box<dyn Curve> {
        match *self {
            Self::TorusKnot { scale, p, q } => Box::new(TorusKnot::with_winding(scale, p, q)),
            Self::Circle { radius } => Box::new(Circle::new(Point3::ZERO, Vector3::Y, radius)),
        }
    }
}

/// How the camera moves along the tube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraMode {
    /// Continuous flythrough, one lap every `loop_ms`.
    Loop {
        #[serde(default = "default_loop_ms")]
        loop_ms: u64,
    },
    /// Travel between model stops on request.
    Steps {
        #[serde(default = "default_step_ms")]
        duration_ms: u64,
        #[serde(default)]
        easing: Easing,
    },
}

fn default_loop_ms() -> u64 {
    80_000
}

fn default_step_ms() -> u64 {
    2_000
}

impl Default for CameraMode {
    fn default() -> Self {
        Self::Steps {
            duration_ms: default_step_ms(),
            easing: Easing::CubicInOut,
        }
    }
}

impl CameraMode {
    fn duration(&self) -> Duration {
        match *self {
            Self::Loop { loop_ms } => Duration::from_millis(loop_ms),
            Self::Steps { duration_ms, .. } => Duration::from_millis(duration_ms),
        }
    }
}

/// A model to load and sit on the tube at parameter `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPlacement {
    pub url: String,
    pub t: f64,
    #[serde(default = "default_model_size")]
    pub size: f64,
    /// Distance from the centerline along the normal; defaults to just
    /// outside the tube wall.
    #[serde(default)]
    pub offset: Option<f64>,
}

fn default_model_size() -> f64 {
    2.0
}

impl ModelPlacement {
    pub fn new(url: &str, t: f64) -> Self {
        Self {
            url: url.to_string(),
            t,
            size: default_model_size(),
            offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub curve: CurveConfig,
    /// Scene units per curve unit.
    pub unit_scale: f64,
    pub segments: usize,
    /// Tube radius in curve units.
    pub tube_radius: f64,
    pub radial_segments: usize,
    /// Camera distance from the centerline along the normal.
    pub camera_offset: f64,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub width: f64,
    pub height: f64,
    pub mode: CameraMode,
    pub models: Vec<ModelPlacement>,
    pub highlight: HighlightOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            curve: CurveConfig::default(),
            unit_scale: 4.0,
            segments: 200,
            tube_radius: 2.0,
            radial_segments: 8,
            camera_offset: 15.0,
            fov_deg: 84.0,
            near: 0.01,
            far: 1000.0,
            width: 1280.0,
            height: 720.0,
            mode: CameraMode::default(),
            models: vec![
                ModelPlacement::new("./models/SCOOF.glb", 0.0),
                ModelPlacement::new("./models/SCOOF.glb", 0.33),
                ModelPlacement::new("./models/SCOOF.glb", 0.66),
            ],
            highlight: HighlightOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Tube radius in scene units.
    pub fn tube_world_radius(&self) -> f64 {
        self.tube_radius * self.unit_scale
    }

    /// Offset used for a model placement without one of its own.
    pub fn default_model_offset(&self) -> f64 {
        self.tube_world_radius() + 2.0
    }

    /// Curve parameters of the configured models, in order.
    pub fn stops(&self) -> Vec<f64> {
        self.models.iter().map(|m| m.t).collect()
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TwError::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> Result<()> {
        match self.curve {
            CurveConfig::TorusKnot { scale, p, q } => {
                positive("curve.scale", scale)?;
                if p == 0 || q == 0 {
                    return Err(TwError::InvalidConfig(
                        "torus knot windings must be non-zero".into(),
                    ));
                }
            }
            CurveConfig::Circle { radius } => positive("curve.radius", radius)?,
        }
        positive("unit_scale", self.unit_scale)?;
        positive("tube_radius", self.tube_radius)?;
        positive("near", self.near)?;
        positive("width", self.width)?;
        positive("height", self.height)?;
        if self.segments == 0 {
            return Err(TwError::InvalidConfig("segments must be > 0".into()));
        }
        if self.radial_segments < 3 {
            return Err(TwError::InvalidConfig(
                "radial_segments must be >= 3".into(),
            ));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(TwError::InvalidConfig(format!(
                "fov_deg must be in (0, 180), got {}",
                self.fov_deg
            )));
        }
        if self.far <= self.near {
            return Err(TwError::InvalidConfig("far must exceed near".into()));
        }
        if self.mode.duration().is_zero() {
            return Err(TwError::InvalidConfig(
                "camera mode duration must be > 0".into(),
            ));
        }
        for model in &self.models {
            positive("model size", model.size)?;
            if !model.t.is_finite() {
                return Err(TwError::InvalidConfig(format!(
                    "model '{}' has a non-finite t",
                    model.url
                )));
            }
        }
        if self.highlight.remove_duration < 0.0 {
            return Err(TwError::InvalidConfig(
                "highlight.remove_duration must be >= 0".into(),
            ));
        }
        Ok(())
    }
}
