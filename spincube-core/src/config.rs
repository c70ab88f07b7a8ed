/// Scene configuration: camera, animation speeds, bounce bounds and variant
/// selection
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mat4::{Vec3, AXIS_EPSILON};

/// Order in which the model-view matrix is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOrder {
    /// `T(position) * R(angle)`: the cube spins about its own center.
    #[default]
    TranslateThenRotate,
    /// `R(angle) * T(position)`: the cube orbits the camera axis.
    RotateThenTranslate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shading {
    /// Per-face vertex colors only.
    #[default]
    Flat,
    /// Vertex colors modulated by a directional light through the normal
    /// matrix.
    Lit,
}

/// Where the cube bounces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bounds {
    /// Constant half-extents on x and y.
    Fixed { x: f32, y: f32 },
    /// Half-extents of the visible frustum slice at the cube's depth, shrunk
    /// by `margin`.
    AspectDerived { margin: f32 },
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::Fixed { x: 2.0, y: 2.0 }
    }
}

/// Half-extents resolved for a particular viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceLimits {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Radians added per nominal frame.
    pub rotation_speed: f32,
    pub rotation_axis: Vec3,
    pub start_position: Vec3,
    /// Units moved per nominal frame.
    pub start_velocity: Vec3,
    pub bounds: Bounds,
    pub order: TransformOrder,
    pub shading: Shading,
    pub cube_size: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            rotation_speed: 0.01,
            rotation_axis: [1.0, 1.0, 0.0],
            start_position: [0.0, 0.0, -3.0],
            start_velocity: [0.01, 0.01, 0.0],
            bounds: Bounds::default(),
            order: TransformOrder::default(),
            shading: Shading::default(),
            cube_size: 2.0,
        }
    }
}

impl SceneConfig {
    /// Flat-colored cube bouncing inside fixed ±2 bounds.
    pub fn basic() -> Self {
        Self::default()
    }

    /// Lit cube with normals, further from the camera and bouncing off the
    /// edges of the visible frustum.
    pub fn lit() -> Self {
        Self {
            shading: Shading::Lit,
            start_position: [0.0, 0.0, -6.0],
            rotation_axis: [0.0, 1.0, 1.0],
            bounds: Bounds::AspectDerived { margin: 1.0 },
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SceneConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(Error::Config(format!(
                "fov_y_degrees must be in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(Error::Config(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        let [x, y, z] = self.rotation_axis;
        if (x * x + y * y + z * z).sqrt() < AXIS_EPSILON {
            return Err(Error::Config("rotation_axis must be non-zero".to_string()));
        }
        if self.cube_size <= 0.0 {
            return Err(Error::Config(format!("cube_size must be positive, got {}", self.cube_size)));
        }
        if let Bounds::Fixed { x, y } = self.bounds {
            if x <= 0.0 || y <= 0.0 {
                return Err(Error::Config(format!("fixed bounds must be positive, got ({x}, {y})")));
            }
        }
        Ok(())
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    /// Bounce half-extents for a viewport with the given aspect ratio.
    pub fn bounce_limits(&self, aspect: f32) -> BounceLimits {
        match self.bounds {
            Bounds::Fixed { x, y } => BounceLimits { x, y },
            Bounds::AspectDerived { margin } => {
                let depth = self.start_position[2].abs();
                let half_height = depth * (self.fov_y() / 2.0).tan();
                BounceLimits {
                    x: (half_height * aspect - margin).max(0.0),
                    y: (half_height - margin).max(0.0),
                }
            }
        }
    }
}
