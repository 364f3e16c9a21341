/// Scene configuration
///
/// Every field is optional in the TOML file; anything left out falls back to
/// the demo court layout. Per-prop fields are resolved against that prop's own
/// defaults, so `[court] model = "court.obj"` keeps the court's scale.
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::Camera;
use crate::error::ConfigError;
use crate::props::BounceAnimation;
use crate::transform::EulerAngles;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub light_position: [f32; 3],
    pub court: PropConfig,
    pub rim: PropConfig,
    pub ball: PropConfig,
    pub bounce: BounceConfig,
    pub player: PropConfig,
    /// Add the keyboard-steered player to the scene
    pub spawn_player: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            light_position: [2.0, 5.0, 5.0],
            court: PropConfig::default(),
            rim: PropConfig::default(),
            ball: PropConfig::default(),
            bounce: BounceConfig::default(),
            player: PropConfig::default(),
            spawn_player: true,
        }
    }
}

impl SceneConfig {
    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn light(&self) -> Vector3<f32> {
        Vector3::from(self.light_position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees; -90 looks down -Z
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            position: [0.0, 1.0, 5.0],
            yaw: camera.yaw(),
            pitch: camera.pitch(),
            fov: camera.fov(),
            aspect: camera.aspect(),
            near: camera.near(),
            far: camera.far(),
            speed: camera.speed,
            sensitivity: camera.sensitivity,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Camera {
        let mut camera = Camera::new(Point3::from(self.position), self.yaw, self.pitch)
            .with_projection(self.fov, self.aspect, self.near, self.far);
        camera.speed = self.speed;
        camera.sensitivity = self.sensitivity;
        camera
    }
}

/// Overrides for one prop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    /// OBJ file; a built-in shape is used when absent
    pub model: Option<PathBuf>,
    pub diffuse: Option<PathBuf>,
    pub normal: Option<PathBuf>,
    pub position: Option<[f32; 3]>,
    /// Euler angles in degrees
    pub rotation: Option<[f32; 3]>,
    pub scale: Option<f32>,
    /// `objectColor`, each channel in [0, 1]
    pub color: Option<[f32; 3]>,
    /// Colour of the 1x1 texture used when `diffuse` is missing or unreadable
    pub placeholder: Option<[u8; 3]>,
}

impl PropConfig {
    pub fn placement(&self, defaults: Placement) -> Placement {
        Placement {
            position: self.position.map(Vector3::from).unwrap_or(defaults.position),
            rotation: self
                .rotation
                .map(|[x, y, z]| EulerAngles::new(x, y, z))
                .unwrap_or(defaults.rotation),
            scale: self.scale.unwrap_or(defaults.scale),
            color: self.color.map(Vector3::from).unwrap_or(defaults.color),
            placeholder: self.placeholder.unwrap_or(defaults.placeholder),
        }
    }
}

/// A prop's placement and look with every field filled in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub rotation: EulerAngles,
    pub scale: f32,
    pub color: Vector3<f32>,
    pub placeholder: [u8; 3],
}

impl Placement {
    pub fn court() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: EulerAngles::zero(),
            scale: 0.2,
            color: Vector3::repeat(0.5),
            placeholder: [200, 160, 100],
        }
    }

    pub fn rim() -> Self {
        Self {
            position: Vector3::new(0.0, 3.0, -5.0),
            rotation: EulerAngles::zero(),
            scale: 1.0,
            color: Vector3::repeat(0.2),
            placeholder: [255, 255, 255],
        }
    }

    pub fn ball() -> Self {
        Self {
            position: Vector3::new(0.0, 2.5, 0.0),
            rotation: EulerAngles::zero(),
            scale: 5.0,
            color: Vector3::new(1.0, 0.5, 0.0),
            placeholder: [255, 0, 0],
        }
    }

    pub fn player() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: EulerAngles::zero(),
            scale: 1.0,
            color: Vector3::new(0.2, 0.4, 0.9),
            placeholder: [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceConfig {
    pub amplitude: f32,
    pub period: f32,
    pub spin_axis: [f32; 3],
    /// Degrees per second
    pub spin_rate: f32,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            period: 2.0,
            spin_axis: [0.0, 1.0, 0.0],
            spin_rate: 90.0,
        }
    }
}

impl BounceConfig {
    /// A zero spin axis falls back to +Y.
    pub fn animation(&self) -> BounceAnimation {
        let defaults = BounceAnimation::default();
        BounceAnimation {
            amplitude: self.amplitude,
            period: self.period,
            spin_axis: nalgebra::Unit::try_new(Vector3::from(self.spin_axis), 1e-6)
                .unwrap_or(defaults.spin_axis),
            spin_rate: self.spin_rate,
        }
    }
}
