/// Courtside Core Library - scene objects, transforms and mesh loading
///
/// This library holds everything that does not depend on a particular
/// rasterizer: OBJ parsing, transformation matrices, the camera, textures,
/// scene objects and the per-frame scene. Front-ends implement
/// [`render::Rasterizer`] to draw it.

pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod maths;
pub mod model;
pub mod obj;
pub mod props;
pub mod render;
pub mod resource;
pub mod scene;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, CameraMovement};
pub use config::SceneConfig;
pub use error::{ConfigError, LoadError, ResourceError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use model::{Material, Model};
pub use props::{
    AnimatedProp, BounceAnimation, PlayerInput, PlayerProp, Prop, SceneObject, StaticProp,
};
pub use render::{Rasterizer, ShaderHandle, SharedRasterizer};
pub use scene::Scene;
pub use transform::{EulerAngles, Orientation, Transform};
