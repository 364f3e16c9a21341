/// The boundary between scene objects and the rasterizer that draws them
///
/// The rasterizer owns a single binding slot (current uniforms, bound texture
/// units, current mesh) which every draw call is free to overwrite.
use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Matrix4, Vector3};

use crate::geometry::Mesh;

/// Opaque id of an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Opaque id of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque id of a compiled, linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Texture unit sampled as the diffuse map
pub const DIFFUSE_UNIT: u32 = 0;
/// Texture unit sampled as the normal map
pub const NORMAL_UNIT: u32 = 1;

/// Uniform names shared with the shader program
pub mod uniforms {
    pub const MODEL: &str = "model";
    pub const MVP: &str = "MVP";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const LIGHT_POS: &str = "lightPos";
    pub const VIEW_POS: &str = "viewPos";
    pub const OBJECT_COLOR: &str = "objectColor";
    pub const AMBIENT: &str = "ka";
    pub const DIFFUSE: &str = "kd";
    pub const SPECULAR: &str = "ks";
    pub const SHININESS: &str = "Ns";
}

/// Channel layout of decoded texture pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::Red),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Red => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Decoded pixels ready for upload, rows bottom to top
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn solid(rgb: [u8; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            format: PixelFormat::Rgb,
            pixels: rgb.to_vec(),
        }
    }

    /// Sample with repeat wrapping and nearest filtering; returns RGB in [0, 1].
    pub fn sample(&self, u: f32, v: f32) -> Vector3<f32> {
        if self.width == 0 || self.height == 0 {
            return Vector3::repeat(1.0);
        }
        let x = ((u.rem_euclid(1.0) * self.width as f32) as u32).min(self.width - 1);
        let y = ((v.rem_euclid(1.0) * self.height as f32) as u32).min(self.height - 1);
        let channels = self.format.channels();
        let offset = (y as usize * self.width as usize + x as usize) * channels;

        let Some(texel) = self.pixels.get(offset..offset + channels) else {
            return Vector3::repeat(1.0);
        };
        let channel = |i: usize| texel[i] as f32 / 255.0;
        match self.format {
            PixelFormat::Red => Vector3::repeat(channel(0)),
            PixelFormat::Rgb | PixelFormat::Rgba => Vector3::new(channel(0), channel(1), channel(2)),
        }
    }
}

/// An immediate-mode rasterizer context.
pub trait Rasterizer {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle;
    fn release_mesh(&mut self, handle: MeshHandle);

    fn create_texture(&mut self, image: &TextureImage) -> TextureHandle;
    fn release_texture(&mut self, handle: TextureHandle);

    fn set_uniform_mat4(&mut self, shader: ShaderHandle, name: &str, value: &Matrix4<f32>);
    fn set_uniform_vec3(&mut self, shader: ShaderHandle, name: &str, value: &Vector3<f32>);
    fn set_uniform_f32(&mut self, shader: ShaderHandle, name: &str, value: f32);

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Draw `vertex_count` vertices of `mesh` as a triangle list.
    fn draw_triangles(&mut self, shader: ShaderHandle, mesh: MeshHandle, vertex_count: usize);
}

/// The rasterizer context shared by every resource and scene object on the
/// frame thread.
pub type SharedRasterizer = Rc<RefCell<dyn Rasterizer>>;

pub fn share<R: Rasterizer + 'static>(rasterizer: R) -> (Rc<RefCell<R>>, SharedRasterizer) {
    let concrete = Rc::new(RefCell::new(rasterizer));
    let shared: SharedRasterizer = concrete.clone();
    (concrete, shared)
}
