/// Drawable models: a mesh, its uploaded buffer, textures and material
use std::path::Path;

use tracing::info;

use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::obj;
use crate::render::{uniforms, MeshHandle, Rasterizer, ShaderHandle, SharedRasterizer};
use crate::resource::Resource;
use crate::texture::TextureSet;

/// Phong reflection coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.2,
            diffuse: 0.7,
            specular: 0.5,
            shininess: 32.0,
        }
    }
}

/// A mesh uploaded to the rasterizer, with its textures and material.
///
/// The CPU-side mesh is kept for inspection; the rasterizer buffer and owned
/// textures are released when the model is dropped.
#[derive(Debug)]
pub struct Model {
    mesh: Mesh,
    buffer: Resource<MeshHandle>,
    textures: TextureSet,
    material: Material,
}

impl Model {
    pub fn from_mesh(context: &SharedRasterizer, mesh: Mesh) -> Self {
        let buffer = Resource::acquire(context, |r| r.upload_mesh(&mesh));
        Self {
            mesh,
            buffer,
            textures: TextureSet::new(),
            material: Material::default(),
        }
    }

    /// Load an OBJ file and upload it.
    pub fn load(context: &SharedRasterizer, path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let mesh = obj::load_obj(path)?;
        info!(
            path = %path.display(),
            triangles = mesh.triangle_count(),
            "model uploaded"
        );
        Ok(Self::from_mesh(context, mesh))
    }

    pub fn with_textures(mut self, textures: TextureSet) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureSet {
        &mut self.textures
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn handle(&self) -> MeshHandle {
        self.buffer.handle()
    }

    pub fn context(&self) -> &SharedRasterizer {
        self.buffer.context()
    }

    /// Upload material, bind textures and issue the draw. Matrices are the caller's.
    pub fn draw(&self, rasterizer: &mut dyn Rasterizer, shader: ShaderHandle) {
        rasterizer.set_uniform_f32(shader, uniforms::AMBIENT, self.material.ambient);
        rasterizer.set_uniform_f32(shader, uniforms::DIFFUSE, self.material.diffuse);
        rasterizer.set_uniform_f32(shader, uniforms::SPECULAR, self.material.specular);
        rasterizer.set_uniform_f32(shader, uniforms::SHININESS, self.material.shininess);

        self.textures.bind(rasterizer);
        rasterizer.draw_triangles(shader, self.buffer.handle(), self.mesh.vertex_count());
    }
}
