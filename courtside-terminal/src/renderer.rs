/// ASCII rasterizer for terminal rendering
use std::collections::HashMap;
use std::io::Write;

use courtside_core::geometry::Triangle;
use courtside_core::render::{
    uniforms, MeshHandle, Rasterizer, ShaderHandle, TextureHandle, TextureImage, DIFFUSE_UNIT,
};
use courtside_core::{Material, Mesh};
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use tracing::trace;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Clip-space w below which a vertex counts as behind the eye
const MIN_W: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Uniform {
    Mat4(Matrix4<f32>),
    Vec3(Vector3<f32>),
    Float(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const BLANK: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// A projected vertex: cell coordinates plus NDC depth
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
}

/// Immediate-mode rasterizer that draws into a grid of coloured characters.
///
/// It keeps a single binding slot: the last uniforms set and textures bound
/// apply to every following draw until they are overwritten.
pub struct AsciiRasterizer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,

    next_id: u32,
    meshes: HashMap<MeshHandle, Mesh>,
    textures: HashMap<TextureHandle, TextureImage>,
    uniforms: HashMap<String, Uniform>,
    units: HashMap<u32, TextureHandle>,
}

impl AsciiRasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; size],
            next_id: 0,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            uniforms: HashMap::new(),
            units: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; width * height];
        self.cells = vec![BLANK; width * height];
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// Character at a cell, for inspection.
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        self.cell(x, y).map(|cell| cell.character)
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        self.cell(x, y).map(|cell| cell.color)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn mat4(&self, name: &str) -> Matrix4<f32> {
        match self.uniforms.get(name) {
            Some(Uniform::Mat4(m)) => *m,
            _ => Matrix4::identity(),
        }
    }

    fn vec3(&self, name: &str) -> Option<Vector3<f32>> {
        match self.uniforms.get(name) {
            Some(Uniform::Vec3(v)) => Some(*v),
            _ => None,
        }
    }

    fn float(&self, name: &str, default: f32) -> f32 {
        match self.uniforms.get(name) {
            Some(Uniform::Float(f)) => *f,
            _ => default,
        }
    }

    fn project(&self, mvp: &Matrix4<f32>, position: &Point3<f32>) -> Option<ScreenVertex> {
        let clip = mvp * Vector4::new(position.x, position.y, position.z, 1.0);
        if clip.w < MIN_W {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc.y) * 0.5 * self.height as f32,
            depth: ndc.z,
        })
    }

    fn shade_triangle(&mut self, triangle: &Triangle, pass: &DrawPass) {
        let mut screen = [ScreenVertex {
            x: 0.0,
            y: 0.0,
            depth: 0.0,
        }; 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            match self.project(&pass.mvp, &vertex.position) {
                Some(projected) => *slot = projected,
                None => return, // behind the eye
            }
        }

        // Lambert shading in world space
        let world: Vec<Point3<f32>> = triangle
            .vertices
            .iter()
            .map(|v| pass.model.transform_point(&v.position))
            .collect();
        let Some(normal) = (world[1] - world[0]).cross(&(world[2] - world[0])).try_normalize(1e-12)
        else {
            return; // degenerate
        };
        let centroid = Point3::from((world[0].coords + world[1].coords + world[2].coords) / 3.0);
        let diffuse = match pass.light {
            Some(light) => (light - centroid.coords)
                .try_normalize(1e-12)
                .map_or(0.0, |dir| normal.dot(&dir).max(0.0)),
            None => normal.z.max(0.0),
        };
        let brightness = (pass.material.ambient + pass.material.diffuse * diffuse).clamp(0.0, 1.0);

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        let uv = triangle.mean_uv();
        let albedo = pass
            .texture
            .map_or(Vector3::repeat(1.0), |image| image.sample(uv.x, uv.y));
        let rgb = albedo.component_mul(&pass.color) * brightness.max(0.35);
        let color = Color::Rgb {
            r: to_channel(rgb.x),
            g: to_channel(rgb.y),
            b: to_channel(rgb.z),
        };

        self.rasterize_triangle(&screen, Cell { character, color });
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenVertex; 3], cell: Cell) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                if !(-1.0..=1.0).contains(&depth) {
                    continue; // outside the near/far planes
                }

                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Write the frame to a terminal.
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                if cell.character != ' ' && current != Some(cell.color) {
                    writer.queue(SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Uniforms resolved once per draw call
struct DrawPass<'a> {
    model: Matrix4<f32>,
    mvp: Matrix4<f32>,
    light: Option<Vector3<f32>>,
    color: Vector3<f32>,
    material: Material,
    texture: Option<&'a TextureImage>,
}

impl Rasterizer for AsciiRasterizer {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        let handle = MeshHandle(self.next_id());
        self.meshes.insert(handle, mesh.clone());
        handle
    }

    fn release_mesh(&mut self, handle: MeshHandle) {
        self.meshes.remove(&handle);
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureHandle {
        let handle = TextureHandle(self.next_id());
        self.textures.insert(handle, image.clone());
        handle
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle);
        self.units.retain(|_, bound| *bound != handle);
    }

    fn set_uniform_mat4(&mut self, _shader: ShaderHandle, name: &str, value: &Matrix4<f32>) {
        self.uniforms.insert(name.to_string(), Uniform::Mat4(*value));
    }

    fn set_uniform_vec3(&mut self, _shader: ShaderHandle, name: &str, value: &Vector3<f32>) {
        self.uniforms.insert(name.to_string(), Uniform::Vec3(*value));
    }

    fn set_uniform_f32(&mut self, _shader: ShaderHandle, name: &str, value: f32) {
        self.uniforms.insert(name.to_string(), Uniform::Float(value));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.units.insert(unit, texture);
    }

    fn draw_triangles(&mut self, _shader: ShaderHandle, mesh: MeshHandle, vertex_count: usize) {
        // Mesh and texture are taken out for the duration of the draw so the
        // buffers can be borrowed mutably.
        let Some(source) = self.meshes.remove(&mesh) else {
            trace!(?mesh, "draw of unknown mesh ignored");
            return;
        };

        let diffuse = self.units.get(&DIFFUSE_UNIT).copied();
        let texture = diffuse.and_then(|handle| self.textures.remove(&handle));

        let defaults = Material::default();
        let pass = DrawPass {
            model: self.mat4(uniforms::MODEL),
            mvp: self.mat4(uniforms::MVP),
            light: self.vec3(uniforms::LIGHT_POS),
            color: self.vec3(uniforms::OBJECT_COLOR).unwrap_or(Vector3::repeat(1.0)),
            material: Material {
                ambient: self.float(uniforms::AMBIENT, defaults.ambient),
                diffuse: self.float(uniforms::DIFFUSE, defaults.diffuse),
                specular: self.float(uniforms::SPECULAR, defaults.specular),
                shininess: self.float(uniforms::SHININESS, defaults.shininess),
            },
            texture: texture.as_ref(),
        };

        let triangles = (vertex_count / 3).min(source.triangle_count());
        for triangle in source.triangles().take(triangles) {
            self.shade_triangle(&triangle, &pass);
        }

        self.meshes.insert(mesh, source);
        if let (Some(handle), Some(image)) = (diffuse, texture) {
            self.textures.insert(handle, image);
        }
    }
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::geometry::Vertex;
    use courtside_core::maths;
    use nalgebra::Vector2;

    const SHADER: ShaderHandle = ShaderHandle(1);

    /// One triangle facing +Z covering most of NDC space at depth `z`.
    fn facing_triangle(z: f32) -> Mesh {
        let v = |x: f32, y: f32| Vertex::new(Point3::new(x, y, z), Vector2::new(0.5, 0.5), Vector3::z());
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(v(-1.0, -1.0), v(1.0, -1.0), v(0.0, 1.0)));
        mesh
    }

    fn draw_with_texture(rasterizer: &mut AsciiRasterizer, mesh: &Mesh, rgb: [u8; 3]) {
        let handle = rasterizer.upload_mesh(mesh);
        let texture = rasterizer.create_texture(&TextureImage::solid(rgb));
        rasterizer.bind_texture(DIFFUSE_UNIT, texture);
        rasterizer.draw_triangles(SHADER, handle, mesh.vertex_count());
    }

    #[test]
    fn test_barycentric() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!((w0 - 0.5).abs() < 1e-6);
        assert!((w1 - 0.25).abs() < 1e-6);
        assert!((w2 - 0.25).abs() < 1e-6);

        // degenerate
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_draw_covers_centre_not_corner() {
        let mut rasterizer = AsciiRasterizer::new(40, 20);
        rasterizer.set_uniform_vec3(SHADER, uniforms::LIGHT_POS, &Vector3::new(0.0, 0.0, 5.0));
        draw_with_texture(&mut rasterizer, &facing_triangle(0.0), [255, 255, 255]);

        // ka + kd at normal incidence
        assert_eq!(rasterizer.char_at(20, 10), Some('%'));
        assert_eq!(rasterizer.char_at(0, 0), Some(' '));
        assert_eq!(rasterizer.color_at(0, 0), Some(Color::Reset));
    }

    #[test]
    fn test_cells_outside_grid_are_none() {
        let rasterizer = AsciiRasterizer::new(4, 3);
        assert_eq!(rasterizer.char_at(3, 2), Some(' '));
        // would wrap onto the next row without the column check
        assert_eq!(rasterizer.char_at(4, 0), None);
        assert_eq!(rasterizer.color_at(4, 0), None);
        assert_eq!(rasterizer.char_at(0, 3), None);
    }

    #[test]
    fn test_color_is_texture_times_object_color() {
        let mut rasterizer = AsciiRasterizer::new(40, 20);
        rasterizer.set_uniform_vec3(SHADER, uniforms::LIGHT_POS, &Vector3::new(0.0, 0.0, 5.0));
        rasterizer.set_uniform_f32(SHADER, uniforms::AMBIENT, 1.0);
        rasterizer.set_uniform_f32(SHADER, uniforms::DIFFUSE, 0.7);
        rasterizer.set_uniform_vec3(SHADER, uniforms::OBJECT_COLOR, &Vector3::new(1.0, 0.5, 0.0));
        draw_with_texture(&mut rasterizer, &facing_triangle(0.0), [255, 255, 255]);

        assert_eq!(rasterizer.char_at(20, 10), Some('@'));
        assert_eq!(
            rasterizer.color_at(20, 10),
            Some(Color::Rgb { r: 255, g: 128, b: 0 })
        );
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let blue = Some(Color::Rgb { r: 0, g: 0, b: 255 });
        for far_first in [true, false] {
            let mut rasterizer = AsciiRasterizer::new(40, 20);
            rasterizer.set_uniform_f32(SHADER, uniforms::AMBIENT, 1.0);
            let far = (facing_triangle(0.5), [255, 0, 0]);
            let near = (facing_triangle(-0.5), [0, 0, 255]);
            let order = if far_first { [far, near] } else { [near, far] };
            for (mesh, rgb) in &order {
                draw_with_texture(&mut rasterizer, mesh, *rgb);
            }
            assert_eq!(rasterizer.color_at(20, 10), blue);
        }
    }

    #[test]
    fn test_triangle_behind_eye_is_skipped() {
        let mut rasterizer = AsciiRasterizer::new(40, 20);
        let projection = maths::perspective(45.0, 2.0, 0.1, 100.0);
        rasterizer.set_uniform_mat4(SHADER, uniforms::MVP, &projection);
        draw_with_texture(&mut rasterizer, &facing_triangle(5.0), [255, 255, 255]);

        assert!(rasterizer.cells.iter().all(|cell| *cell == BLANK));
    }

    #[test]
    fn test_release_and_clear() {
        let mut rasterizer = AsciiRasterizer::new(10, 5);
        let mesh = rasterizer.upload_mesh(&Mesh::floor(1.0));
        let texture = rasterizer.create_texture(&TextureImage::solid([1, 2, 3]));
        rasterizer.bind_texture(DIFFUSE_UNIT, texture);
        assert_eq!((rasterizer.mesh_count(), rasterizer.texture_count()), (1, 1));

        rasterizer.release_mesh(mesh);
        rasterizer.release_texture(texture);
        assert_eq!((rasterizer.mesh_count(), rasterizer.texture_count()), (0, 0));
        assert!(rasterizer.units.is_empty());

        // drawing a released mesh is a no-op
        rasterizer.draw_triangles(SHADER, mesh, 6);
        rasterizer.clear();
        assert!(rasterizer.depth_buffer.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_present_writes_every_row() {
        let mut rasterizer = AsciiRasterizer::new(4, 3);
        rasterizer.resize(5, 2);
        let mut out = Vec::new();
        rasterizer.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 1);
        assert_eq!(text.matches(' ').count(), 10);
    }
}
