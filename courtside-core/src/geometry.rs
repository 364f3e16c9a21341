/// Geometry primitives for 3D rendering
use std::f32::consts::PI;

use nalgebra::{Point3, Vector2, Vector3};

/// A 3D vertex with position, texture coordinate and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub uv: Vector2<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, uv: Vector2<f32>, normal: Vector3<f32>) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }

    /// Mean texture coordinate of the three corners
    pub fn mean_uv(&self) -> Vector2<f32> {
        (self.vertices[0].uv + self.vertices[1].uv + self.vertices[2].uv) / 3.0
    }
}

/// An unindexed triangle list stored as parallel attribute sequences.
///
/// Corner `c` of triangle `i` lives at index `3 * i + c` of every sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Point3<f32>>,
    uvs: Vec<Vector2<f32>>,
    normals: Vec<Vector3<f32>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 3),
            uvs: Vec::with_capacity(triangles * 3),
            normals: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        for vertex in triangle.vertices {
            self.positions.push(vertex.position);
            self.uvs.push(vertex.uv);
            self.normals.push(vertex.normal);
        }
    }

    /// Append every triangle of `other`, shifted by `offset`.
    pub fn append(&mut self, other: &Mesh, offset: &Vector3<f32>) {
        self.positions.extend(other.positions.iter().map(|p| p + offset));
        self.uvs.extend_from_slice(&other.uvs);
        self.normals.extend_from_slice(&other.normals);
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn uvs(&self) -> &[Vector2<f32>] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<Vertex> {
        Some(Vertex::new(
            *self.positions.get(index)?,
            *self.uvs.get(index)?,
            *self.normals.get(index)?,
        ))
    }

    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let base = index.checked_mul(3)?;
        Some(Triangle::new(
            self.vertex(base)?,
            self.vertex(base + 1)?,
            self.vertex(base + 2)?,
        ))
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).filter_map(|i| self.triangle(i))
    }

    /// Square floor in the XZ plane, facing +Y, with UVs tiled once per unit.
    pub fn floor(half_size: f32) -> Self {
        let normal = Vector3::y();
        let corner = |x: f32, z: f32| {
            Vertex::new(
                Point3::new(x, 0.0, z),
                Vector2::new(x + half_size, z + half_size),
                normal,
            )
        };
        let (a, b) = (-half_size, half_size);

        let mut mesh = Self::with_capacity(2);
        mesh.add_triangle(Triangle::new(corner(a, a), corner(a, b), corner(b, b)));
        mesh.add_triangle(Triangle::new(corner(b, b), corner(b, a), corner(a, a)));
        mesh
    }

    /// UV sphere centred on the origin.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let point = |ring: u32, segment: u32| {
            let theta = ring as f32 * PI / rings as f32;
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let normal = Vector3::new(phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            Vertex::new(
                Point3::from(normal * radius),
                Vector2::new(segment as f32 / segments as f32, ring as f32 / rings as f32),
                normal,
            )
        };

        let mut mesh = Self::with_capacity((segments * rings * 2) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let top_left = point(ring, segment);
                let bottom_left = point(ring + 1, segment);
                let top_right = point(ring, segment + 1);
                let bottom_right = point(ring + 1, segment + 1);

                mesh.add_triangle(Triangle::new(top_left, top_right, bottom_left));
                mesh.add_triangle(Triangle::new(top_right, bottom_right, bottom_left));
            }
        }
        mesh
    }

    /// Flat ring in the XZ plane, facing +Y.
    pub fn ring(radius: f32, thickness: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let inner = (radius - thickness).max(0.0);
        let normal = Vector3::y();

        let vertex = |r: f32, segment: u32| {
            let angle = segment as f32 * 2.0 * PI / segments as f32;
            Vertex::new(
                Point3::new(r * angle.cos(), 0.0, r * angle.sin()),
                Vector2::new(segment as f32 / segments as f32, r / radius),
                normal,
            )
        };

        let mut mesh = Self::with_capacity((segments * 2) as usize);
        for segment in 0..segments {
            let outer_a = vertex(radius, segment);
            let outer_b = vertex(radius, segment + 1);
            let inner_a = vertex(inner, segment);
            let inner_b = vertex(inner, segment + 1);

            mesh.add_triangle(Triangle::new(outer_a, inner_a, outer_b));
            mesh.add_triangle(Triangle::new(outer_b, inner_a, inner_b));
        }
        mesh
    }

    /// Axis-aligned box centred on the origin, one normal per face.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u axis, v axis) for each face
        let faces = [
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), -Vector3::x(), Vector3::y()),
            (Vector3::x(), -Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::x(), -Vector3::z()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
        ];
        let half = Vector3::new(hx, hy, hz);

        let mut mesh = Self::with_capacity(12);
        for (normal, u_axis, v_axis) in faces {
            let corner = |u: f32, v: f32| {
                let offset = normal + u_axis * u + v_axis * v;
                Vertex::new(
                    Point3::from(offset.component_mul(&half)),
                    Vector2::new((u + 1.0) / 2.0, (v + 1.0) / 2.0),
                    normal,
                )
            };
            mesh.add_triangle(Triangle::new(
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
            ));
            mesh.add_triangle(Triangle::new(
                corner(-1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ));
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(mesh: &Mesh) {
        assert_eq!(mesh.positions().len(), mesh.uvs().len());
        assert_eq!(mesh.positions().len(), mesh.normals().len());
        assert_eq!(mesh.positions().len(), 3 * mesh.triangle_count());
    }

    #[test]
    fn test_add_triangle_keeps_sequences_parallel() {
        let v = |x: f32| Vertex::new(Point3::new(x, 0.0, 0.0), Vector2::new(x, 1.0), Vector3::z());
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(v(0.0), v(1.0), v(2.0)));
        mesh.add_triangle(Triangle::new(v(3.0), v(4.0), v(5.0)));
        assert_consistent(&mesh);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(1).map(|t| t.vertices[2]), Some(v(5.0)));
        assert!(mesh.triangle(2).is_none());
        assert!(mesh.vertex(mesh.vertex_count()).is_none());
        assert_eq!(mesh.triangles().count(), 2);
    }

    #[test]
    fn test_face_normal() {
        let v = |x: f32, y: f32| Vertex::new(Point3::new(x, y, 0.0), Vector2::zeros(), Vector3::z());
        let triangle = Triangle::new(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0));
        assert!((triangle.calculate_normal() - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_procedural_meshes() {
        let floor = Mesh::floor(10.0);
        assert_consistent(&floor);
        assert_eq!(floor.triangle_count(), 2);
        for t in floor.triangles() {
            assert!(t.calculate_normal().dot(&Vector3::y()) > 0.99);
        }

        let sphere = Mesh::uv_sphere(0.5, 16, 16);
        assert_consistent(&sphere);
        assert_eq!(sphere.triangle_count(), 16 * 16 * 2);
        assert!(sphere.positions().iter().all(|p| (p.coords.norm() - 0.5).abs() < 1e-5));

        let ring = Mesh::ring(0.45, 0.05, 32);
        assert_consistent(&ring);
        assert_eq!(ring.triangle_count(), 64);

        let slab = Mesh::cuboid(1.8, 1.2, 0.05);
        assert_consistent(&slab);
        assert_eq!(slab.triangle_count(), 12);
        for t in slab.triangles() {
            // winding agrees with the stored face normal
            assert!(t.calculate_normal().dot(&t.vertices[0].normal) > 0.99);
        }
    }

    #[test]
    fn test_append_offsets_positions() {
        let mut mesh = Mesh::floor(1.0);
        mesh.append(&Mesh::floor(1.0), &Vector3::new(0.0, 2.0, 0.0));
        assert_consistent(&mesh);
        assert_eq!(mesh.triangle_count(), 4);
        assert!(mesh.positions()[..6].iter().all(|p| p.y == 0.0));
        assert!(mesh.positions()[6..].iter().all(|p| p.y == 2.0));
        assert_eq!(mesh.uvs()[..6], mesh.uvs()[6..]);
    }
}
