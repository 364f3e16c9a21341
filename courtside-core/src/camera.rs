/// First-person camera driven by yaw and pitch
use nalgebra::{Matrix4, Point3, Vector3};

use crate::maths;

pub const PITCH_LIMIT: f32 = 89.0;

/// Directions the camera can be moved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Euler-angle camera.
///
/// `front`, `right` and `up` are derived from yaw and pitch and rebuilt every
/// time either changes, so they always form an orthonormal basis. The
/// projection parameters are fixed once the camera is built.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,

    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            world_up: Vector3::y(),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            front: -Vector3::z(),
            right: Vector3::x(),
            up: Vector3::y(),
            fov: 45.0,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
            speed: 2.5,
            sensitivity: 0.1,
        };
        camera.update_vectors();
        camera
    }

    pub fn with_projection(mut self, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        self.fov = fov;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self
    }

    /// A new camera at the same pose with a different aspect ratio.
    pub fn resized(&self, aspect: f32) -> Self {
        Self {
            aspect,
            ..self.clone()
        }
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Apply a mouse offset in screen units.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        maths::look_at(&self.position, &self.front, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        maths::perspective(self.fov, self.aspect, self.near, self.far)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 3.0), -90.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_orthonormal(camera: &Camera) {
        let (f, r, u) = (camera.front(), camera.right(), camera.up());
        for v in [f, r, u] {
            assert!((v.norm() - 1.0).abs() < EPSILON, "not unit: {v:?}");
        }
        assert!(f.dot(&r).abs() < EPSILON);
        assert!(f.dot(&u).abs() < EPSILON);
        assert!(r.dot(&u).abs() < EPSILON);
        // right-handed
        assert!((r.cross(&u) - (-f)).norm() < 1e-4);
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = Camera::default();
        assert!((camera.front() - (-Vector3::z())).norm() < EPSILON);
        assert!((camera.right() - Vector3::x()).norm() < EPSILON);
        assert!((camera.up() - Vector3::y()).norm() < EPSILON);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut camera = Camera::default();
        let offsets = [
            (10.0, 5.0),
            (-300.0, 120.0),
            (2000.0, 4000.0),
            (-17.5, -9000.0),
            (0.3, 0.1),
        ];
        for (dx, dy) in offsets {
            camera.process_mouse_movement(dx, dy, true);
            assert_orthonormal(&camera);
            assert!(camera.pitch().abs() <= PITCH_LIMIT);
        }
    }

    #[test]
    fn test_pitch_clamps_at_limit() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        assert_orthonormal(&camera);

        camera.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_unconstrained_pitch_is_not_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 500.0, false);
        assert!((camera.pitch() - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_initial_pitch_is_clamped() {
        let camera = Camera::new(Point3::origin(), 0.0, 120.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_keyboard_moves_along_basis() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert!((camera.position - Point3::new(0.0, 0.0, 0.5)).norm() < EPSILON);

        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert!((camera.position - Point3::new(5.0, 0.0, 0.5)).norm() < EPSILON);

        camera.process_keyboard(CameraMovement::Backward, 1.0);
        camera.process_keyboard(CameraMovement::Left, 2.0);
        assert!((camera.position - Point3::new(0.0, 0.0, 3.0)).norm() < EPSILON);
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let camera = Camera::new(Point3::new(0.0, 1.0, 5.0), -90.0, 0.0);
        let eye = camera.view_matrix().transform_point(&camera.position);
        assert!(eye.coords.norm() < EPSILON);

        let ahead = camera.position + camera.front() * 2.0;
        let ahead = camera.view_matrix().transform_point(&ahead);
        assert!((ahead - Point3::new(0.0, 0.0, -2.0)).norm() < EPSILON);
    }

    #[test]
    fn test_resized_keeps_pose_and_lens() {
        let mut camera = Camera::new(Point3::new(1.0, 2.0, 3.0), -60.0, 20.0)
            .with_projection(60.0, 4.0 / 3.0, 0.5, 50.0);
        camera.process_mouse_movement(40.0, -30.0, true);

        let wide = camera.resized(2.0);
        assert_eq!(wide.aspect(), 2.0);
        assert_eq!(camera.aspect(), 4.0 / 3.0);
        assert_eq!(wide.position, camera.position);
        assert_eq!((wide.yaw(), wide.pitch()), (camera.yaw(), camera.pitch()));
        assert_eq!((wide.fov(), wide.near(), wide.far()), (60.0, 0.5, 50.0));
        assert_eq!(wide.view_matrix(), camera.view_matrix());
        assert_eq!(
            wide.projection_matrix(),
            maths::perspective(60.0, 2.0, 0.5, 50.0)
        );
        assert_orthonormal(&wide);
    }
}
