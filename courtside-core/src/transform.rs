/// Object transforms: position, orientation and scale
use nalgebra::{Matrix4, Unit, UnitQuaternion, Vector3};

use crate::maths;

/// Rotation about the three principal axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerAngles {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

/// How an object's rotation is stored.
///
/// Euler angles suit props that are placed or steered about one axis; the
/// quaternion form is for continuous spin, where it is composed incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    Euler(EulerAngles),
    Quaternion(UnitQuaternion<f32>),
}

impl Orientation {
    pub fn identity_quaternion() -> Self {
        Self::Quaternion(UnitQuaternion::identity())
    }

    /// Same rotation as `Rz * Ry * Rx`, in quaternion form.
    pub fn to_quaternion(&self) -> Self {
        match self {
            Self::Euler(angles) => Self::Quaternion(UnitQuaternion::from_euler_angles(
                angles.x.to_radians(),
                angles.y.to_radians(),
                angles.z.to_radians(),
            )),
            Self::Quaternion(q) => Self::Quaternion(*q),
        }
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        match self {
            Self::Euler(angles) => maths::euler_rotation(angles),
            Self::Quaternion(q) => maths::quaternion_matrix(q),
        }
    }

    /// Pre-multiply a quaternion orientation by a rotation of `degrees` about `axis`.
    ///
    /// The result is renormalized. Euler orientations are rotated about the
    /// principal axis only when `axis` is one; any other axis is ignored for
    /// them, as the two representations are not interchangeable.
    pub fn spin(&mut self, axis: &Unit<Vector3<f32>>, degrees: f32) {
        match self {
            Self::Quaternion(q) => {
                let delta = UnitQuaternion::from_axis_angle(axis, degrees.to_radians());
                *q = delta * *q;
                q.renormalize();
            }
            Self::Euler(angles) => {
                let axis = axis.into_inner();
                if axis == Vector3::x() {
                    angles.rotate(degrees, 0.0, 0.0);
                } else if axis == Vector3::y() {
                    angles.rotate(0.0, degrees, 0.0);
                } else if axis == Vector3::z() {
                    angles.rotate(0.0, 0.0, degrees);
                }
            }
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Euler(EulerAngles::zero())
    }
}

/// Position, orientation and scale of a single scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub orientation: Orientation,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new(position: Vector3<f32>, orientation: Orientation, scale: Vector3<f32>) -> Self {
        Self {
            position,
            orientation,
            scale,
        }
    }

    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::repeat(scale);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// `T * R * S`: a point is scaled, then rotated, then translated.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        maths::translation_matrix(&self.position)
            * self.orientation.rotation_matrix()
            * maths::scale_matrix(&self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: Orientation::default(),
            scale: Vector3::repeat(1.0),
        }
    }
}
