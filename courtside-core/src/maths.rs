/// Matrix builders for model, view and projection transforms
///
/// Every angle argument is in degrees. Matrices use the column-vector
/// convention, so in `a * b` the transform `b` is applied to a point first.
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

use crate::transform::EulerAngles;

/// Identity with `translation` in the last column.
#[rustfmt::skip]
pub fn translation_matrix(translation: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, translation.x,
        0.0, 1.0, 0.0, translation.y,
        0.0, 0.0, 1.0, translation.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Identity with `scale` on the diagonal.
#[rustfmt::skip]
pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new(
        scale.x, 0.0,     0.0,     0.0,
        0.0,     scale.y, 0.0,     0.0,
        0.0,     0.0,     scale.z, 0.0,
        0.0,     0.0,     0.0,     1.0,
    )
}

/// Counter-clockwise rotation about +X.
#[rustfmt::skip]
pub fn rotation_x(degrees: f32) -> Matrix4<f32> {
    let (s, c) = degrees.to_radians().sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c,   -s,  0.0,
        0.0, s,   c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Counter-clockwise rotation about +Y.
#[rustfmt::skip]
pub fn rotation_y(degrees: f32) -> Matrix4<f32> {
    let (s, c) = degrees.to_radians().sin_cos();
    Matrix4::new(
        c,   0.0, s,   0.0,
        0.0, 1.0, 0.0, 0.0,
        -s,  0.0, c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Counter-clockwise rotation about +Z.
#[rustfmt::skip]
pub fn rotation_z(degrees: f32) -> Matrix4<f32> {
    let (s, c) = degrees.to_radians().sin_cos();
    Matrix4::new(
        c,   -s,  0.0, 0.0,
        s,   c,   0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about an arbitrary axis (Rodrigues' formula).
///
/// The axis is normalized first. A zero-length axis yields the identity.
#[rustfmt::skip]
pub fn axis_angle_rotation(degrees: f32, axis: &Vector3<f32>) -> Matrix4<f32> {
    let Some(axis) = axis.try_normalize(f32::EPSILON) else {
        return Matrix4::identity();
    };
    let (s, c) = degrees.to_radians().sin_cos();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    Matrix4::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
        0.0,               0.0,               0.0,               1.0,
    )
}

/// Euler rotation composed as `Rz * Ry * Rx`, so X is applied to a point first.
pub fn euler_rotation(angles: &EulerAngles) -> Matrix4<f32> {
    rotation_z(angles.z) * rotation_y(angles.y) * rotation_x(angles.x)
}

/// Rotation matrix of a unit quaternion.
#[rustfmt::skip]
pub fn quaternion_matrix(q: &UnitQuaternion<f32>) -> Matrix4<f32> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    Matrix4::new(
        1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - w * z),       2.0 * (x * z + w * y),       0.0,
        2.0 * (x * y + w * z),       1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - w * x),       0.0,
        2.0 * (x * z - w * y),       2.0 * (y * z + w * x),       1.0 - 2.0 * (x * x + y * y), 0.0,
        0.0,                         0.0,                         0.0,                         1.0,
    )
}

/// Right-handed view matrix for an eye looking along `front`.
///
/// Rows are the camera's right, up and back axes; the last column moves the
/// world by `-eye` expressed in that basis.
#[rustfmt::skip]
pub fn look_at(eye: &Point3<f32>, front: &Vector3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let f = front.normalize();
    let s = f.cross(up).normalize();
    let u = s.cross(&f);
    let e = eye.coords;

    Matrix4::new(
        s.x,  s.y,  s.z,  -s.dot(&e),
        u.x,  u.y,  u.z,  -u.dot(&e),
        -f.x, -f.y, -f.z, f.dot(&e),
        0.0,  0.0,  0.0,  1.0,
    )
}

/// Symmetric perspective projection mapping depth to [-1, 1].
#[rustfmt::skip]
pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let tan_half_fovy = (fov_degrees.to_radians() / 2.0).tan();
    let depth = far - near;

    Matrix4::new(
        1.0 / (aspect * tan_half_fovy), 0.0,                 0.0,                    0.0,
        0.0,                            1.0 / tan_half_fovy, 0.0,                    0.0,
        0.0,                            0.0,                 -(far + near) / depth,  -(2.0 * far * near) / depth,
        0.0,                            0.0,                 -1.0,                   0.0,
    )
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Matrix4<f32> {
    projection * view * model
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    const EPS: f32 = 1e-5;

    fn assert_mat_eq(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        assert!((a - b).norm() < 1e-4, "matrices differ:\n{}\n{}", a, b);
    }

    #[test]
    fn test_zero_rotations_are_identity() {
        assert_mat_eq(&rotation_x(0.0), &Matrix4::identity());
        assert_mat_eq(&rotation_y(0.0), &Matrix4::identity());
        assert_mat_eq(&rotation_z(0.0), &Matrix4::identity());
    }

    #[test]
    fn test_rotation_inverse_pairs() {
        let mut theta = -720.0;
        while theta <= 720.0 {
            assert_mat_eq(&(rotation_x(theta) * rotation_x(-theta)), &Matrix4::identity());
            assert_mat_eq(&(rotation_y(theta) * rotation_y(-theta)), &Matrix4::identity());
            assert_mat_eq(&(rotation_z(theta) * rotation_z(-theta)), &Matrix4::identity());
            theta += 17.5;
        }
    }

    #[test]
    fn test_rotation_x_closed_form() {
        let m = rotation_x(30.0);
        let (s, c) = 30.0f32.to_radians().sin_cos();
        assert!((m[(1, 1)] - c).abs() < EPS);
        assert!((m[(1, 2)] + s).abs() < EPS);
        assert!((m[(2, 1)] - s).abs() < EPS);
        assert!((m[(2, 2)] - c).abs() < EPS);
        // +Y rotates towards +Z
        let p = m * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert!(p.z > 0.0);
    }

    #[test]
    fn test_axis_rotations_match_nalgebra() {
        for deg in [-135.0f32, -30.0, 15.0, 90.0, 200.0] {
            let rad = deg.to_radians();
            assert_mat_eq(&rotation_x(deg), &Matrix4::from_euler_angles(rad, 0.0, 0.0));
            assert_mat_eq(&rotation_y(deg), &Matrix4::from_euler_angles(0.0, rad, 0.0));
            assert_mat_eq(&rotation_z(deg), &Matrix4::from_euler_angles(0.0, 0.0, rad));
        }
    }

    #[test]
    fn test_euler_order_is_z_y_x() {
        let angles = EulerAngles::new(10.0, 20.0, 30.0);
        let expected = Matrix4::from_euler_angles(
            10.0f32.to_radians(),
            20.0f32.to_radians(),
            30.0f32.to_radians(),
        );
        assert_mat_eq(&euler_rotation(&angles), &expected);
    }

    #[test]
    fn test_axis_angle_matches_principal_axes() {
        assert_mat_eq(&axis_angle_rotation(40.0, &Vector3::x()), &rotation_x(40.0));
        assert_mat_eq(&axis_angle_rotation(40.0, &Vector3::y()), &rotation_y(40.0));
        assert_mat_eq(&axis_angle_rotation(40.0, &Vector3::z()), &rotation_z(40.0));
    }

    #[test]
    fn test_axis_angle_normalizes_axis() {
        let axis = Vector3::new(1.0, 2.0, -3.0);
        let expected = Matrix4::new_rotation(axis.normalize() * 75.0f32.to_radians());
        assert_mat_eq(&axis_angle_rotation(75.0, &(axis * 4.0)), &expected);
        assert_mat_eq(&axis_angle_rotation(75.0, &Vector3::zeros()), &Matrix4::identity());
    }

    #[test]
    fn test_quaternion_matrix_matches_nalgebra() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.2)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -0.4);
        assert_mat_eq(&quaternion_matrix(&q), &q.to_homogeneous());
    }

    #[test]
    fn test_translation_and_scale_layout() {
        let t = translation_matrix(&Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(t.column(3), Vector4::new(1.0, 2.0, 3.0, 1.0));
        let s = scale_matrix(&Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(s.diagonal(), Vector4::new(2.0, 3.0, 4.0, 1.0));
    }

    #[test]
    fn test_scale_applies_before_translation() {
        let model = translation_matrix(&Vector3::new(1.0, 0.0, 0.0))
            * rotation_z(90.0)
            * scale_matrix(&Vector3::new(2.0, 2.0, 2.0));
        let p = model * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // scaled to (2,0,0), rotated to (0,2,0), translated to (1,2,0)
        assert!((p - Vector4::new(1.0, 2.0, 0.0, 1.0)).norm() < EPS);
    }

    #[test]
    fn test_look_at_matches_nalgebra() {
        let eye = Point3::new(1.0, 2.0, 5.0);
        let front = Vector3::new(-0.2, -0.1, -1.0).normalize();
        let up = Vector3::y();
        let expected = Matrix4::look_at_rh(&eye, &(eye + front), &up);
        assert_mat_eq(&look_at(&eye, &front, &up), &expected);
    }

    #[test]
    fn test_perspective_matches_nalgebra() {
        let expected = Matrix4::new_perspective(4.0 / 3.0, 45.0f32.to_radians(), 0.1, 100.0);
        assert_mat_eq(&perspective(45.0, 4.0 / 3.0, 0.1, 100.0), &expected);
    }

    #[test]
    fn test_mvp_order() {
        let model = translation_matrix(&Vector3::new(0.0, 0.0, -2.0));
        let view = rotation_y(90.0);
        let projection = scale_matrix(&Vector3::new(2.0, 2.0, 2.0));
        assert_mat_eq(&mvp_matrix(&model, &view, &projection), &(projection * view * model));
    }
}
