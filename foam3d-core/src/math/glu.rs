//! Closed-form view and projection matrices in the OpenGL convention.
//!
//! All builders return column-major `nalgebra::Matrix4<f32>` values that map
//! into the `[-1, 1]` clip cube, with the camera looking down its local -Z.
//! Argument validation is the caller's job; the camera types in
//! [`crate::camera`] check their inputs before reaching these functions.

use nalgebra::Matrix4;

use super::Vec3;

/// World-to-eye matrix for a camera at `eye` looking at `target`.
///
/// Coincident `eye` and `target` yield the identity. An `up` vector parallel
/// to the line of sight is replaced with an arbitrary perpendicular axis.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Matrix4<f32> {
    let forward = target - eye;
    if forward.is_zero() {
        return Matrix4::identity();
    }
    let f = forward.normalized();

    let mut s = f.cross(up);
    if s.is_zero() {
        s = f.cross(f.any_orthogonal());
    }
    let s = s.normalized();
    let u = s.cross(f);

    #[rustfmt::skip]
    let m = Matrix4::new(
         s.x,  s.y,  s.z, -s.dot(eye),
         u.x,  u.y,  u.z, -u.dot(eye),
        -f.x, -f.y, -f.z,  f.dot(eye),
         0.0,  0.0,  0.0,  1.0,
    );
    m
}

pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    let rl = right - left;
    let tb = top - bottom;
    let fn_ = far - near;

    #[rustfmt::skip]
    let m = Matrix4::new(
        2.0 / rl, 0.0,      0.0,       -(right + left) / rl,
        0.0,      2.0 / tb, 0.0,       -(top + bottom) / tb,
        0.0,      0.0,      -2.0 / fn_, -(far + near) / fn_,
        0.0,      0.0,      0.0,        1.0,
    );
    m
}

pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4<f32> {
    let rl = right - left;
    let tb = top - bottom;
    let fn_ = far - near;

    #[rustfmt::skip]
    let m = Matrix4::new(
        2.0 * near / rl, 0.0,             (right + left) / rl,  0.0,
        0.0,             2.0 * near / tb, (top + bottom) / tb,  0.0,
        0.0,             0.0,             -(far + near) / fn_, -2.0 * far * near / fn_,
        0.0,             0.0,             -1.0,                 0.0,
    );
    m
}

/// Symmetric perspective frustum; `fov_y` is the full vertical angle in radians
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let top = near * (fov_y * 0.5).tan();
    let right = top * aspect;
    frustum(-right, right, -top, top, near, far)
}

/// Column-major float layout expected by `uniformMatrix4fv`
pub fn to_gl_array(m: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}
