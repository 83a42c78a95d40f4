/// Model transforms, rotation state and an immediate-mode matrix stack
use nalgebra::{Matrix4, Unit, Vector3};

use crate::error::{Error, Result};
use crate::math::Vec3;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation matrix applying X, then Y, then Z
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));
        rz * ry * rx
    }

    pub fn translation_matrix(offset: Vec3) -> Matrix4<f32> {
        let offset: Vector3<f32> = offset.into();
        Matrix4::new_translation(&offset)
    }

    pub fn scale_matrix(scale: Vec3) -> Matrix4<f32> {
        let scale: Vector3<f32> = scale.into();
        Matrix4::new_nonuniform_scaling(&scale)
    }

    /// Rotation of `angle` radians about `axis`. A zero axis yields the identity.
    pub fn axis_angle_matrix(angle: f32, axis: Vec3) -> Matrix4<f32> {
        if axis.is_zero() {
            return Matrix4::identity();
        }
        let axis: Vector3<f32> = axis.into();
        Matrix4::from_axis_angle(&Unit::new_normalize(axis), angle)
    }

    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

/// Model matrix stack in the style of fixed-function `glPushMatrix`.
///
/// Every operation post-multiplies the top of the stack, so the last
/// transform issued is the first one applied to vertices.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Matrix4<f32>,
    saved: Vec<Matrix4<f32>>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            current: Matrix4::identity(),
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &Matrix4<f32> {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn load_identity(&mut self) {
        self.current = Matrix4::identity();
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    pub fn pop(&mut self) -> Result<()> {
        self.current = self.saved.pop().ok_or(Error::StackUnderflow)?;
        Ok(())
    }

    pub fn mult(&mut self, m: &Matrix4<f32>) {
        self.current *= m;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.mult(&Transform::translation_matrix(offset));
    }

    pub fn scale(&mut self, scale: Vec3) {
        self.mult(&Transform::scale_matrix(scale));
    }

    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.mult(&Transform::axis_angle_matrix(angle, axis));
    }

    /// Run `f` between a push and its matching pop
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.depth();
        self.push();
        let out = f(self);
        self.saved.truncate(depth + 1);
        if let Some(m) = self.saved.pop() {
            self.current = m;
        }
        out
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}
