//! Look-at cameras with perspective and orthographic projections.
//!
//! Every camera owns a [`CameraBase`] holding the eye, target and up vector
//! together with the cached view matrix and the camera's orthonormal basis.
//! The cache is rebuilt eagerly by each setter, so reading matrices never
//! mutates the camera.

mod orbit;
mod ortho;
mod perspective;

pub use orbit::Orbit;
pub use ortho::{Frustum, OrthoCamera};
pub use perspective::PerspectiveCamera;

use nalgebra::Matrix4;

use crate::error::Result;
use crate::math::{glu, Vec3};
use crate::projection::{self, ProjectionMode, ScreenPoint, Viewport};

/// Position, orientation and cached view state shared by all cameras
#[derive(Debug, Clone)]
pub struct CameraBase {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    view: Matrix4<f32>,
    right_axis: Vec3,
    up_axis: Vec3,
    forward_axis: Vec3,
}

impl CameraBase {
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let mut base = Self {
            eye,
            target,
            up,
            view: Matrix4::identity(),
            right_axis: Vec3::X,
            up_axis: Vec3::Y,
            forward_axis: -Vec3::Z,
        };
        base.refresh();
        base
    }

    fn refresh(&mut self) {
        self.view = glu::look_at(self.eye, self.target, self.up);
        // rows of the rotation part are the camera axes in world space
        let view = self.view;
        let row = |i: usize| Vec3::new(view[(i, 0)], view[(i, 1)], view[(i, 2)]);
        self.right_axis = row(0);
        self.up_axis = row(1);
        self.forward_axis = -row(2);
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    /// Camera-space +X in world coordinates
    pub fn right_axis(&self) -> Vec3 {
        self.right_axis
    }

    /// Camera-space +Y in world coordinates (orthogonalized `up`)
    pub fn up_axis(&self) -> Vec3 {
        self.up_axis
    }

    /// Line of sight in world coordinates
    pub fn forward_axis(&self) -> Vec3 {
        self.forward_axis
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        self.eye = eye;
        self.refresh();
        log::trace!("camera eye set to {}", eye);
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.refresh();
        log::trace!("camera target set to {}", target);
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.refresh();
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.eye = eye;
        self.target = target;
        self.refresh();
    }
}

/// Common camera interface; implementors only supply the projection
pub trait Camera {
    fn base(&self) -> &CameraBase;

    fn base_mut(&mut self) -> &mut CameraBase;

    fn projection_matrix(&self) -> Matrix4<f32>;

    fn projection_mode(&self) -> ProjectionMode;

    /// Adapt the projection to a new surface aspect ratio
    fn set_aspect(&mut self, aspect: f32) -> Result<()>;

    /// Apply an orbit zoom factor. Only cameras whose image size does not
    /// depend on the eye distance need to react.
    fn set_zoom(&mut self, _zoom: f32) -> Result<()> {
        Ok(())
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        *self.base().view()
    }

    fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    fn eye(&self) -> Vec3 {
        self.base().eye()
    }

    fn target(&self) -> Vec3 {
        self.base().target()
    }

    fn set_eye(&mut self, eye: Vec3) {
        self.base_mut().set_eye(eye);
    }

    fn set_target(&mut self, target: Vec3) {
        self.base_mut().set_target(target);
    }

    fn set_up(&mut self, up: Vec3) {
        self.base_mut().set_up(up);
    }

    fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.base_mut().look_at(eye, target);
    }

    /// Project a model-space point to the surface
    fn project(&self, point: Vec3, model: &Matrix4<f32>, viewport: Viewport) -> Option<ScreenPoint> {
        let mvp = self.view_projection_matrix() * model;
        projection::project_point(&mvp, point, viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basis_is_orthonormal() {
        let base = CameraBase::new(Vec3::new(2.0, 3.0, 4.0), Vec3::ZERO, Vec3::Y);
        let (r, u, f) = (base.right_axis(), base.up_axis(), base.forward_axis());
        assert_relative_eq!(r.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(u.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(f.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(r.dot(u), 0.0, epsilon = 1e-5);
        assert_relative_eq!(r.dot(f), 0.0, epsilon = 1e-5);
        assert_relative_eq!(r.cross(u), -f, epsilon = 1e-5);
    }

    #[test]
    fn test_forward_points_at_target() {
        let base = CameraBase::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_relative_eq!(base.forward_axis(), -Vec3::Z, epsilon = 1e-6);
        assert_relative_eq!(base.right_axis(), Vec3::X, epsilon = 1e-6);
    }

    #[test]
    fn test_setters_refresh_view() {
        let mut base = CameraBase::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let before = *base.view();
        base.set_eye(Vec3::new(5.0, 0.0, 0.0));
        assert_ne!(before, *base.view());
        assert_relative_eq!(base.forward_axis(), -Vec3::X, epsilon = 1e-6);
    }
}
