use nalgebra::Matrix4;

use super::{Camera, CameraBase};
use crate::error::{Error, Result};
use crate::math::{glu, Vec3};
use crate::projection::{ProjectionMode, Viewport};

pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Symmetric perspective camera
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    base: CameraBase,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Matrix4<f32>,
}

fn validate(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<()> {
    if !(fov_y > 0.0 && fov_y < std::f32::consts::PI) {
        return Err(Error::InvalidFrustum("field of view must lie in (0, pi)"));
    }
    if !(aspect.is_finite() && aspect > 0.0) {
        return Err(Error::InvalidFrustum("aspect ratio must be positive"));
    }
    if !(near > 0.0 && far > near && far.is_finite()) {
        return Err(Error::InvalidFrustum("clip planes must satisfy 0 < near < far"));
    }
    Ok(())
}

impl PerspectiveCamera {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<Self> {
        validate(fov_y, aspect, near, far)?;
        Ok(Self {
            base: CameraBase::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y),
            fov_y,
            aspect,
            near,
            far,
            projection: glu::perspective(fov_y, aspect, near, far),
        })
    }

    /// 45 degree camera sized for `viewport`, five units up the +Z axis
    pub fn for_viewport(viewport: Viewport) -> Result<Self> {
        Self::new(DEFAULT_FOV_Y, viewport.aspect(), DEFAULT_NEAR, DEFAULT_FAR)
    }

    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<()> {
        validate(fov_y, aspect, near, far)?;
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.projection = glu::perspective(fov_y, aspect, near, far);
        Ok(())
    }

    pub fn set_fov(&mut self, fov_y: f32) -> Result<()> {
        self.set_perspective(fov_y, self.aspect, self.near, self.far)
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
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
}

impl Camera for PerspectiveCamera {
    fn base(&self) -> &CameraBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CameraBase {
        &mut self.base
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    fn projection_mode(&self) -> ProjectionMode {
        ProjectionMode::Perspective
    }

    fn set_aspect(&mut self, aspect: f32) -> Result<()> {
        self.set_perspective(self.fov_y, aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = PerspectiveCamera::for_viewport(Viewport::new(800, 600)).unwrap();
        assert_eq!(camera.projection_mode(), ProjectionMode::Perspective);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.eye(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_view_matrix() {
        let camera = PerspectiveCamera::for_viewport(Viewport::new(800, 600)).unwrap();
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(PerspectiveCamera::new(0.0, 1.0, 0.1, 10.0).is_err());
        assert!(PerspectiveCamera::new(1.0, 0.0, 0.1, 10.0).is_err());
        assert!(PerspectiveCamera::new(1.0, 1.0, 0.0, 10.0).is_err());
        assert!(PerspectiveCamera::new(1.0, 1.0, 5.0, 1.0).is_err());
    }

    #[test]
    fn test_failed_update_keeps_previous_state() {
        let mut camera = PerspectiveCamera::new(1.0, 1.0, 0.1, 10.0).unwrap();
        let before = camera.projection_matrix();
        assert!(camera.set_aspect(-2.0).is_err());
        assert_eq!(camera.projection_matrix(), before);
    }

    #[test]
    fn test_projects_target_to_viewport_center() {
        let mut camera = PerspectiveCamera::new(1.0, 2.0, 0.1, 100.0).unwrap();
        camera.look_at(Vec3::new(3.0, 3.0, 3.0), Vec3::new(1.0, 0.0, 0.0));
        let p = camera
            .project(Vec3::new(1.0, 0.0, 0.0), &Matrix4::identity(), Viewport::new(200, 100))
            .unwrap();
        assert_relative_eq!(p.x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(p.y, 50.0, epsilon = 1e-3);
    }
}
