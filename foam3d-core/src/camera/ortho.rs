use nalgebra::Matrix4;

use super::{Camera, CameraBase};
use crate::error::{Error, Result};
use crate::math::{glu, Vec3};
use crate::projection::ProjectionMode;

pub const DEFAULT_NEAR: f32 = -10.0;
pub const DEFAULT_FAR: f32 = 10.0;

/// Axis-aligned view volume bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    fn validate(&self) -> Result<()> {
        let values = [self.left, self.right, self.bottom, self.top, self.near, self.far];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidFrustum("bounds must be finite"));
        }
        if self.left == self.right {
            return Err(Error::InvalidFrustum("left and right coincide"));
        }
        if self.bottom == self.top {
            return Err(Error::InvalidFrustum("bottom and top coincide"));
        }
        if self.near == self.far {
            return Err(Error::InvalidFrustum("near and far coincide"));
        }
        Ok(())
    }

    /// Side planes scaled by `zoom`. Depth grows with zoom so an eye that
    /// backs away with it keeps the scene inside, but never shrinks.
    fn zoomed(&self, zoom: f32) -> Self {
        let depth = zoom.max(1.0);
        Self {
            left: self.left * zoom,
            right: self.right * zoom,
            bottom: self.bottom * zoom,
            top: self.top * zoom,
            near: self.near * depth,
            far: self.far * depth,
        }
    }

    fn matrix(&self) -> Matrix4<f32> {
        glu::ortho(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }
}

/// Orthographic camera whose zoom rescales the frustum it was configured with
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    base: CameraBase,
    initial: Frustum,
    frustum: Frustum,
    zoom: f32,
    projection: Matrix4<f32>,
}

impl OrthoCamera {
    /// Frustum `[-aspect, aspect] x [-1, 1] x [-10, 10]`, eye at `(1, 1, 1)`
    pub fn new(aspect: f32) -> Result<Self> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(Error::InvalidFrustum("aspect ratio must be positive"));
        }
        let frustum = Frustum::new(-aspect, aspect, -1.0, 1.0, DEFAULT_NEAR, DEFAULT_FAR);
        Ok(Self {
            base: CameraBase::new(Vec3::ONE, Vec3::ZERO, Vec3::Y),
            initial: frustum,
            frustum,
            zoom: 1.0,
            projection: frustum.matrix(),
        })
    }

    /// Replace the frustum. The new bounds also become the reference that
    /// [`set_distance`](Self::set_distance) scales from.
    pub fn set_ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<()> {
        let frustum = Frustum::new(left, right, bottom, top, near, far);
        frustum.validate()?;
        self.initial = frustum;
        self.frustum = frustum;
        self.zoom = 1.0;
        self.projection = frustum.matrix();
        Ok(())
    }

    /// Scale the configured frustum by `zoom`. Not cumulative: calling this
    /// twice with the same value gives the same frustum.
    pub fn set_distance(&mut self, zoom: f32) -> Result<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(Error::InvalidFrustum("zoom must be positive"));
        }
        let frustum = self.initial.zoomed(zoom);
        frustum.validate()?;
        self.frustum = frustum;
        self.zoom = zoom;
        self.projection = frustum.matrix();
        Ok(())
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }
}

impl Camera for OrthoCamera {
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
        ProjectionMode::Orthographic
    }

    /// Keep the vertical extent and horizontal centre, widen or narrow to
    /// the new aspect, and reapply the current zoom
    fn set_aspect(&mut self, aspect: f32) -> Result<()> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(Error::InvalidFrustum("aspect ratio must be positive"));
        }
        let f = self.initial;
        let center = (f.left + f.right) * 0.5;
        let half_width = (f.top - f.bottom) * 0.5 * aspect;
        let zoom = self.zoom;
        self.set_ortho(
            center - half_width,
            center + half_width,
            f.bottom,
            f.top,
            f.near,
            f.far,
        )?;
        self.set_distance(zoom)
    }

    fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        self.set_distance(zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let camera = OrthoCamera::new(1.5).unwrap();
        assert_eq!(
            *camera.frustum(),
            Frustum::new(-1.5, 1.5, -1.0, 1.0, DEFAULT_NEAR, DEFAULT_FAR)
        );
        assert_eq!(camera.eye(), Vec3::ONE);
        assert_eq!(camera.target(), Vec3::ZERO);
        assert_eq!(camera.projection_mode(), ProjectionMode::Orthographic);
    }

    #[test]
    fn test_set_distance_is_not_cumulative() {
        let mut camera = OrthoCamera::new(1.0).unwrap();
        camera.set_distance(2.0).unwrap();
        camera.set_distance(2.0).unwrap();
        assert_eq!(camera.frustum().left, -2.0);
        assert_eq!(camera.frustum().top, 2.0);
        assert_eq!(camera.frustum().near, DEFAULT_NEAR * 2.0);
        assert_eq!(camera.frustum().far, DEFAULT_FAR * 2.0);
    }

    #[test]
    fn test_zooming_in_keeps_depth_range() {
        let mut camera = OrthoCamera::new(1.0).unwrap();
        camera.set_distance(0.5).unwrap();
        assert_eq!(camera.frustum().top, 0.5);
        assert_eq!(camera.frustum().near, DEFAULT_NEAR);
        assert_eq!(camera.frustum().far, DEFAULT_FAR);
    }

    #[test]
    fn test_set_ortho_resets_reference() {
        let mut camera = OrthoCamera::new(1.0).unwrap();
        camera.set_distance(3.0).unwrap();
        camera.set_ortho(0.0, 4.0, 0.0, 2.0, 1.0, 5.0).unwrap();
        camera.set_distance(0.5).unwrap();
        assert_eq!(*camera.frustum(), Frustum::new(0.0, 2.0, 0.0, 1.0, 1.0, 5.0));
    }

    #[test]
    fn test_rejects_degenerate_frustum() {
        let mut camera = OrthoCamera::new(1.0).unwrap();
        assert!(camera.set_ortho(1.0, 1.0, -1.0, 1.0, -1.0, 1.0).is_err());
        assert!(camera.set_ortho(-1.0, 1.0, 2.0, 2.0, -1.0, 1.0).is_err());
        assert!(camera.set_ortho(-1.0, 1.0, -1.0, 1.0, 3.0, 3.0).is_err());
        assert!(camera.set_distance(0.0).is_err());
        assert!(OrthoCamera::new(0.0).is_err());
    }

    #[test]
    fn test_projection_matches_frustum() {
        let mut camera = OrthoCamera::new(2.0).unwrap();
        camera.set_distance(1.5).unwrap();
        let expected = Matrix4::new_orthographic(
            -3.0,
            3.0,
            -1.5,
            1.5,
            DEFAULT_NEAR * 1.5,
            DEFAULT_FAR * 1.5,
        );
        assert_relative_eq!(camera.projection_matrix(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_set_aspect_keeps_zoom() {
        let mut camera = OrthoCamera::new(1.0).unwrap();
        camera.set_distance(2.0).unwrap();
        camera.set_aspect(2.0).unwrap();
        assert_relative_eq!(camera.frustum().right, 4.0);
        assert_relative_eq!(camera.frustum().top, 2.0);
        assert_relative_eq!(camera.zoom(), 2.0);
    }
}
