//! Clip-space clipping and the mapping from clip space to screen pixels
use nalgebra::{Matrix4, Vector4};

use crate::math::{Vec3, EPSILON};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Orthographic => Self::Perspective,
            Self::Perspective => Self::Orthographic,
        }
    }
}

/// Target surface size in pixels (or terminal cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a zero height is treated as one row
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Map normalized device coordinates to the surface, y growing downward
    pub fn ndc_to_screen(&self, ndc: Vec3) -> ScreenPoint {
        ScreenPoint {
            x: (ndc.x + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc.y) * 0.5 * self.height as f32,
            depth: ndc.z,
        }
    }
}

/// A projected point: surface coordinates plus NDC depth in `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

fn to_clip(mvp: &Matrix4<f32>, p: Vec3) -> Vector4<f32> {
    mvp * Vector4::new(p.x, p.y, p.z, 1.0)
}

fn to_ndc(clip: &Vector4<f32>) -> Vec3 {
    Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
}

/// Project a single point, rejecting anything outside the view volume
pub fn project_point(mvp: &Matrix4<f32>, p: Vec3, viewport: Viewport) -> Option<ScreenPoint> {
    let clip = to_clip(mvp, p);
    if clip.w.abs() < EPSILON {
        return None;
    }
    let ndc = to_ndc(&clip);
    let inside = |c: f32| (-1.0..=1.0).contains(&c);
    if !(inside(ndc.x) && inside(ndc.y) && inside(ndc.z)) {
        return None;
    }
    Some(viewport.ndc_to_screen(ndc))
}

/// Signed distances of a clip-space point to the six frustum planes plus
/// the `w > 0` plane. Non-negative means inside.
fn plane_distances(c: &Vector4<f32>) -> [f32; 7] {
    [
        c.w + c.x,
        c.w - c.x,
        c.w + c.y,
        c.w - c.y,
        c.w + c.z,
        c.w - c.z,
        c.w - EPSILON,
    ]
}

/// Clip a homogeneous segment to the view volume.
///
/// Parametric (Liang-Barsky style) clipping done before the perspective
/// divide, so segments passing behind the eye are cut at the near plane
/// instead of wrapping around through infinity.
pub fn clip_segment(a: Vector4<f32>, b: Vector4<f32>) -> Option<(Vector4<f32>, Vector4<f32>)> {
    let da = plane_distances(&a);
    let db = plane_distances(&b);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);

    for (pa, pb) in da.into_iter().zip(db) {
        if pa < 0.0 && pb < 0.0 {
            return None;
        }
        if pa < 0.0 {
            t0 = t0.max(pa / (pa - pb));
        } else if pb < 0.0 {
            t1 = t1.min(pa / (pa - pb));
        }
        if t0 > t1 {
            return None;
        }
    }

    let d = b - a;
    Some((a + d * t0, a + d * t1))
}

/// Project the visible part of a world-space segment onto the surface
pub fn project_segment(
    mvp: &Matrix4<f32>,
    a: Vec3,
    b: Vec3,
    viewport: Viewport,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let (ca, cb) = clip_segment(to_clip(mvp, a), to_clip(mvp, b))?;
    Some((
        viewport.ndc_to_screen(to_ndc(&ca)),
        viewport.ndc_to_screen(to_ndc(&cb)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::glu;
    use approx::assert_relative_eq;

    fn camera_mvp() -> Matrix4<f32> {
        let view = glu::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = glu::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        proj * view
    }

    #[test]
    fn test_origin_projects_to_center() {
        let vp = Viewport::new(80, 40);
        let p = project_point(&camera_mvp(), Vec3::ZERO, vp).unwrap();
        assert_relative_eq!(p.x, 40.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-4);
        assert!(p.depth > -1.0 && p.depth < 1.0);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let vp = Viewport::new(80, 40);
        assert!(project_point(&camera_mvp(), Vec3::new(0.0, 0.0, 10.0), vp).is_none());
    }

    #[test]
    fn test_screen_y_grows_downward() {
        let vp = Viewport::new(100, 100);
        let up = project_point(&camera_mvp(), Vec3::new(0.0, 1.0, 0.0), vp).unwrap();
        assert!(up.y < 50.0);
    }

    #[test]
    fn test_segment_fully_inside_is_unchanged() {
        let a = Vector4::new(-0.5, 0.0, 0.0, 1.0);
        let b = Vector4::new(0.5, 0.2, 0.1, 1.0);
        let (ca, cb) = clip_segment(a, b).unwrap();
        assert_relative_eq!(ca, a);
        assert_relative_eq!(cb, b);
    }

    #[test]
    fn test_segment_is_cut_at_the_boundary() {
        let a = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let b = Vector4::new(3.0, 0.0, 0.0, 1.0);
        let (_, cb) = clip_segment(a, b).unwrap();
        assert_relative_eq!(cb.x / cb.w, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_segment_outside_is_dropped() {
        let a = Vector4::new(2.0, 0.0, 0.0, 1.0);
        let b = Vector4::new(3.0, 1.0, 0.0, 1.0);
        assert!(clip_segment(a, b).is_none());
    }

    #[test]
    fn test_segment_crossing_the_eye_plane_is_clipped() {
        let vp = Viewport::new(100, 100);
        // from in front of the camera to behind it
        let (sa, sb) = project_segment(
            &camera_mvp(),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 20.0),
            vp,
        )
        .unwrap();
        for p in [sa, sb] {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!((-1.0 - 1e-4..=1.0 + 1e-4).contains(&p.depth));
        }
    }

    #[test]
    fn test_toggle() {
        assert_eq!(ProjectionMode::Perspective.toggled(), ProjectionMode::Orthographic);
    }
}
