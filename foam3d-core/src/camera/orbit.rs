use std::f32::consts::PI;

use super::Camera;
use crate::error::Result;
use crate::math::{clamp, lerp, Vec2, Vec3};

const ZOOM_EASING: f32 = 0.0025;
const DRAG_EASING: f32 = 0.25;
const WHEEL_STEP: f32 = 0.25;
const MIN_ZOOM: f32 = 0.25;

/// Orbiting rig that circles the origin and follows a held pointer.
///
/// Idle, the eye travels around the Y axis at `speed` radians per second,
/// at a radius and height equal to the current zoom. While the pointer is
/// held the eye eases towards the spherical position the pointer selects.
#[derive(Debug, Clone)]
pub struct Orbit {
    base_zoom: f32,
    zoom: f32,
    wheel: f32,
    speed: f32,
    pointer: Option<Vec2>,
}

impl Orbit {
    pub fn new(zoom: f32, speed: f32) -> Self {
        let zoom = zoom.max(MIN_ZOOM);
        Self {
            base_zoom: zoom,
            zoom,
            wheel: 0.0,
            speed,
            pointer: None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn target_zoom(&self) -> f32 {
        (self.base_zoom + self.wheel * WHEEL_STEP).max(MIN_ZOOM)
    }

    /// Accumulate wheel (or key) steps; positive moves the eye away
    pub fn scroll(&mut self, delta: f32) {
        self.wheel += delta;
        let min_wheel = (MIN_ZOOM - self.base_zoom) / WHEEL_STEP;
        self.wheel = self.wheel.max(min_wheel);
    }

    /// Hold the pointer at normalized surface coordinates in `[0, 1]`
    pub fn press(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(clamp(x, 0.0, 1.0), clamp(y, 0.0, 1.0)));
    }

    pub fn release(&mut self) {
        self.pointer = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_some()
    }

    /// Idle eye position at `elapsed` seconds
    pub fn idle_eye(&self, elapsed: f32) -> Vec3 {
        let angle = elapsed * self.speed;
        Vec3::new(angle.cos() * self.zoom, self.zoom, angle.sin() * self.zoom)
    }

    /// Eye position selected by a pointer at normalized `p`
    pub fn pointer_eye(&self, p: Vec2) -> Vec3 {
        let rot_x = (-1.0 + p.x * 2.0) * PI;
        let rot_y = (-1.0 + p.y * 2.0) * PI * 0.5;
        Vec3::new(
            rot_x.cos() * self.zoom,
            rot_y.sin() * self.zoom,
            rot_x.sin() * self.zoom,
        )
    }

    /// Advance the rig and aim `camera` at the origin
    pub fn update(&mut self, camera: &mut dyn Camera, elapsed: f32, dt_ms: f32) -> Result<()> {
        let t = clamp(dt_ms * ZOOM_EASING, 0.0, 1.0);
        self.zoom = lerp(self.zoom, self.target_zoom(), t);

        let eye = match self.pointer {
            Some(p) => {
                let t = clamp(dt_ms * DRAG_EASING, 0.0, 1.0);
                camera.eye().lerp(self.pointer_eye(p), t)
            }
            None => self.idle_eye(elapsed),
        };
        camera.look_at(eye, Vec3::ZERO);
        camera.set_zoom(self.zoom)
    }
}
