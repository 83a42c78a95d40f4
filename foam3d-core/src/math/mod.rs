//! Vector types and closed-form matrix builders.

pub mod glu;
mod vec2;
mod vec3;

pub use vec2::Vec2;
pub use vec3::Vec3;

/// Tolerance used for degenerate-input checks throughout the crate
pub const EPSILON: f32 = 1e-6;

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
