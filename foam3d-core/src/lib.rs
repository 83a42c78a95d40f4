//! Foam3D core library: vector math, cameras, projection and mesh generation
//!
//! Everything here is renderer agnostic. The terminal and web front ends
//! consume the matrices and flat attribute arrays produced by these modules.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod line_buffer;
pub mod lines;
pub mod math;
pub mod primitive;
pub mod projection;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, CameraBase, Frustum, Orbit, OrthoCamera, PerspectiveCamera};
pub use error::{Error, Result};
pub use geometry::{Color, DrawMode, Mesh, Triangle};
pub use line_buffer::LineBuffer3d;
pub use lines::{LineList, Segment};
pub use math::{Vec2, Vec3};
pub use projection::{ProjectionMode, ScreenPoint, Viewport};
pub use transform::{MatrixStack, RotationState, Transform};
