//! Line-segment scene helpers: grids, axes and small markers.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Mesh;
use crate::math::{Vec3, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineList {
    segments: Vec<Segment>,
}

impl LineList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, start: Vec3, end: Vec3) {
        self.segments.push(Segment::new(start, end));
    }

    /// Open strip through `points`
    pub fn polyline(points: &[Vec3]) -> Self {
        let segments = points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect();
        Self { segments }
    }

    /// Closed strip through `points`
    pub fn line_loop(points: &[Vec3]) -> Self {
        let mut list = Self::polyline(points);
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if points.len() > 2 {
                list.push(last, first);
            }
        }
        list
    }

    /// One segment per unique mesh edge
    pub fn from_mesh_edges(mesh: &Mesh) -> Self {
        let segments = mesh
            .edges()
            .into_iter()
            .map(|(a, b)| Segment::new(mesh.vertices[a], mesh.vertices[b]))
            .collect();
        Self { segments }
    }

    pub fn extend(&mut self, other: &LineList) {
        self.segments.extend_from_slice(&other.segments);
    }

    pub fn transformed(&self, m: &Matrix4<f32>) -> Self {
        let apply = |v: Vec3| -> Vec3 {
            let p: Point3<f32> = v.into();
            m.transform_point(&p).into()
        };
        let segments = self
            .segments
            .iter()
            .map(|s| Segment::new(apply(s.start), apply(s.end)))
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Packed `x, y, z` pairs, two vertices per segment
    pub fn flattened(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.segments.len() * 6);
        for s in &self.segments {
            out.extend_from_slice(&s.start.to_array());
            out.extend_from_slice(&s.end.to_array());
        }
        out
    }
}

/// Offsets from `-size / 2` to `size / 2` in increments of `step`
fn ticks(size: f32, step: f32) -> Vec<f32> {
    if size <= 0.0 || step <= EPSILON {
        log::warn!("ignoring grid with size {} and step {}", size, step);
        return Vec::new();
    }
    let half = size * 0.5;
    let count = (size / step + EPSILON).floor() as usize;
    (0..=count).map(|i| -half + i as f32 * step).collect()
}

/// Square grid on the XZ plane centred at the origin
pub fn grid(size: f32, step: f32) -> LineList {
    let half = size * 0.5;
    let mut list = LineList::new();
    for t in ticks(size, step) {
        list.push(Vec3::new(t, 0.0, -half), Vec3::new(t, 0.0, half));
        list.push(Vec3::new(-half, 0.0, t), Vec3::new(half, 0.0, t));
    }
    list
}

/// Grids on all six faces of a cube with edge length `size`
pub fn grid_cube(size: f32, step: f32) -> LineList {
    let half = size * 0.5;
    let face = grid(size, step);
    let quarter = std::f32::consts::FRAC_PI_2;
    let shift = |offset: Vec3| -> Matrix4<f32> {
        let offset: Vector3<f32> = offset.into();
        Matrix4::new_translation(&offset)
    };
    let upright = Matrix4::from_scaled_axis(Vector3::x() * quarter);
    let sideways = Matrix4::from_scaled_axis(Vector3::z() * quarter);
    let placements = [
        shift(Vec3::Y * half),
        shift(Vec3::Y * -half),
        shift(Vec3::Z * half) * upright,
        shift(Vec3::Z * -half) * upright,
        shift(Vec3::X * half) * sideways,
        shift(Vec3::X * -half) * sideways,
    ];
    let mut list = LineList::new();
    for m in &placements {
        list.extend(&face.transformed(m));
    }
    list
}

/// X, Y and Z axis lines from the origin
pub fn axes(length: f32) -> [LineList; 3] {
    [Vec3::X, Vec3::Y, Vec3::Z].map(|axis| {
        let mut list = LineList::new();
        list.push(Vec3::ZERO, axis * length);
        list
    })
}

/// Wire octahedron with its six tips `radius` from the origin
pub fn octahedron(radius: f32) -> LineList {
    let tips = [Vec3::X, Vec3::new(-1.0, 0.0, 0.0), Vec3::Z, Vec3::new(0.0, 0.0, -1.0)]
        .map(|v| v * radius);
    let top = Vec3::Y * radius;
    let bottom = Vec3::Y * -radius;

    let mut list = LineList::line_loop(&[tips[0], tips[2], tips[1], tips[3]]);
    for &tip in &tips {
        list.push(top, tip);
        list.push(bottom, tip);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::cube;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_spans_size() {
        let list = grid(8.0, 1.0);
        // nine lines each way
        assert_eq!(list.len(), 18);
        for s in list.segments() {
            assert_eq!(s.start.y, 0.0);
            assert_relative_eq!(s.length(), 8.0, epsilon = 1e-5);
        }
        assert_eq!(list.segments()[0].start, Vec3::new(-4.0, 0.0, -4.0));
    }

    #[test]
    fn test_grid_rejects_bad_step() {
        assert!(grid(8.0, 0.0).is_empty());
        assert!(grid(-1.0, 1.0).is_empty());
    }

    #[test]
    fn test_grid_cube_stays_on_faces() {
        let list = grid_cube(2.0, 1.0);
        assert_eq!(list.len(), 6 * 6);
        for s in list.segments() {
            for p in [s.start, s.end] {
                let on_face = [p.x, p.y, p.z]
                    .iter()
                    .any(|c| (c.abs() - 1.0).abs() < 1e-5);
                assert!(on_face, "{} is off the cube", p);
                assert!(p.x.abs() <= 1.0 + 1e-5 && p.y.abs() <= 1.0 + 1e-5 && p.z.abs() <= 1.0 + 1e-5);
            }
        }
    }

    #[test]
    fn test_axes() {
        let [x, y, z] = axes(4.0);
        assert_eq!(x.segments()[0].end, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(y.segments()[0].end, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(z.segments()[0].end, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_octahedron() {
        let list = octahedron(0.075);
        assert_eq!(list.len(), 12);
        for s in list.segments() {
            assert_relative_eq!(s.start.length(), 0.075, epsilon = 1e-6);
            assert_relative_eq!(s.end.length(), 0.075, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_loops_and_mesh_edges() {
        let square = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        assert_eq!(LineList::polyline(&square).len(), 3);
        assert_eq!(LineList::line_loop(&square).len(), 4);
        assert_eq!(LineList::line_loop(&square[..2]).len(), 1);
        assert!(LineList::polyline(&[]).is_empty());

        let wire = LineList::from_mesh_edges(&cube());
        assert_eq!(wire.len(), 30);
        assert_eq!(wire.flattened().len(), 30 * 6);
    }

    #[test]
    fn test_transformed() {
        let list = LineList::polyline(&[Vec3::ZERO, Vec3::X]);
        let moved = list.transformed(&Matrix4::new_translation(&Vector3::new(0.0, 2.0, 0.0)));
        assert_eq!(moved.segments()[0].start, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(moved.segments()[0].end, Vec3::new(1.0, 2.0, 0.0));
    }
}
