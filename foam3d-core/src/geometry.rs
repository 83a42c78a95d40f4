/// Indexed mesh storage with parallel vertex attribute arrays
use std::collections::BTreeSet;

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::error::{Error, Result};
use crate::math::{Vec2, Vec3};

pub type Color = [f32; 4];

pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Primitive assembly mode, mirroring the GL draw modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
}

/// A triangle face defined by three positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            positions: [a, b, c],
        }
    }

    /// Unit face normal, counter-clockwise winding. Degenerate faces give zero.
    pub fn normal(&self) -> Vec3 {
        self.scaled_normal().normalized()
    }

    /// Cross product of the edges, twice the area in length
    pub fn scaled_normal(&self) -> Vec3 {
        let [a, b, c] = self.positions;
        (b - a).cross(c - a)
    }

    pub fn area(&self) -> f32 {
        self.scaled_normal().length() * 0.5
    }
}

/// A 3D mesh made of parallel attribute arrays and an optional index list.
///
/// Attributes other than `vertices` may be empty; when present they must
/// have one entry per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub mode: DrawMode,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub texcoords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            vertices: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_capacity(mode: DrawMode, vertices: usize, indices: usize) -> Self {
        Self {
            mode,
            vertices: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            texcoords: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) {
        self.vertices = vertices;
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) {
        self.normals = normals;
    }

    pub fn set_colors(&mut self, colors: Vec<Color>) {
        self.colors = colors;
    }

    pub fn set_texcoords(&mut self, texcoords: Vec<Vec2>) {
        self.texcoords = texcoords;
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = indices;
    }

    /// Fill the color attribute with one color
    pub fn fill_color(&mut self, color: Color) {
        self.colors = vec![color; self.vertices.len()];
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.colors.clear();
        self.texcoords.clear();
        self.indices.clear();
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check attribute lengths and index bounds
    pub fn validate(&self) -> Result<()> {
        let expected = self.vertices.len();
        let check = |name: &'static str, got: usize| {
            if got != 0 && got != expected {
                Err(Error::AttributeLength {
                    name,
                    got,
                    expected,
                })
            } else {
                Ok(())
            }
        };
        check("normals", self.normals.len())?;
        check("colors", self.colors.len())?;
        check("texcoords", self.texcoords.len())?;

        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= expected) {
            return Err(Error::IndexOutOfRange {
                index: index as usize,
                len: expected,
            });
        }
        Ok(())
    }

    /// Vertex order after resolving the index list
    fn element_order(&self) -> Vec<usize> {
        if self.is_indexed() {
            self.indices.iter().map(|&i| i as usize).collect()
        } else {
            (0..self.vertices.len()).collect()
        }
    }

    /// Triangle index triples for triangle modes, strips unrolled with
    /// alternating winding fixed up. Out-of-range references are skipped.
    pub fn triangle_indices(&self) -> Vec<[usize; 3]> {
        let order = self.element_order();
        let n = self.vertices.len();
        let in_range = |t: &[usize; 3]| t.iter().all(|&i| i < n);

        let tris: Vec<[usize; 3]> = match self.mode {
            DrawMode::Triangles => order
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
            DrawMode::TriangleStrip => order
                .windows(3)
                .enumerate()
                .map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        tris.into_iter().filter(in_range).collect()
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangle_indices().into_iter().map(move |[a, b, c]| {
            Triangle::new(self.vertices[a], self.vertices[b], self.vertices[c])
        })
    }

    /// Unique undirected edges as sorted index pairs.
    ///
    /// Triangle modes yield the triangle outlines, line modes the segments
    /// they would draw, points yield nothing.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let order = self.element_order();
        let n = self.vertices.len();
        let mut set = BTreeSet::new();
        let mut add = |a: usize, b: usize| {
            if a != b && a < n && b < n {
                set.insert((a.min(b), a.max(b)));
            }
        };

        match self.mode {
            DrawMode::Points => {}
            DrawMode::Lines => {
                for c in order.chunks_exact(2) {
                    add(c[0], c[1]);
                }
            }
            DrawMode::LineStrip | DrawMode::LineLoop => {
                for w in order.windows(2) {
                    add(w[0], w[1]);
                }
                if self.mode == DrawMode::LineLoop && order.len() > 2 {
                    add(order[order.len() - 1], order[0]);
                }
            }
            DrawMode::Triangles | DrawMode::TriangleStrip => {
                for [a, b, c] in self.triangle_indices() {
                    add(a, b);
                    add(b, c);
                    add(c, a);
                }
            }
        }
        set.into_iter().collect()
    }

    /// Smooth per-vertex normals, each face weighted by its area
    pub fn update_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for [a, b, c] in self.triangle_indices() {
            let face = Triangle::new(self.vertices[a], self.vertices[b], self.vertices[c])
                .scaled_normal();
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for n in &mut normals {
            n.normalize();
        }
        self.normals = normals;
    }

    /// Axis-aligned bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| {
                    (lo.min_components(v), hi.max_components(v))
                }),
        )
    }

    /// Positions packed as `x, y, z, x, y, z, ...` for buffer upload
    pub fn flattened_vertices(&self) -> Vec<f32> {
        flatten(&self.vertices)
    }

    pub fn flattened_normals(&self) -> Vec<f32> {
        flatten(&self.normals)
    }

    /// Apply `m` to positions and its inverse transpose to normals
    pub fn transform(&mut self, m: &Matrix4<f32>) {
        for v in &mut self.vertices {
            *v = m.transform_point(&Point3::from(*v)).into();
        }
        let linear: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear);
        for n in &mut self.normals {
            let v: Vector3<f32> = (*n).into();
            *n = Vec3::from(normal_matrix * v).normalized();
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(DrawMode::Triangles)
    }
}

pub(crate) fn flatten(points: &[Vec3]) -> Vec<f32> {
    points.iter().flat_map(|v| v.to_array()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new(DrawMode::Triangles);
        mesh.set_vertices(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        mesh.set_indices(vec![0, 1, 2, 0, 2, 3]);
        mesh
    }

    #[test]
    fn test_triangle_normal() {
        let t = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(t.normal(), Vec3::Z);
        assert_relative_eq!(t.area(), 0.5);

        let degenerate = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(degenerate.normal(), Vec3::ZERO);
    }

    #[test]
    fn test_validate() {
        let mut mesh = quad();
        assert!(mesh.validate().is_ok());

        mesh.set_normals(vec![Vec3::Z; 3]);
        assert_eq!(
            mesh.validate(),
            Err(Error::AttributeLength {
                name: "normals",
                got: 3,
                expected: 4
            })
        );

        mesh.set_normals(Vec::new());
        mesh.indices.push(9);
        assert_eq!(mesh.validate(), Err(Error::IndexOutOfRange { index: 9, len: 4 }));
    }

    #[test]
    fn test_edges_are_deduplicated() {
        // two triangles share the diagonal
        assert_eq!(quad().edges().len(), 5);
    }

    #[test]
    fn test_line_loop_edges_close() {
        let mut mesh = Mesh::new(DrawMode::LineLoop);
        mesh.set_vertices(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(mesh.edges(), vec![(0, 1), (0, 2), (1, 2)]);

        mesh.mode = DrawMode::Points;
        assert!(mesh.edges().is_empty());
    }

    #[test]
    fn test_triangle_strip_winding() {
        let mut mesh = Mesh::new(DrawMode::TriangleStrip);
        mesh.set_vertices(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]);
        let normals: Vec<Vec3> = mesh.triangles().map(|t| t.normal()).collect();
        assert_eq!(normals.len(), 2);
        assert_relative_eq!(normals[0], normals[1]);
    }

    #[test]
    fn test_update_vertex_normals() {
        let mut mesh = quad();
        mesh.update_vertex_normals();
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert_relative_eq!(*n, Vec3::Z);
        }
    }

    #[test]
    fn test_bounds_and_flatten() {
        let mesh = quad();
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))));
        assert_eq!(mesh.flattened_vertices().len(), 12);
        assert_eq!(Mesh::default().bounds(), None);
    }

    #[test]
    fn test_transform_keeps_normals_unit() {
        let mut mesh = quad();
        mesh.update_vertex_normals();
        mesh.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 4.0)));
        assert_eq!(mesh.vertices[2], Vec3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(mesh.normals[0], Vec3::Z, epsilon = 1e-6);
    }
}
