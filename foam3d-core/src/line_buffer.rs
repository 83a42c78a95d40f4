//! Tube geometry swept along a polyline.
//!
//! Each control point gets a ring of `num_segments` vertices lying in the
//! plane perpendicular to the local tangent. Ring orientation is carried
//! from point to point by parallel transport so the tube does not twist
//! where the path bends.

use std::f32::consts::TAU;

use crate::error::{Error, Result};
use crate::geometry::{DrawMode, Mesh, WHITE};
use crate::math::{Vec2, Vec3};

/// Tangent, normal and binormal at one control point
#[derive(Debug, Clone, Copy)]
struct Frame {
    normal: Vec3,
    binormal: Vec3,
}

#[derive(Debug, Clone)]
pub struct LineBuffer3d {
    points: Vec<Vec3>,
    num_segments: usize,
    radius: f32,
    mesh: Mesh,
}

fn check_segments(num_segments: usize) -> Result<()> {
    if num_segments < 3 {
        return Err(Error::TooFewSegments(num_segments));
    }
    Ok(())
}

fn check_radius(radius: f32) -> Result<()> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(Error::InvalidRadius(radius));
    }
    Ok(())
}

impl LineBuffer3d {
    pub fn new(points: Vec<Vec3>, num_segments: usize, radius: f32) -> Result<Self> {
        check_segments(num_segments)?;
        check_radius(radius)?;
        let mut buffer = Self {
            points,
            num_segments,
            radius,
            mesh: Mesh::new(DrawMode::Triangles),
        };
        buffer.update();
        Ok(buffer)
    }

    /// Build from packed `x, y, z` triples
    pub fn from_flat(coords: &[f32], num_segments: usize, radius: f32) -> Result<Self> {
        Self::new(points_from_flat(coords)?, num_segments, radius)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Replace the path. Geometry is rebuilt on the next [`update`](Self::update).
    pub fn set_points(&mut self, points: Vec<Vec3>) {
        self.points = points;
    }

    pub fn set_point(&mut self, index: usize, point: Vec3) -> Result<()> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = point;
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        check_radius(radius)?;
        self.radius = radius;
        Ok(())
    }

    pub fn set_num_segments(&mut self, num_segments: usize) -> Result<()> {
        check_segments(num_segments)?;
        self.num_segments = num_segments;
        Ok(())
    }

    fn tangents(&self) -> Vec<Vec3> {
        let n = self.points.len();
        let mut tangents = Vec::with_capacity(n);
        let mut last = Vec3::X;
        for i in 0..n {
            let ahead = self.points[(i + 1).min(n - 1)];
            let behind = self.points[i.saturating_sub(1)];
            let t = ahead - behind;
            // repeated points inherit the previous direction
            if !t.is_zero() {
                last = t.normalized();
            }
            tangents.push(last);
        }
        tangents
    }

    fn frames(&self) -> Vec<Frame> {
        let mut frames: Vec<Frame> = Vec::with_capacity(self.points.len());
        for t in self.tangents() {
            let normal = match frames.last() {
                Some(prev) => {
                    let projected = prev.normal - t * prev.normal.dot(t);
                    if projected.is_zero() {
                        t.any_orthogonal()
                    } else {
                        projected.normalized()
                    }
                }
                None => t.any_orthogonal(),
            };
            frames.push(Frame {
                normal,
                binormal: t.cross(normal),
            });
        }
        frames
    }

    fn ring_direction(frame: &Frame, j: usize, num_segments: usize) -> Vec3 {
        let angle = TAU * j as f32 / num_segments as f32;
        frame.normal * angle.cos() + frame.binormal * angle.sin()
    }

    /// Rebuild positions, texcoords, colors and indices from the path.
    /// Normals are cleared; call [`update_vertex_normals`](Self::update_vertex_normals)
    /// to restore them.
    pub fn update(&mut self) {
        let segs = self.num_segments;
        let n = self.points.len();
        self.mesh.clear();
        if n < 2 {
            log::debug!("line buffer with {} point(s) produces no geometry", n);
            return;
        }

        let frames = self.frames();
        for (i, (p, frame)) in self.points.iter().zip(&frames).enumerate() {
            let v = i as f32 / (n - 1) as f32;
            for j in 0..segs {
                let dir = Self::ring_direction(frame, j, segs);
                self.mesh.vertices.push(*p + dir * self.radius);
                self.mesh.texcoords.push(Vec2::new(j as f32 / segs as f32, v));
            }
        }
        self.mesh.fill_color(WHITE);

        for i in 0..n - 1 {
            let ring = (i * segs) as u32;
            let next = ring + segs as u32;
            for j in 0..segs {
                let j0 = j as u32;
                let j1 = ((j + 1) % segs) as u32;
                let (a, b, c, d) = (ring + j0, ring + j1, next + j1, next + j0);
                self.mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
        log::debug!(
            "line buffer: {} points x {} segments -> {} vertices",
            n,
            segs,
            self.mesh.vertices.len()
        );
    }

    /// Radial unit normals, independent of the radius
    pub fn update_vertex_normals(&mut self) {
        if self.points.len() < 2 {
            self.mesh.normals.clear();
            return;
        }
        let segs = self.num_segments;
        self.mesh.normals = self
            .frames()
            .iter()
            .flat_map(|frame| (0..segs).map(move |j| Self::ring_direction(frame, j, segs)))
            .collect();
    }
}

/// Unpack `x, y, z` triples
pub fn points_from_flat(coords: &[f32]) -> Result<Vec<Vec3>> {
    if coords.len() % 3 != 0 {
        return Err(Error::RaggedCoordinates(coords.len()));
    }
    Ok(coords
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}
