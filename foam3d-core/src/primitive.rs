//! Procedural mesh primitives.
//!
//! Both primitives are unit sized and centred on the origin; scale them with
//! [`Mesh::transform`] or a model matrix.

use crate::error::{Error, Result};
use crate::geometry::{DrawMode, Mesh, WHITE};
use crate::math::{Vec2, Vec3};

/// Tessellated unit plane in XY facing +Z with `num_h` by `num_v` cells
pub fn plane(num_h: usize, num_v: usize) -> Result<Mesh> {
    let invalid = Error::InvalidSubdivisions { num_h, num_v };
    if num_h == 0 || num_v == 0 {
        return Err(invalid);
    }
    let columns = num_h.saturating_add(1);
    let rows = num_v.saturating_add(1);
    // every vertex must be addressable by a u32 index
    let num_vertices = columns
        .checked_mul(rows)
        .filter(|&n| n <= u32::MAX as usize)
        .ok_or_else(|| invalid.clone())?;
    let num_indices = (num_h * num_v).checked_mul(6).ok_or(invalid)?;
    let mut mesh = Mesh::with_capacity(DrawMode::Triangles, num_vertices, num_indices);

    for j in 0..rows {
        let v = j as f32 / num_v as f32;
        for i in 0..columns {
            let u = i as f32 / num_h as f32;
            mesh.vertices.push(Vec3::new(u - 0.5, v - 0.5, 0.0));
            mesh.normals.push(Vec3::Z);
            mesh.texcoords.push(Vec2::new(u, v));
        }
    }
    mesh.fill_color(WHITE);

    for j in 0..num_v {
        for i in 0..num_h {
            let a = (j * columns + i) as u32;
            let b = a + 1;
            let d = a + columns as u32;
            let c = d + 1;
            mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    log::debug!(
        "plane {}x{}: {} vertices, {} indices",
        num_h,
        num_v,
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}

/// Plane mesh that can be re-tessellated in place
#[derive(Debug, Clone)]
pub struct Plane {
    num_h: usize,
    num_v: usize,
    mesh: Mesh,
}

impl Plane {
    pub fn new(num_h: usize, num_v: usize) -> Result<Self> {
        Ok(Self {
            num_h,
            num_v,
            mesh: plane(num_h, num_v)?,
        })
    }

    /// Regenerate all attributes. On error the current mesh is kept.
    pub fn set_sub_divisions(&mut self, num_h: usize, num_v: usize) -> Result<()> {
        self.mesh = plane(num_h, num_v)?;
        self.num_h = num_h;
        self.num_v = num_v;
        Ok(())
    }

    pub fn sub_divisions(&self) -> (usize, usize) {
        (self.num_h, self.num_v)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

/// Face normal plus in-plane axes ordered so that `u x v == normal`
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::Y),
    (Vec3::X, Vec3::new(0.0, 0.0, -1.0), Vec3::Y),
    (Vec3::new(-1.0, 0.0, 0.0), Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::new(0.0, 0.0, -1.0)),
    (Vec3::new(0.0, -1.0, 0.0), Vec3::X, Vec3::Z),
];

/// Unit cube with four vertices per face so each face keeps a flat normal
pub fn cube() -> Mesh {
    let mut mesh = Mesh::with_capacity(DrawMode::Triangles, 24, 36);
    let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];
    let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];

    for (face, &(normal, u, v)) in CUBE_FACES.iter().enumerate() {
        let center = normal * 0.5;
        for (&(cu, cv), &uv) in corners.iter().zip(&uvs) {
            mesh.vertices.push(center + u * cu + v * cv);
            mesh.normals.push(normal);
            mesh.texcoords.push(uv);
        }
        let base = (face * 4) as u32;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh.fill_color(WHITE);
    mesh
}
