//! ASCII line rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use foam3d_core::projection::{project_point, project_segment};
use foam3d_core::{LineList, Mesh, ScreenPoint, Vec3, Viewport};
use nalgebra::Matrix4;
use std::io::Write;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 2.0;

/// Pick a glyph that follows the on-screen direction of a segment
fn slope_glyph(a: &ScreenPoint, b: &ScreenPoint) -> char {
    let dx = b.x - a.x;
    let dy = (b.y - a.y) * CELL_ASPECT;
    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        '.'
    } else if dx.abs() > 2.0 * dy.abs() {
        '-'
    } else if dy.abs() > 2.0 * dx.abs() {
        '|'
    } else if (dx > 0.0) != (dy > 0.0) {
        // screen y grows downward
        '/'
    } else {
        '\\'
    }
}

/// ASCII renderer that rasterizes projected line segments into cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            log::debug!("renderer resized to {}x{}", width, height);
            *self = Self::new(width, height);
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as u32, self.height as u32)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, glyph: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = glyph;
            self.color_buffer[idx] = color;
        }
    }

    /// Clip, project and rasterize one world-space segment
    pub fn draw_segment(&mut self, mvp: &Matrix4<f32>, a: Vec3, b: Vec3, color: Color) {
        let Some((p0, p1)) = project_segment(mvp, a, b, self.viewport()) else {
            return;
        };
        let glyph = slope_glyph(&p0, &p1);

        // Bresenham between the cell centres, depth interpolated per step
        let (mut x, mut y) = (p0.x.floor() as i32, p0.y.floor() as i32);
        let (x1, y1) = (p1.x.floor() as i32, p1.y.floor() as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let mut step = 0.0;

        loop {
            let depth = p0.depth + (p1.depth - p0.depth) * (step / steps);
            self.plot(x, y, depth, glyph, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    pub fn draw_lines(&mut self, lines: &LineList, mvp: &Matrix4<f32>, color: Color) {
        for segment in lines.segments() {
            self.draw_segment(mvp, segment.start, segment.end, color);
        }
    }

    pub fn draw_points(&mut self, points: &[Vec3], mvp: &Matrix4<f32>, glyph: char, color: Color) {
        let viewport = self.viewport();
        for &p in points {
            if let Some(s) = project_point(mvp, p, viewport) {
                self.plot(s.x.floor() as i32, s.y.floor() as i32, s.depth, glyph, color);
            }
        }
    }

    /// Outline every unique edge of `mesh`
    pub fn draw_wireframe(&mut self, mesh: &Mesh, mvp: &Matrix4<f32>, color: Color) {
        for (a, b) in mesh.edges() {
            self.draw_segment(mvp, mesh.vertices[a], mesh.vertices[b], color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
