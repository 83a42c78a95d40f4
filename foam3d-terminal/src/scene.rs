//! The line-buffer demo scene: reference grids, axes, a light marker and
//! either the swept tube or an imported mesh.

use crossterm::style::Color;
use foam3d_core::lines::{self, LineList};
use foam3d_core::{Camera, LineBuffer3d, MatrixStack, Mesh, RotationState, Transform, Vec3};

use crate::config::ViewerConfig;
use crate::renderer::AsciiRenderer;

/// Floor grid sits just below the grid cube's bottom face
const FLOOR_OFFSET: f32 = -0.01;
const LIGHT_MARKER_RADIUS: f32 = 0.075;

const GRID_CUBE_COLOR: Color = Color::Rgb { r: 38, g: 38, b: 38 };
const FLOOR_COLOR: Color = Color::Rgb { r: 64, g: 64, b: 64 };
const AXIS_COLORS: [Color; 3] = [Color::Red, Color::Green, Color::Blue];
/// Turntable speed for imported models, radians per second
const MODEL_SPIN: f32 = 0.4;

/// What the scene shows at its centre
pub enum Subject {
    Tube(LineBuffer3d),
    Model(Mesh),
}

pub struct Scene {
    subject: Subject,
    grid_cube: LineList,
    floor: LineList,
    axes: [LineList; 3],
    light: Vec3,
    light_marker: LineList,
    rotation: RotationState,
}

/// Centre `mesh` on the origin and scale its largest extent to `size`
pub fn fit_mesh(mesh: &mut Mesh, size: f32) {
    let Some((lo, hi)) = mesh.bounds() else {
        return;
    };
    let extent = hi - lo;
    let largest = extent.x.max(extent.y).max(extent.z);
    if largest <= f32::EPSILON {
        return;
    }
    let center = (lo + hi) * 0.5;
    let scale = size / largest;
    let m = Transform::scale_matrix(Vec3::ONE * scale) * Transform::translation_matrix(-center);
    mesh.transform(&m);
}

impl Scene {
    pub fn new(config: &ViewerConfig, model: Option<Mesh>) -> foam3d_core::Result<Self> {
        let subject = match model {
            Some(mut mesh) => {
                fit_mesh(&mut mesh, config.grid.size * 0.5);
                log::info!("showing imported mesh with {} vertices", mesh.num_vertices());
                Subject::Model(mesh)
            }
            None => {
                let mut tube = LineBuffer3d::new(
                    config.line.points(),
                    config.line.segments,
                    config.line.radius,
                )?;
                tube.update_vertex_normals();
                Subject::Tube(tube)
            }
        };
        Ok(Self {
            subject,
            grid_cube: lines::grid_cube(config.grid.size, config.grid.step),
            floor: lines::grid(config.grid.size, config.grid.step),
            axes: lines::axes(config.axes_length),
            light: config.light_position(),
            light_marker: lines::octahedron(LIGHT_MARKER_RADIUS),
            rotation: RotationState::zero(),
        })
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    /// Turn an imported model by hand; the tube stays fixed
    pub fn rotate_model(&mut self, dx: f32, dy: f32, dz: f32) {
        if let Subject::Model(_) = self.subject {
            self.rotation.rotate(dx, dy, dz);
        }
    }

    /// Spin an imported model on its turntable
    pub fn advance(&mut self, dt_secs: f32) {
        self.rotate_model(0.0, MODEL_SPIN * dt_secs, 0.0);
    }

    /// Rasterize everything as seen through `camera`
    pub fn draw(&self, renderer: &mut AsciiRenderer, camera: &dyn Camera) {
        let view_projection = camera.view_projection_matrix();
        let mut stack = MatrixStack::new();

        renderer.draw_lines(&self.grid_cube, &view_projection, GRID_CUBE_COLOR);

        stack.scoped(|s| {
            s.translate(Vec3::new(0.0, FLOOR_OFFSET, 0.0));
            renderer.draw_lines(&self.floor, &(view_projection * s.current()), FLOOR_COLOR);
        });

        for (axis, color) in self.axes.iter().zip(AXIS_COLORS) {
            renderer.draw_lines(axis, &view_projection, color);
        }

        stack.scoped(|s| {
            s.translate(self.light);
            renderer.draw_lines(&self.light_marker, &(view_projection * s.current()), Color::Yellow);
        });

        match &self.subject {
            Subject::Tube(tube) => {
                let mvp = view_projection * stack.current();
                renderer.draw_wireframe(tube.mesh(), &mvp, Color::White);
                renderer.draw_points(tube.points(), &mvp, 'o', Color::Cyan);
            }
            Subject::Model(mesh) => {
                let model = Transform::rotation_matrix(&self.rotation);
                let mvp = Transform::mvp_matrix(
                    &model,
                    &camera.view_matrix(),
                    &camera.projection_matrix(),
                );
                renderer.draw_wireframe(mesh, &mvp, Color::White);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foam3d_core::{primitive, PerspectiveCamera, Viewport};

    fn drawn_cells(renderer: &AsciiRenderer) -> usize {
        (0..renderer.height())
            .flat_map(|y| (0..renderer.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.char_at(x, y) != Some(' '))
            .count()
    }

    #[test]
    fn test_default_scene_draws() {
        let scene = Scene::new(&ViewerConfig::default(), None).unwrap();
        assert!(matches!(scene.subject(), Subject::Tube(_)));

        let mut renderer = AsciiRenderer::new(80, 40);
        let mut camera = PerspectiveCamera::for_viewport(Viewport::new(80, 40)).unwrap();
        camera.look_at(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO);
        scene.draw(&mut renderer, &camera);
        assert!(drawn_cells(&renderer) > 100);
    }

    #[test]
    fn test_bad_tube_config_is_rejected() {
        let mut config = ViewerConfig::default();
        config.line.segments = 1;
        assert!(Scene::new(&config, None).is_err());
    }

    #[test]
    fn test_fit_mesh() {
        let mut mesh = primitive::cube();
        mesh.transform(&Transform::translation_matrix(Vec3::new(10.0, 0.0, 0.0)));
        fit_mesh(&mut mesh, 4.0);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.x + 2.0).abs() < 1e-4 && (hi.x - 2.0).abs() < 1e-4);

        let scene = Scene::new(&ViewerConfig::default(), Some(primitive::cube())).unwrap();
        assert!(matches!(scene.subject(), Subject::Model(_)));
    }

    #[test]
    fn test_only_models_spin() {
        let mut tube = Scene::new(&ViewerConfig::default(), None).unwrap();
        tube.advance(1.0);
        assert_eq!(*tube.rotation(), RotationState::zero());

        let mut model = Scene::new(&ViewerConfig::default(), Some(primitive::cube())).unwrap();
        model.advance(0.5);
        model.rotate_model(0.1, 0.0, 0.0);
        assert!((model.rotation().y - MODEL_SPIN * 0.5).abs() < 1e-6);
        assert!((model.rotation().x - 0.1).abs() < 1e-6);
    }
}
