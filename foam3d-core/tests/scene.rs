use approx::assert_relative_eq;
use foam3d_core::lines::{self, LineList};
use foam3d_core::primitive;
use foam3d_core::projection::project_segment;
use foam3d_core::{
    Camera, LineBuffer3d, MatrixStack, Orbit, OrthoCamera, PerspectiveCamera, ProjectionMode,
    Vec3, Viewport,
};

const DEMO_POINTS: [f32; 15] = [
    -2.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0,
];

fn visible_segments(camera: &dyn Camera, list: &LineList, viewport: Viewport) -> usize {
    let mvp = camera.view_projection_matrix();
    list.segments()
        .iter()
        .filter(|s| project_segment(&mvp, s.start, s.end, viewport).is_some())
        .count()
}

#[test]
fn orbiting_camera_keeps_the_tube_in_view() {
    let viewport = Viewport::new(120, 40);
    let mut camera = PerspectiveCamera::for_viewport(viewport).unwrap();
    let mut orbit = Orbit::new(3.0, 0.25);

    let mut tube = LineBuffer3d::from_flat(&DEMO_POINTS, 16, 0.25).unwrap();
    tube.update_vertex_normals();
    let wire = LineList::from_mesh_edges(tube.mesh());

    for frame in 0..120 {
        let elapsed = frame as f32 / 30.0;
        orbit.update(&mut camera, elapsed, 1000.0 / 30.0).unwrap();
        assert_relative_eq!(camera.eye().length(), 3.0 * 2f32.sqrt(), epsilon = 1e-3);
        assert!(visible_segments(&camera, &wire, viewport) > 0);
    }
}

#[test]
fn origin_projects_to_the_center_for_both_projections() {
    let viewport = Viewport::new(80, 40);
    let mut ortho = OrthoCamera::new(viewport.aspect()).unwrap();
    let mut perspective = PerspectiveCamera::for_viewport(viewport).unwrap();
    let mut orbit = Orbit::new(3.0, 0.25);

    let cameras: [&mut dyn Camera; 2] = [&mut ortho, &mut perspective];
    for camera in cameras {
        orbit.update(&mut *camera, 1.0, 16.0).unwrap();
        let p = camera
            .project(Vec3::ZERO, &nalgebra::Matrix4::identity(), viewport)
            .unwrap();
        assert_relative_eq!(p.x, 40.0, epsilon = 1e-3);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-3);
    }
    assert_eq!(ortho.projection_mode(), ProjectionMode::Orthographic);
    assert_eq!(perspective.projection_mode().toggled(), ProjectionMode::Orthographic);
}

#[test]
fn matrix_stack_places_the_light_marker() {
    let mut stack = MatrixStack::new();
    let light = Vec3::ONE;
    let marker = stack.scoped(|s| {
        s.translate(light);
        lines::octahedron(0.075).transformed(s.current())
    });
    assert_eq!(stack.depth(), 0);
    for segment in marker.segments() {
        assert!(segment.start.distance(light) <= 0.075 + 1e-5);
    }
}

#[test]
fn scene_helpers_survive_projection() {
    let viewport = Viewport::new(100, 50);
    let mut camera = PerspectiveCamera::for_viewport(viewport).unwrap();
    camera.look_at(Vec3::new(15.0, 15.0, 15.0), Vec3::ZERO);

    let grid = lines::grid_cube(8.0, 1.0);
    assert_eq!(visible_segments(&camera, &grid, viewport), grid.len());

    let cube = LineList::from_mesh_edges(&primitive::cube());
    assert_eq!(visible_segments(&camera, &cube, viewport), cube.len());
}

#[test]
fn orthographic_orbit_keeps_the_grid_cube_in_depth() {
    let mut camera = OrthoCamera::new(3.0).unwrap();
    let mut orbit = Orbit::new(3.0, 0.25);
    let cube = lines::grid_cube(8.0, 1.0);

    for frame in 0..60 {
        orbit.update(&mut camera, frame as f32 * 0.5, 16.0).unwrap();
        let mvp = camera.view_projection_matrix();
        for segment in cube.segments() {
            for p in [segment.start, segment.end] {
                let clip = mvp * nalgebra::Vector4::new(p.x, p.y, p.z, 1.0);
                let depth = clip.z / clip.w;
                assert!((-1.0..=1.0).contains(&depth), "{} at depth {}", p, depth);
            }
        }
    }
}
