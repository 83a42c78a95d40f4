//! Foam3D Web - WASM bindings for the orbiting line-buffer scene
//!
//! The page owns the WebGL context. This crate drives the camera and hands
//! out matrices and vertex arrays ready for `bufferData`/`uniformMatrix4fv`.

use foam3d_core::lines::{self, LineList};
use foam3d_core::math::glu;
use foam3d_core::{
    Camera, LineBuffer3d, Orbit, OrthoCamera, PerspectiveCamera, ProjectionMode, Vec3, Viewport,
};
use wasm_bindgen::prelude::*;

const DEMO_POINTS: [f32; 15] = [
    -2.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0,
];
const TUBE_SEGMENTS: usize = 16;
const TUBE_RADIUS: f32 = 0.25;
const INITIAL_ZOOM: f32 = 3.0;
const ORBIT_SPEED: f32 = 0.25;
const GRID_SIZE: f32 = 8.0;
const GRID_STEP: f32 = 1.0;
const FLOOR_OFFSET: f32 = -0.01;
const AXES_LENGTH: f32 = 4.0;
const LIGHT_POSITION: Vec3 = Vec3::ONE;
const LIGHT_MARKER_RADIUS: f32 = 0.075;

/// Camera rig and geometry, independent of the JS boundary
struct SceneState {
    viewport: Viewport,
    perspective: PerspectiveCamera,
    ortho: OrthoCamera,
    mode: ProjectionMode,
    orbit: Orbit,
    tube: LineBuffer3d,
}

impl SceneState {
    fn new(width: u32, height: u32) -> foam3d_core::Result<Self> {
        let viewport = Viewport::new(width, height);
        let mut tube = LineBuffer3d::from_flat(&DEMO_POINTS, TUBE_SEGMENTS, TUBE_RADIUS)?;
        tube.update_vertex_normals();
        log::info!("web scene created at {}x{}", width, height);
        let sized = Viewport::new(width.max(1), height.max(1));
        Ok(Self {
            viewport,
            perspective: PerspectiveCamera::for_viewport(sized)?,
            ortho: OrthoCamera::new(sized.aspect())?,
            mode: ProjectionMode::Perspective,
            orbit: Orbit::new(INITIAL_ZOOM, ORBIT_SPEED),
            tube,
        })
    }

    fn camera(&self) -> &dyn Camera {
        match self.mode {
            ProjectionMode::Perspective => &self.perspective,
            ProjectionMode::Orthographic => &self.ortho,
        }
    }

    /// A collapsed canvas keeps the last usable aspect
    fn resize(&mut self, width: u32, height: u32) -> foam3d_core::Result<()> {
        self.viewport = Viewport::new(width, height);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let aspect = self.viewport.aspect();
        self.perspective.set_aspect(aspect)?;
        self.ortho.set_aspect(aspect)
    }

    fn update(&mut self, elapsed_secs: f32, dt_ms: f32) -> foam3d_core::Result<()> {
        let (active, inactive): (&mut dyn Camera, &mut dyn Camera) = match self.mode {
            ProjectionMode::Perspective => (&mut self.perspective, &mut self.ortho),
            ProjectionMode::Orthographic => (&mut self.ortho, &mut self.perspective),
        };
        self.orbit.update(&mut *active, elapsed_secs, dt_ms)?;
        inactive.look_at(active.eye(), Vec3::ZERO);
        inactive.set_zoom(self.orbit.zoom())
    }

    /// Pointer position in surface pixels
    fn set_pointer(&mut self, x: f32, y: f32) {
        let w = self.viewport.width.max(1) as f32;
        let h = self.viewport.height.max(1) as f32;
        self.orbit.press(x / w, y / h);
    }
}

/// Scene handle exported to JavaScript
#[wasm_bindgen]
pub struct WebScene {
    state: SceneState,
}

fn to_js(err: foam3d_core::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl WebScene {
    /// Create a scene for a canvas of the given size
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<WebScene, JsValue> {
        Ok(WebScene {
            state: SceneState::new(width, height).map_err(to_js)?,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.state.resize(width, height).map_err(to_js)
    }

    /// Advance the orbit by one frame
    pub fn update(&mut self, elapsed_secs: f32, dt_ms: f32) -> Result<(), JsValue> {
        self.state.update(elapsed_secs, dt_ms).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setPointer)]
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.state.set_pointer(x, y);
    }

    #[wasm_bindgen(js_name = releasePointer)]
    pub fn release_pointer(&mut self) {
        self.state.orbit.release();
    }

    /// Wheel steps; positive moves away from the origin
    pub fn scroll(&mut self, delta: f32) {
        self.state.orbit.scroll(delta);
    }

    #[wasm_bindgen(js_name = toggleProjection)]
    pub fn toggle_projection(&mut self) -> bool {
        self.state.mode = self.state.mode.toggled();
        self.state.mode == ProjectionMode::Orthographic
    }

    #[wasm_bindgen(js_name = viewMatrix)]
    pub fn view_matrix(&self) -> Vec<f32> {
        glu::to_gl_array(&self.state.camera().view_matrix()).to_vec()
    }

    #[wasm_bindgen(js_name = projectionMatrix)]
    pub fn projection_matrix(&self) -> Vec<f32> {
        glu::to_gl_array(&self.state.camera().projection_matrix()).to_vec()
    }

    pub fn eye(&self) -> Vec<f32> {
        self.state.camera().eye().to_array().to_vec()
    }

    #[wasm_bindgen(js_name = linePositions)]
    pub fn line_positions(&self) -> Vec<f32> {
        self.state.tube.mesh().flattened_vertices()
    }

    #[wasm_bindgen(js_name = lineNormals)]
    pub fn line_normals(&self) -> Vec<f32> {
        self.state.tube.mesh().flattened_normals()
    }

    #[wasm_bindgen(js_name = lineIndices)]
    pub fn line_indices(&self) -> Vec<u32> {
        self.state.tube.mesh().indices.clone()
    }

    /// Floor grid as `gl.LINES` pairs, nudged below the grid cube
    #[wasm_bindgen(js_name = gridPositions)]
    pub fn grid_positions(&self) -> Vec<f32> {
        let shift = nalgebra::Matrix4::new_translation(&nalgebra::Vector3::new(0.0, FLOOR_OFFSET, 0.0));
        lines::grid(GRID_SIZE, GRID_STEP).transformed(&shift).flattened()
    }

    #[wasm_bindgen(js_name = gridCubePositions)]
    pub fn grid_cube_positions(&self) -> Vec<f32> {
        lines::grid_cube(GRID_SIZE, GRID_STEP).flattened()
    }

    /// X, Y and Z axis lines, one pair each
    #[wasm_bindgen(js_name = axesPositions)]
    pub fn axes_positions(&self) -> Vec<f32> {
        let mut all = LineList::new();
        for axis in lines::axes(AXES_LENGTH) {
            all.extend(&axis);
        }
        all.flattened()
    }

    #[wasm_bindgen(js_name = lightPositions)]
    pub fn light_positions(&self) -> Vec<f32> {
        let light: nalgebra::Vector3<f32> = LIGHT_POSITION.into();
        let shift = nalgebra::Matrix4::new_translation(&light);
        lines::octahedron(LIGHT_MARKER_RADIUS).transformed(&shift).flattened()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl WebScene {
    /// Create a scene sized to the browser window
    #[wasm_bindgen(js_name = forWindow)]
    pub fn for_window() -> Result<WebScene, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let width = window.inner_width()?.as_f64().unwrap_or(1.0);
        let height = window.inner_height()?.as_f64().unwrap_or(1.0);
        Self::new(width as u32, height as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_buffers() {
        let scene = WebScene::new(800, 600).unwrap();
        assert_eq!(scene.line_positions().len(), 5 * 16 * 3);
        assert_eq!(scene.line_normals().len(), 5 * 16 * 3);
        assert_eq!(scene.line_indices().len(), 4 * 16 * 6);
        assert_eq!(scene.grid_positions().len(), 18 * 6);
        assert_eq!(scene.axes_positions().len(), 3 * 6);
        assert_eq!(scene.light_positions().len(), 12 * 6);
        assert!(scene.grid_positions().chunks(3).all(|p| p[1] == FLOOR_OFFSET));
    }

    #[test]
    fn test_hidden_canvas_still_builds() {
        let mut scene = WebScene::new(0, 0).unwrap();
        scene.update(0.0, 16.0).unwrap();
        scene.set_pointer(10.0, 10.0);
        scene.update(0.1, 16.0).unwrap();
        assert_eq!(scene.projection_matrix().len(), 16);
    }

    #[test]
    fn test_update_orbits_and_matrices_change() {
        let mut scene = WebScene::new(800, 600).unwrap();
        scene.update(0.0, 16.0).unwrap();
        let eye = scene.eye();
        assert!((eye[0] - 3.0).abs() < 1e-5 && (eye[1] - 3.0).abs() < 1e-5);
        let view = scene.view_matrix();
        assert_eq!(view.len(), 16);

        scene.update(1.0, 16.0).unwrap();
        assert_ne!(view, scene.view_matrix());
    }

    #[test]
    fn test_pointer_in_pixels() {
        let mut scene = WebScene::new(800, 600).unwrap();
        scene.set_pointer(400.0, 300.0);
        scene.update(0.0, 16.0).unwrap();
        let eye = scene.eye();
        assert!((eye[0] - 3.0).abs() < 1e-4 && eye[1].abs() < 1e-4);
        scene.release_pointer();
    }

    #[test]
    fn test_projection_toggle_and_resize() {
        let mut scene = WebScene::new(800, 600).unwrap();
        let perspective = scene.projection_matrix();
        assert!(scene.toggle_projection());
        scene.update(0.0, 16.0).unwrap();
        let ortho = scene.projection_matrix();
        // orthographic keeps w = 1
        assert_eq!(ortho[15], 1.0);
        assert_eq!(perspective[15], 0.0);

        let before = scene.projection_matrix();
        scene.resize(0, 600).unwrap();
        assert_eq!(before, scene.projection_matrix());

        scene.resize(400, 400).unwrap();
        assert_ne!(ortho, scene.projection_matrix());
        assert!(!scene.toggle_projection());
    }
}
