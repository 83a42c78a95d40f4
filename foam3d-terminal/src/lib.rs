//! Terminal front end: renders the orbiting line-buffer scene as ASCII art
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use foam3d_core::{Camera, Mesh, Orbit, OrthoCamera, PerspectiveCamera, ProjectionMode, Vec3, Viewport};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;
pub mod scene;

pub use config::{ConfigError, ViewerConfig};
pub use renderer::AsciiRenderer;
pub use scene::Scene;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("terminal IO failed: {0}")]
    Io(#[from] io::Error),

    #[error("scene setup failed: {0}")]
    Scene(#[from] foam3d_core::Error),
}

/// Surface aspect corrected for tall terminal cells; `None` for an empty surface
fn cell_aspect(width: usize, height: usize) -> Option<f32> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(Viewport::new(width as u32, height as u32).aspect() / renderer::CELL_ASPECT)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    orbit: Orbit,
    perspective: PerspectiveCamera,
    ortho: OrthoCamera,
    mode: ProjectionMode,
    renderer: AsciiRenderer,
    target_fps: u32,
    running: bool,
    started: Instant,
    last_update: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &ViewerConfig, model: Option<Mesh>) -> Result<Self, AppError> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, model, width as usize, height as usize)
    }

    /// Build without querying the terminal
    pub fn with_size(
        config: &ViewerConfig,
        model: Option<Mesh>,
        width: usize,
        height: usize,
    ) -> Result<Self, AppError> {
        // an empty terminal still needs a usable camera until it is resized
        let viewport = Viewport::new(width.max(1) as u32, height.max(1) as u32);
        let aspect = viewport.aspect() / renderer::CELL_ASPECT;
        let mut perspective = PerspectiveCamera::for_viewport(viewport)?;
        perspective.set_aspect(aspect)?;
        let now = Instant::now();

        Ok(Self {
            scene: Scene::new(config, model)?,
            orbit: Orbit::new(config.zoom, config.orbit_speed),
            perspective,
            ortho: OrthoCamera::new(aspect)?,
            mode: config.projection.into(),
            renderer: AsciiRenderer::new(width, height),
            target_fps: config.target_fps.max(1),
            running: true,
            started: now,
            last_update: now,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn camera(&self) -> &dyn Camera {
        match self.mode {
            ProjectionMode::Perspective => &self.perspective,
            ProjectionMode::Orthographic => &self.ortho,
        }
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        log::info!("terminal viewer started in {:?} mode", self.mode);

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        log::info!("terminal viewer stopped");

        result
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_secs_f32(1.0 / self.target_fps as f32);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event)?;
            }

            // Update
            let now = Instant::now();
            let dt_ms = (now - self.last_update).as_secs_f32() * 1000.0;
            self.last_update = now;
            self.update((now - self.started).as_secs_f32(), dt_ms)?;

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) -> Result<(), AppError> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width as usize, height as usize)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.orbit.scroll(-1.0),
            KeyCode::Char('-') | KeyCode::Char('_') => self.orbit.scroll(1.0),
            KeyCode::Char('w') | KeyCode::Up => self.scene.rotate_model(0.1, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.scene.rotate_model(-0.1, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.scene.rotate_model(0.0, -0.1, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.scene.rotate_model(0.0, 0.1, 0.0),
            KeyCode::Char('p') => {
                self.mode = self.mode.toggled();
                log::info!("switched to {:?} projection", self.mode);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let x = mouse.column as f32 / self.renderer.width().max(1) as f32;
        let y = mouse.row as f32 / self.renderer.height().max(1) as f32;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                self.orbit.press(x, y)
            }
            MouseEventKind::Up(MouseButton::Left) => self.orbit.release(),
            MouseEventKind::ScrollUp => self.orbit.scroll(-1.0),
            MouseEventKind::ScrollDown => self.orbit.scroll(1.0),
            _ => {}
        }
    }

    /// Resize the cell buffers. A collapsed window keeps the camera aspects
    /// until it has a size again.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), AppError> {
        self.renderer.resize(width, height);
        let Some(aspect) = cell_aspect(width, height) else {
            log::debug!("ignoring aspect of empty {}x{} terminal", width, height);
            return Ok(());
        };
        self.perspective.set_aspect(aspect)?;
        self.ortho.set_aspect(aspect)?;
        Ok(())
    }

    /// Advance the orbit; the inactive camera mirrors the active one so a
    /// projection toggle does not jump
    pub fn update(&mut self, elapsed: f32, dt_ms: f32) -> Result<(), AppError> {
        let (active, inactive): (&mut dyn Camera, &mut dyn Camera) = match self.mode {
            ProjectionMode::Perspective => (&mut self.perspective, &mut self.ortho),
            ProjectionMode::Orthographic => (&mut self.ortho, &mut self.perspective),
        };
        self.orbit.update(&mut *active, elapsed, dt_ms)?;
        self.scene.advance(dt_ms / 1000.0);
        let eye = active.eye();
        inactive.look_at(eye, Vec3::ZERO);
        inactive.set_zoom(self.orbit.zoom())?;
        Ok(())
    }

    /// Rasterize the scene into the renderer without touching the terminal
    pub fn draw_frame(&mut self) {
        self.renderer.clear();
        let camera: &dyn Camera = match self.mode {
            ProjectionMode::Perspective => &self.perspective,
            ProjectionMode::Orthographic => &self.ortho,
        };
        self.scene.draw(&mut self.renderer, camera);
    }

    fn render(&mut self) -> io::Result<()> {
        self.draw_frame();

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Foam3D | FPS: {:.1} | {:?} | zoom {:.2} | Drag=Orbit +/-=Zoom P=Projection Q=Quit",
                self.fps,
                self.mode,
                self.orbit.zoom()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
