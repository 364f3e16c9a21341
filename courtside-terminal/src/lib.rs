/// Terminal front-end: draws a courtside scene with an ASCII rasterizer
use std::cell::RefCell;
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use courtside_core::render::{self, ShaderHandle, SharedRasterizer};
use courtside_core::{LoadError, Scene, SceneConfig};
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use thiserror::Error;
use tracing::{debug, info};

pub mod input;
pub mod renderer;

pub use input::InputState;
pub use renderer::AsciiRasterizer;

/// The ASCII rasterizer has a single fixed program
const SHADER: ShaderHandle = ShaderHandle(0);

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    rasterizer: Rc<RefCell<AsciiRasterizer>>,
    context: SharedRasterizer,
    input: InputState,
    running: bool,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &SceneConfig) -> Result<Self, AppError> {
        Self::with_scene(|context| Scene::from_config(context, config))
    }

    /// Build the scene against this app's rasterizer.
    pub fn with_scene(
        build: impl FnOnce(&SharedRasterizer) -> Result<Scene, LoadError>,
    ) -> Result<Self, AppError> {
        let (width, height) = terminal::size()?;
        let (rasterizer, context) =
            render::share(AsciiRasterizer::new(width as usize, height as usize));
        let mut scene = build(&context)?;
        scene.camera = scene.camera.resized(aspect(width, height));

        Ok(Self {
            scene,
            rasterizer,
            context,
            input: InputState::new(),
            running: true,
            last_tick: Instant::now(),
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();
        keep_first_error(result, restore_terminal())
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        info!("frame loop started");

        while self.running {
            let frame_start = Instant::now();
            let dt = (frame_start - self.last_tick).as_secs_f32();
            self.last_tick = frame_start;

            self.poll_input()?;
            self.update(dt);
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
                debug!(fps = self.fps, "frame rate");
            }
        }

        info!("frame loop stopped");
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            self.input.handle_event(&event::read()?);
        }
        Ok(())
    }

    /// Input, then animation, in that order.
    fn update(&mut self, dt: f32) {
        if self.input.quit_requested() {
            self.running = false;
        }

        if let Some((width, height)) = self.input.take_resize() {
            self.rasterizer.borrow_mut().resize(width as usize, height as usize);
            self.scene.camera = self.scene.camera.resized(aspect(width, height));
        }

        for movement in self.input.camera_movements() {
            self.scene.camera.process_keyboard(movement, dt);
        }
        if let Some((dx, dy)) = self.input.mouse_delta() {
            self.scene.camera.process_mouse_movement(dx, dy, true);
        }
        self.scene.process_player_input(&self.input.player_input(), dt);
        if self.input.reset_requested() {
            self.scene.reset();
        }
        self.input.end_frame();

        self.scene.update(dt);
    }

    fn render(&mut self) -> io::Result<()> {
        self.rasterizer.borrow_mut().clear();
        self.scene.draw(&self.context, SHADER);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.rasterizer.borrow().present(&mut stdout)?;

        // Draw UI overlay
        let camera = &self.scene.camera;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Courtside | FPS: {:.1} | Camera ({:.1}, {:.1}, {:.1}) | WASD+drag=Camera Arrows/R/F/J/L=Player Space=Reset Q=Quit",
                self.fps, camera.position.x, camera.position.y, camera.position.z
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}

/// Leave raw mode first so a failing escape sequence cannot strand the terminal.
fn restore_terminal() -> io::Result<()> {
    let raw = terminal::disable_raw_mode();
    let screen = execute!(
        stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    raw.and(screen)
}

/// A frame loop error takes precedence over a cleanup error.
fn keep_first_error(result: Result<(), AppError>, cleanup: io::Result<()>) -> Result<(), AppError> {
    result?;
    cleanup.map_err(AppError::from)
}

fn aspect(width: u16, height: u16) -> f32 {
    width.max(1) as f32 / height.max(1) as f32 * CELL_ASPECT
}
