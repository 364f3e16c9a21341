/// Per-frame input state gathered from terminal events
use std::collections::HashSet;

use courtside_core::{CameraMovement, PlayerInput};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Degrees of mouse offset per terminal cell dragged, before camera sensitivity
const CELL_TO_MOUSE_UNITS: f32 = 10.0;

/// Keys and mouse motion seen since the last frame.
///
/// Terminals report presses and auto-repeats, not releases, so a key counts
/// as held for the frame in which it was reported.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    drag_origin: Option<(u16, u16)>,
    mouse_delta: (f32, f32),
    quit: bool,
    reset: bool,
    resized: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resized = Some((*width, *height)),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Char(' ') => self.reset = true,
            code => {
                self.keys.insert(code);
            }
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let position = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.drag_origin = Some(position),
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((column, row)) = self.drag_origin {
                    let dx = f32::from(position.0) - f32::from(column);
                    // screen rows grow downwards, pitch grows upwards
                    let dy = f32::from(row) - f32::from(position.1);
                    self.mouse_delta.0 += dx * CELL_TO_MOUSE_UNITS;
                    self.mouse_delta.1 += dy * CELL_TO_MOUSE_UNITS;
                }
                self.drag_origin = Some(position);
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_origin = None,
            _ => {}
        }
    }

    fn held(&self, c: char) -> bool {
        self.keys.contains(&KeyCode::Char(c))
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn reset_requested(&self) -> bool {
        self.reset
    }

    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resized.take()
    }

    /// W/A/S/D
    pub fn camera_movements(&self) -> Vec<CameraMovement> {
        [
            ('w', CameraMovement::Forward),
            ('s', CameraMovement::Backward),
            ('a', CameraMovement::Left),
            ('d', CameraMovement::Right),
        ]
        .into_iter()
        .filter(|(key, _)| self.held(*key))
        .map(|(_, movement)| movement)
        .collect()
    }

    /// Accumulated drag offset, if the mouse moved this frame.
    pub fn mouse_delta(&self) -> Option<(f32, f32)> {
        (self.mouse_delta != (0.0, 0.0)).then_some(self.mouse_delta)
    }

    /// Arrows move, R/F raise and lower, J/L turn.
    pub fn player_input(&self) -> PlayerInput {
        PlayerInput {
            forward: self.keys.contains(&KeyCode::Up),
            backward: self.keys.contains(&KeyCode::Down),
            left: self.keys.contains(&KeyCode::Left),
            right: self.keys.contains(&KeyCode::Right),
            up: self.held('r'),
            down: self.held('f'),
            turn_left: self.held('j'),
            turn_right: self.held('l'),
        }
    }

    /// Forget everything but an ongoing drag.
    pub fn end_frame(&mut self) {
        self.keys.clear();
        self.mouse_delta = (0.0, 0.0);
        self.reset = false;
    }
}
