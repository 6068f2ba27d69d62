//! Keyboard and pointer state for the window.
//!
//! [`Input`] separates instantaneous events (key went down this frame) from
//! continuous state (key held), which is what the shortcuts, the camera
//! orbit and the simulated hand each need.

use crate::drawing::pixel_to_ndc;
use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Per-frame input state.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    buttons_held: HashSet<MouseButton>,

    cursor: Vec2,
    cursor_ndc: Vec2,
    cursor_delta: Vec2,
    scroll_delta: f32,

    window_size: (u32, u32),
}

impl Input {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            ..Default::default()
        }
    }

    /// Key went down this frame. Auto-repeat does not count.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn button_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    /// Cursor position in window pixels.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor in NDC: origin at the window centre, Y up.
    pub fn cursor_ndc(&self) -> Vec2 {
        self.cursor_ndc
    }

    /// Cursor movement since the last frame, in pixels.
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    /// Wheel movement this frame, positive away from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Clear per-frame state. Call after the frame consumed it.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.refresh_ndc();
    }

    /// Drop held keys and buttons, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
        self.buttons_held.clear();
    }

    fn refresh_ndc(&mut self) {
        let (w, h) = self.window_size;
        if let Some(ndc) = pixel_to_ndc(self.cursor, w as f32, h as f32) {
            self.cursor_ndc = ndc;
        }
    }

    /// Fold a window event into the state.
    ///
    /// `pointer_captured` is true when the UI owns the pointer; button and
    /// wheel events are then ignored, cursor motion is still tracked.
    pub fn handle_event(&mut self, event: &WindowEvent, pointer_captured: bool) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => {
                        if self.keys_held.insert(key) {
                            self.keys_pressed.insert(key);
                        }
                    }
                    ElementState::Released => {
                        self.keys_held.remove(&key);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed if !pointer_captured => {
                    self.buttons_held.insert(*button);
                }
                ElementState::Pressed => {}
                ElementState::Released => {
                    self.buttons_held.remove(button);
                }
            },

            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                self.cursor_delta += pos - self.cursor;
                self.cursor = pos;
                self.refresh_ndc();
            }

            WindowEvent::MouseWheel { delta, .. } if !pointer_captured => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }

            WindowEvent::Focused(false) => self.release_all(),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_clears_but_held_remains() {
        let mut input = Input::new(800, 600);
        input.keys_held.insert(KeyCode::Space);
        input.keys_pressed.insert(KeyCode::Space);

        assert!(input.key_pressed(KeyCode::Space));
        input.end_frame();
        assert!(input.key_held(KeyCode::Space));
        assert!(!input.key_pressed(KeyCode::Space));
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            // SAFETY: the id is only compared, never passed to the platform.
            device_id: unsafe { winit::event::DeviceId::dummy() },
            state,
            button,
        }
    }

    #[test]
    fn test_button_held_until_release() {
        let mut input = Input::new(800, 600);
        input.handle_event(&mouse(ElementState::Pressed, MouseButton::Right), false);
        input.end_frame();
        assert!(input.button_held(MouseButton::Right));

        input.handle_event(&mouse(ElementState::Released, MouseButton::Right), false);
        assert!(!input.button_held(MouseButton::Right));
    }

    #[test]
    fn test_press_over_ui_is_ignored_but_release_is_not() {
        let mut input = Input::new(800, 600);
        input.handle_event(&mouse(ElementState::Pressed, MouseButton::Right), true);
        assert!(!input.button_held(MouseButton::Right));

        input.handle_event(&mouse(ElementState::Pressed, MouseButton::Right), false);
        input.handle_event(&mouse(ElementState::Released, MouseButton::Right), true);
        assert!(!input.button_held(MouseButton::Right));
    }

    #[test]
    fn test_cursor_ndc_follows_resize() {
        let mut input = Input::new(800, 600);
        input.cursor = Vec2::new(400.0, 300.0);
        input.refresh_ndc();
        assert!(input.cursor_ndc().length() < 1e-6);

        input.set_window_size(400, 300);
        assert!((input.cursor_ndc() - Vec2::new(1.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_zero_size_keeps_last_ndc() {
        let mut input = Input::new(100, 100);
        input.cursor = Vec2::new(100.0, 0.0);
        input.refresh_ndc();
        input.set_window_size(0, 0);
        assert_eq!(input.cursor_ndc(), Vec2::new(1.0, 1.0));
    }
}
