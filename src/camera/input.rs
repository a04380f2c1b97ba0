use glam::Vec2;

use super::controller::OrbitCamera;
use crate::input::{InputEvent, MouseButton};

/// Routes pointer events that the selection gesture did not consume to the
/// orbit camera: left-drag orbits, shift + left-drag pans.
pub struct CameraInput {
    last_mouse_pos: Option<Vec2>,
    mouse_pressed: bool,
    shift_pressed: bool,
}

impl Default for CameraInput {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraInput {
    /// New handler with no button held.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_mouse_pos: None,
            mouse_pressed: false,
            shift_pressed: false,
        }
    }

    /// Returns true if the event moved the camera.
    pub fn handle_event(
        &mut self,
        controller: &mut OrbitCamera,
        event: &InputEvent,
    ) -> bool {
        match event {
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => {
                self.mouse_pressed = *pressed;
                false
            }
            InputEvent::ModifiersChanged(modifiers) => {
                self.shift_pressed = modifiers.shift;
                false
            }
            InputEvent::CursorMoved { x, y } => {
                let current_pos = Vec2::new(*x, *y);
                let delta = self
                    .last_mouse_pos
                    .map_or(Vec2::ZERO, |last| current_pos - last);
                self.last_mouse_pos = Some(current_pos);

                if !self.mouse_pressed || !controller.is_enabled() {
                    return false;
                }
                if self.shift_pressed {
                    controller.pan(delta);
                } else {
                    controller.rotate(delta);
                }
                true
            }
            InputEvent::MouseButton { .. } | InputEvent::KeyPressed { .. } => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::camera::CameraControls;
    use crate::options::CameraOptions;

    #[test]
    fn drag_orbits_only_while_enabled() {
        let mut cam =
            OrbitCamera::new(Vec3::ZERO, 100.0, 1.0, &CameraOptions::default());
        let mut input = CameraInput::new();
        let press = InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        };
        let origin = InputEvent::CursorMoved { x: 0.0, y: 0.0 };
        let _ = input.handle_event(&mut cam, &origin);
        let _ = input.handle_event(&mut cam, &press);

        cam.set_enabled(false);
        let before = cam.projection_view();
        assert!(!input.handle_event(
            &mut cam,
            &InputEvent::CursorMoved { x: 30.0, y: 0.0 }
        ));
        assert_eq!(cam.projection_view(), before);

        cam.set_enabled(true);
        assert!(input.handle_event(
            &mut cam,
            &InputEvent::CursorMoved { x: 60.0, y: 0.0 }
        ));
        assert_ne!(cam.projection_view(), before);
    }
}
