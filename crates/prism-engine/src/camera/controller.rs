use crate::input::{InputFrame, InputState, Key, MouseButton};

use super::fly::{Camera, CameraMovement};

/// Keys driving each camera movement.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyBindings {
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            backward: Key::S,
            left: Key::A,
            right: Key::D,
            up: Key::E,
            down: Key::Q,
        }
    }
}

impl KeyBindings {
    fn pairs(&self) -> [(Key, CameraMovement); 6] {
        [
            (self.forward, CameraMovement::Forward),
            (self.backward, CameraMovement::Backward),
            (self.left, CameraMovement::Left),
            (self.right, CameraMovement::Right),
            (self.up, CameraMovement::Up),
            (self.down, CameraMovement::Down),
        ]
    }
}

/// Feeds one frame of input into a [`Camera`].
///
/// Held keys move the camera scaled by the frame's `dt`. Mouse look is active
/// while the cursor is captured, or while `look_button` is held otherwise.
/// Window Y grows downward, so vertical motion is negated before it reaches
/// the camera.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub camera: Camera,
    pub bindings: KeyBindings,
    pub look_button: Option<MouseButton>,
    pub constrain_pitch: bool,
}

impl CameraController {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            bindings: KeyBindings::default(),
            look_button: Some(MouseButton::Right),
            constrain_pitch: true,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Applies held keys, pointer motion and wheel scroll for one frame.
    pub fn update(&mut self, input: &InputState, frame: &InputFrame, dt: f32, cursor_captured: bool) {
        for (key, movement) in self.bindings.pairs() {
            if input.key_down(key) {
                self.camera.process_keyboard(movement, dt);
            }
        }

        let (dx, dy) = self.look_delta(input, frame, cursor_captured);
        if dx != 0.0 || dy != 0.0 {
            self.camera.process_mouse_movement(dx, -dy, self.constrain_pitch);
        }

        if frame.scroll.1 != 0.0 {
            self.camera.process_mouse_scroll(frame.scroll.1);
        }
    }

    /// Pointer motion for this frame in window orientation (+Y down).
    fn look_delta(&self, input: &InputState, frame: &InputFrame, cursor_captured: bool) -> (f32, f32) {
        if cursor_captured {
            // Locked cursors stop producing positions on most platforms.
            if frame.raw_motion != (0.0, 0.0) {
                return frame.raw_motion;
            }
            return frame.pointer_delta;
        }

        match self.look_button {
            Some(button) if input.button_down(button) => frame.pointer_delta,
            _ => (0.0, 0.0),
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}
