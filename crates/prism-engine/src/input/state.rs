use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Logical pixels per wheel line when converting high-precision scroll deltas.
pub const PIXELS_PER_LINE: f32 = 24.0;

/// Current input state for a single window.
///
/// Holds "is down" information and current pointer position.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels. `None` until the first move inside
    /// the window, and again after the pointer leaves.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoids stuck keys/buttons when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                    self.pointer_pos = None;
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                if let Some((px, py)) = self.pointer_pos {
                    frame.pointer_delta.0 += x - px;
                    frame.pointer_delta.1 += y - py;
                }
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::RawMotion { dx, dy } => {
                frame.raw_motion.0 += dx;
                frame.raw_motion.1 += dy;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                modifiers,
            }) => {
                self.modifiers = *modifiers;

                match state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    MouseButtonState::Released => {
                        if self.buttons_down.remove(button) {
                            frame.buttons_released.insert(*button);
                        }
                    }
                }
            }

            InputEvent::MouseWheel { delta, modifiers } => {
                self.modifiers = *modifiers;
                let (x, y) = match *delta {
                    MouseWheelDelta::Line { x, y } => (x, y),
                    MouseWheelDelta::Pixel { x, y } => (x / PIXELS_PER_LINE, y / PIXELS_PER_LINE),
                };
                frame.scroll.0 += x;
                frame.scroll.1 += y;
            }
        }

        frame.push_event(ev);
    }

    /// Helper queries
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat: false }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn press_then_release_records_both_transitions() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        assert!(state.key_down(Key::W));
        assert!(frame.key_pressed(Key::W));

        state.apply_event(&mut frame, key(Key::W, KeyState::Released));
        assert!(!state.key_down(Key::W));
        assert!(frame.keys_released.contains(&Key::W));
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn repeated_press_is_not_a_new_transition() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::A, KeyState::Pressed));
        frame.clear();
        state.apply_event(&mut frame, key(Key::A, KeyState::Pressed));
        assert!(state.key_down(Key::A));
        assert!(!frame.key_pressed(Key::A));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::S, KeyState::Pressed));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn first_pointer_move_produces_no_delta() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, moved(400.0, 300.0));
        assert_eq!(frame.pointer_delta, (0.0, 0.0));
        assert_eq!(state.pointer_pos, Some((400.0, 300.0)));
    }

    #[test]
    fn pointer_deltas_accumulate_within_a_frame() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, moved(10.0, 10.0));
        state.apply_event(&mut frame, moved(15.0, 8.0));
        state.apply_event(&mut frame, moved(20.0, 4.0));
        assert_eq!(frame.pointer_delta, (10.0, -6.0));
    }

    #[test]
    fn reentering_window_suppresses_the_jump() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, moved(10.0, 10.0));
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        state.apply_event(&mut frame, moved(500.0, 500.0));
        assert_eq!(frame.pointer_delta, (0.0, 0.0));
    }

    #[test]
    fn raw_motion_accumulates() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::RawMotion { dx: 2.0, dy: -1.0 });
        state.apply_event(&mut frame, InputEvent::RawMotion { dx: 3.0, dy: -1.0 });
        assert_eq!(frame.raw_motion, (5.0, -2.0));
        frame.clear();
        assert_eq!(frame.raw_motion, (0.0, 0.0));
    }

    // ── wheel ─────────────────────────────────────────────────────────────

    #[test]
    fn pixel_scroll_is_converted_to_lines() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel {
                delta: MouseWheelDelta::Pixel { x: 0.0, y: PIXELS_PER_LINE * 2.0 },
                modifiers: Modifiers::default(),
            },
        );
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 },
                modifiers: Modifiers::default(),
            },
        );
        assert_eq!(frame.scroll, (0.0, 3.0));
    }

    // ── buttons ───────────────────────────────────────────────────────────

    #[test]
    fn button_state_tracks_press_and_release() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let press = InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Right,
            state: MouseButtonState::Pressed,
            modifiers: Modifiers::default(),
        });
        state.apply_event(&mut frame, press);
        assert!(state.button_down(MouseButton::Right));
        assert!(frame.buttons_pressed.contains(&MouseButton::Right));
    }
}
