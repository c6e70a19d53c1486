//! Fly camera.
//!
//! `Camera` is plain state plus the three input operations (keyboard, mouse
//! movement, scroll). `CameraController` is the per-run context object that
//! feeds it from the frame's input.

mod fly;
mod controller;

pub use fly::{Camera, CameraMovement, PITCH_LIMIT, ZOOM_MAX, ZOOM_MIN};
pub use controller::{CameraController, KeyBindings};
