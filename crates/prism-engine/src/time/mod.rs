//! Time subsystem.
//!
//! One `FrameClock` per window; call `tick()` once per presented frame to
//! obtain the `FrameTime` that drives camera movement and animation.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
