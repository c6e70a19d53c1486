use glam::{Mat4, Vec3};

use prism_engine::camera::{Camera, CameraController};
use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::input::Key;
use prism_engine::render::{Color, RenderCtx, RenderTarget};

/// Clip planes shared by every demo.
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

/// Camera-derived values for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameScene {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
    /// Seconds since the window opened.
    pub time: f32,
}

impl FrameScene {
    pub fn new(camera: &Camera, aspect: f32, time: f32) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect, NEAR, FAR),
            camera_position: camera.position(),
            camera_front: camera.front(),
            time,
        }
    }
}

/// One demo scene. GPU resources are created on the first `draw`.
pub trait Demo {
    fn clear_color(&self) -> Color;

    /// Where the camera starts.
    fn camera(&self) -> Camera {
        Camera::default()
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene);
}

/// Runs a [`Demo`] with a fly camera.
///
/// Escape quits; Tab toggles cursor capture.
pub struct DemoApp {
    demo: Box<dyn Demo>,
    controller: CameraController,
}

impl DemoApp {
    pub fn new(demo: Box<dyn Demo>) -> Self {
        let controller = CameraController::new(demo.camera());
        Self { demo, controller }
    }
}

impl App for DemoApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            log::info!("escape pressed; closing");
            return AppControl::Exit;
        }
        if ctx.input_frame.key_pressed(Key::Tab) {
            ctx.runtime.capture_cursor(!ctx.cursor_captured);
        }

        self.controller
            .update(ctx.input, ctx.input_frame, ctx.time.dt, ctx.cursor_captured);

        let scene = FrameScene::new(self.controller.camera(), ctx.viewport().aspect(), ctx.time.elapsed);
        let demo = &mut self.demo;
        ctx.render(demo.clear_color(), |rctx, target| demo.draw(rctx, target, &scene))
    }
}
