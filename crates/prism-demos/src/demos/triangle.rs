use glam::Vec4;

use prism_engine::mesh::{primitives, Mesh};
use prism_engine::render::{Color, RenderCtx, RenderTarget};
use prism_engine::shader::{PipelineState, Shader};

use crate::config::DemoConfig;
use crate::harness::{Demo, FrameScene};

pub struct TriangleDemo {
    config: DemoConfig,
    resources: Option<Resources>,
}

struct Resources {
    shader: Shader,
    triangle: Mesh,
}

impl TriangleDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config, resources: None }
    }
}

impl Resources {
    fn new(ctx: &RenderCtx<'_>, config: &DemoConfig) -> Self {
        Self {
            shader: super::load_shader(config, "triangle", PipelineState::default()),
            triangle: Mesh::new(ctx.device, primitives::triangle(), Vec::new()),
        }
    }
}

impl Demo for TriangleDemo {
    fn clear_color(&self) -> Color {
        Color::rgb(0.2, 0.3, 0.3)
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene) {
        let res = self.resources.get_or_insert_with(|| Resources::new(ctx, &self.config));

        let green = scene.time.sin() * 0.5 + 0.5;
        res.shader.set_vec4("color", Vec4::new(0.0, green, 0.0, 1.0));

        let mut pass = target.begin_pass("prism triangle");
        res.triangle.draw(ctx, &mut pass, &mut res.shader);
    }
}
