use glam::Mat4;

use prism_engine::mesh::{primitives, Mesh};
use prism_engine::model::Model;
use prism_engine::render::{Color, RenderCtx, RenderTarget};
use prism_engine::shader::{PipelineState, Shader};

use crate::config::DemoConfig;
use crate::harness::{Demo, FrameScene};

use super::rig;

pub struct ModelDemo {
    config: DemoConfig,
    resources: Option<Resources>,
}

struct Resources {
    shader: Shader,
    lamp_shader: Shader,
    model: Model,
    lamp: Mesh,
}

impl ModelDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config, resources: None }
    }
}

impl Resources {
    fn new(ctx: &RenderCtx<'_>, config: &DemoConfig) -> Self {
        let model = Model::load(ctx.device, ctx.queue, &config.model);
        if model.meshes().is_empty() {
            log::warn!("model {} has nothing to draw", config.model.display());
        }

        let mut shader = super::load_shader(config, "lighting", PipelineState::default());
        rig::configure(&mut shader);

        Self {
            shader,
            lamp_shader: super::load_shader(config, "lamp", PipelineState::default()),
            model,
            lamp: Mesh::new(ctx.device, primitives::cube(), Vec::new()),
        }
    }
}

impl Demo for ModelDemo {
    fn clear_color(&self) -> Color {
        Color::rgb(0.1, 0.1, 0.1)
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene) {
        let res = self.resources.get_or_insert_with(|| Resources::new(ctx, &self.config));
        rig::update(&mut res.shader, scene);
        res.shader.set_mat4("model", Mat4::IDENTITY);

        let mut pass = target.begin_pass("prism model");
        res.model.draw(ctx, &mut pass, &mut res.shader);
        rig::draw_lamps(ctx, &mut pass, &mut res.lamp, &mut res.lamp_shader, scene);
    }
}
