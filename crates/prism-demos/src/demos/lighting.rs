use prism_engine::mesh::{primitives, Mesh};
use prism_engine::render::{Color, RenderCtx, RenderTarget};
use prism_engine::shader::{PipelineState, Shader};
use prism_engine::texture::TextureKind;

use crate::config::DemoConfig;
use crate::harness::{Demo, FrameScene};

use super::{rig, CUBE_POSITIONS};

pub struct LightingDemo {
    config: DemoConfig,
    resources: Option<Resources>,
}

struct Resources {
    shader: Shader,
    lamp_shader: Shader,
    cube: Mesh,
    lamp: Mesh,
}

impl LightingDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config, resources: None }
    }
}

impl Resources {
    fn new(ctx: &RenderCtx<'_>, config: &DemoConfig) -> Self {
        let textures = vec![
            super::load_texture(ctx, config, "container2.png", TextureKind::Diffuse),
            super::load_texture(ctx, config, "container2_specular.png", TextureKind::Specular),
        ];

        let mut shader = super::load_shader(config, "lighting", PipelineState::default());
        rig::configure(&mut shader);

        Self {
            shader,
            lamp_shader: super::load_shader(config, "lamp", PipelineState::default()),
            cube: Mesh::new(ctx.device, primitives::cube(), textures),
            lamp: Mesh::new(ctx.device, primitives::cube(), Vec::new()),
        }
    }
}

impl Demo for LightingDemo {
    fn clear_color(&self) -> Color {
        Color::rgb(0.1, 0.1, 0.1)
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene) {
        let res = self.resources.get_or_insert_with(|| Resources::new(ctx, &self.config));
        rig::update(&mut res.shader, scene);

        let mut pass = target.begin_pass("prism lighting");
        for i in 0..CUBE_POSITIONS.len() {
            res.shader.set_mat4("model", super::cube_transform(i, 0.0));
            res.cube.draw(ctx, &mut pass, &mut res.shader);
        }

        rig::draw_lamps(ctx, &mut pass, &mut res.lamp, &mut res.lamp_shader, scene);
    }
}
