use prism_engine::mesh::{primitives, Mesh};
use prism_engine::render::{Color, RenderCtx, RenderTarget};
use prism_engine::shader::{PipelineState, Shader};
use prism_engine::texture::TextureKind;

use crate::config::DemoConfig;
use crate::harness::{Demo, FrameScene};

use super::CUBE_POSITIONS;

/// Degrees per second every box spins.
const SPIN_RATE: f32 = 20.0;

pub struct BoxesDemo {
    config: DemoConfig,
    resources: Option<Resources>,
}

struct Resources {
    shader: Shader,
    cube: Mesh,
}

impl BoxesDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config, resources: None }
    }
}

impl Resources {
    fn new(ctx: &RenderCtx<'_>, config: &DemoConfig) -> Self {
        let textures = vec![
            super::load_texture(ctx, config, "container.jpg", TextureKind::Diffuse),
            super::load_texture(ctx, config, "awesomeface.png", TextureKind::Diffuse),
        ];
        Self {
            shader: super::load_shader(config, "boxes", PipelineState::default()),
            cube: Mesh::new(ctx.device, primitives::cube(), textures),
        }
    }
}

impl Demo for BoxesDemo {
    fn clear_color(&self) -> Color {
        Color::rgb(0.2, 0.3, 0.3)
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene) {
        let res = self.resources.get_or_insert_with(|| Resources::new(ctx, &self.config));
        super::set_camera(&mut res.shader, scene);

        let mut pass = target.begin_pass("prism boxes");
        for i in 0..CUBE_POSITIONS.len() {
            res.shader.set_mat4("model", super::cube_transform(i, scene.time * SPIN_RATE));
            res.cube.draw(ctx, &mut pass, &mut res.shader);
        }
    }
}
