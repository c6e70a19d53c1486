use glam::{Mat4, Vec3, Vec4};

use prism_engine::mesh::{primitives, Mesh};
use prism_engine::render::{Color, RenderCtx, RenderTarget};
use prism_engine::shader::{PipelineState, Shader, StencilMode};
use prism_engine::texture::TextureKind;

use crate::config::DemoConfig;
use crate::harness::{Demo, FrameScene};

const CUBES: [Vec3; 2] = [Vec3::new(-1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 0.0)];
const OUTLINE_SCALE: f32 = 1.1;
const OUTLINE_COLOR: Vec4 = Vec4::new(0.04, 0.28, 0.26, 1.0);
const MARK: u32 = 1;

pub struct OutlineDemo {
    config: DemoConfig,
    resources: Option<Resources>,
}

struct Resources {
    floor_shader: Shader,
    /// Textured pass that marks covered pixels in the stencil buffer.
    cube_shader: Shader,
    /// Flat color wherever the stencil is unmarked, ignoring depth.
    outline_shader: Shader,
    cube: Mesh,
    floor: Mesh,
}

impl OutlineDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config, resources: None }
    }
}

impl Resources {
    fn new(ctx: &RenderCtx<'_>, config: &DemoConfig) -> Self {
        let marble = super::load_texture(ctx, config, "marble.jpg", TextureKind::Diffuse);
        let metal = super::load_texture(ctx, config, "metal.png", TextureKind::Diffuse);

        let mut outline_shader = super::load_shader(
            config,
            "single_color",
            PipelineState::default()
                .with_stencil(StencilMode::NotEqual { reference: MARK })
                .without_depth_test(),
        );
        outline_shader.set_vec4("color", OUTLINE_COLOR);

        Self {
            floor_shader: super::load_shader(config, "textured", PipelineState::default()),
            cube_shader: super::load_shader(
                config,
                "textured",
                PipelineState::default().with_stencil(StencilMode::Write { reference: MARK }),
            ),
            outline_shader,
            cube: Mesh::new(ctx.device, primitives::cube(), vec![marble]),
            floor: Mesh::new(ctx.device, primitives::plane(5.0, -0.5, 2.0), vec![metal]),
        }
    }
}

impl Demo for OutlineDemo {
    fn clear_color(&self) -> Color {
        Color::rgb(0.1, 0.1, 0.1)
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene) {
        let res = self.resources.get_or_insert_with(|| Resources::new(ctx, &self.config));
        for shader in [&mut res.floor_shader, &mut res.cube_shader, &mut res.outline_shader] {
            super::set_camera(shader, scene);
        }

        let mut pass = target.begin_pass("prism outline");

        res.floor_shader.set_mat4("model", Mat4::IDENTITY);
        res.floor.draw(ctx, &mut pass, &mut res.floor_shader);

        for position in CUBES {
            res.cube_shader.set_mat4("model", Mat4::from_translation(position));
            res.cube.draw(ctx, &mut pass, &mut res.cube_shader);
        }

        for position in CUBES {
            let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(OUTLINE_SCALE));
            res.outline_shader.set_mat4("model", model);
            res.cube.draw(ctx, &mut pass, &mut res.outline_shader);
        }
    }
}
