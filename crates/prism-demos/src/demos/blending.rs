use glam::{Mat4, Vec3};

use prism_engine::mesh::{primitives, Mesh};
use prism_engine::render::{Color, RenderCtx, RenderTarget};
use prism_engine::shader::{BlendMode, PipelineState, Shader};
use prism_engine::texture::TextureKind;

use crate::config::DemoConfig;
use crate::harness::{Demo, FrameScene};

const CUBES: [Vec3; 2] = [Vec3::new(-1.0, 0.0, -1.0), Vec3::new(2.0, 0.0, 0.0)];

const WINDOWS: [Vec3; 5] = [
    Vec3::new(-1.5, 0.0, -0.48),
    Vec3::new(1.5, 0.0, 0.51),
    Vec3::new(0.0, 0.0, 0.7),
    Vec3::new(-0.3, 0.0, -2.3),
    Vec3::new(0.5, 0.0, -0.6),
];

/// Orders `positions` from farthest to nearest to `eye`, so that blended
/// surfaces composite correctly. Equal distances keep their input order.
pub fn sort_far_to_near(positions: &[Vec3], eye: Vec3) -> Vec<Vec3> {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| eye.distance_squared(*b).total_cmp(&eye.distance_squared(*a)));
    sorted
}

pub struct BlendingDemo {
    config: DemoConfig,
    resources: Option<Resources>,
}

struct Resources {
    shader: Shader,
    window_shader: Shader,
    cube: Mesh,
    floor: Mesh,
    window: Mesh,
}

impl BlendingDemo {
    pub fn new(config: DemoConfig) -> Self {
        Self { config, resources: None }
    }
}

impl Resources {
    fn new(ctx: &RenderCtx<'_>, config: &DemoConfig) -> Self {
        let marble = super::load_texture(ctx, config, "marble.jpg", TextureKind::Diffuse);
        let metal = super::load_texture(ctx, config, "metal.png", TextureKind::Diffuse);
        let glass = super::load_texture(ctx, config, "window.png", TextureKind::Diffuse);

        Self {
            shader: super::load_shader(config, "textured", PipelineState::default()),
            window_shader: super::load_shader(
                config,
                "textured",
                PipelineState::default().with_blend(BlendMode::Alpha),
            ),
            cube: Mesh::new(ctx.device, primitives::cube(), vec![marble]),
            floor: Mesh::new(ctx.device, primitives::plane(5.0, -0.5, 2.0), vec![metal]),
            window: Mesh::new(ctx.device, primitives::quad(), vec![glass]),
        }
    }
}

impl Demo for BlendingDemo {
    fn clear_color(&self) -> Color {
        Color::rgb(0.1, 0.1, 0.1)
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &FrameScene) {
        let res = self.resources.get_or_insert_with(|| Resources::new(ctx, &self.config));
        super::set_camera(&mut res.shader, scene);
        super::set_camera(&mut res.window_shader, scene);

        let mut pass = target.begin_pass("prism blending");

        // Opaque geometry first.
        for position in CUBES {
            res.shader.set_mat4("model", Mat4::from_translation(position));
            res.cube.draw(ctx, &mut pass, &mut res.shader);
        }
        res.shader.set_mat4("model", Mat4::IDENTITY);
        res.floor.draw(ctx, &mut pass, &mut res.shader);

        for position in sort_far_to_near(&WINDOWS, scene.camera_position) {
            res.window_shader.set_mat4("model", Mat4::from_translation(position));
            res.window.draw(ctx, &mut pass, &mut res.window_shader);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_sort_far_to_near() {
        let eye = Vec3::new(0.0, 0.0, 3.0);
        let sorted = sort_far_to_near(&WINDOWS, eye);

        assert_eq!(sorted.len(), WINDOWS.len());
        assert_eq!(sorted[0], Vec3::new(-0.3, 0.0, -2.3));
        assert_eq!(sorted[4], Vec3::new(0.0, 0.0, 0.7));
        for pair in sorted.windows(2) {
            assert!(eye.distance(pair[0]) >= eye.distance(pair[1]));
        }
    }

    #[test]
    fn equal_distances_are_all_kept() {
        let eye = Vec3::ZERO;
        let ring = [Vec3::X, Vec3::NEG_X, Vec3::Z];
        assert_eq!(sort_far_to_near(&ring, eye), ring.to_vec());
    }

    #[test]
    fn order_follows_the_camera() {
        let near_left = sort_far_to_near(&WINDOWS, Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(near_left.last(), Some(&Vec3::new(-1.5, 0.0, -0.48)));
    }
}
