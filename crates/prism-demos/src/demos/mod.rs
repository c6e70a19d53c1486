//! The demo scenes and the helpers they share.

mod blending;
mod boxes;
mod lighting;
mod model;
mod outline;
mod rig;
mod triangle;

use std::rc::Rc;

use glam::{Mat4, Vec3};

use prism_engine::render::RenderCtx;
use prism_engine::shader::{PipelineState, Shader};
use prism_engine::texture::{Texture, TextureKind, TextureOptions};

use crate::config::{DemoConfig, DemoKind};
use crate::harness::{Demo, FrameScene};

pub fn create(kind: DemoKind, config: DemoConfig) -> Box<dyn Demo> {
    match kind {
        DemoKind::Triangle => Box::new(triangle::TriangleDemo::new(config)),
        DemoKind::Boxes => Box::new(boxes::BoxesDemo::new(config)),
        DemoKind::Lighting => Box::new(lighting::LightingDemo::new(config)),
        DemoKind::Model => Box::new(model::ModelDemo::new(config)),
        DemoKind::Outline => Box::new(outline::OutlineDemo::new(config)),
        DemoKind::Blending => Box::new(blending::BlendingDemo::new(config)),
    }
}

/// Cube placements of the box and lighting scenes.
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

/// Model matrix of cube `i`: tilted `20°·i` about (1, 0.3, 0.5), then spun by `spin_degrees` about (0.5, 1, 0).
pub fn cube_transform(i: usize, spin_degrees: f32) -> Mat4 {
    let tilt = Mat4::from_axis_angle(Vec3::new(1.0, 0.3, 0.5).normalize(), (20.0 * i as f32).to_radians());
    let spin = Mat4::from_axis_angle(Vec3::new(0.5, 1.0, 0.0).normalize(), spin_degrees.to_radians());
    Mat4::from_translation(CUBE_POSITIONS[i]) * tilt * spin
}

fn load_shader(config: &DemoConfig, name: &str, state: PipelineState) -> Shader {
    let (vertex, fragment) = config.shader_pair(name);
    Shader::from_files(vertex, fragment, state)
}

fn load_texture(ctx: &RenderCtx<'_>, config: &DemoConfig, name: &str, kind: TextureKind) -> Rc<Texture> {
    let path = config.asset(name);
    Rc::new(Texture::load(ctx.device, ctx.queue, &path, kind, TextureOptions::default()))
}

fn set_camera(shader: &mut Shader, scene: &FrameScene) {
    shader.set_mat4("view", scene.view);
    shader.set_mat4("projection", scene.projection);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cube_sits_at_origin_unrotated() {
        assert!(cube_transform(0, 0.0).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn cube_transform_translates_last() {
        let m = cube_transform(3, 45.0);
        assert!(m.transform_point3(Vec3::ZERO).abs_diff_eq(CUBE_POSITIONS[3], 1e-5));
    }

    #[test]
    fn rotation_keeps_cube_size() {
        let m = cube_transform(7, 123.0);
        let corner = m.transform_point3(Vec3::splat(0.5)) - CUBE_POSITIONS[7];
        assert!((corner.length() - Vec3::splat(0.5).length()).abs() < 1e-5);
    }
}

#[cfg(test)]
mod shader_tests {
    use std::path::PathBuf;

    use super::*;

    const SHIPPED: [&str; 6] = ["triangle", "boxes", "lighting", "lamp", "single_color", "textured"];

    fn shader_config() -> DemoConfig {
        DemoConfig {
            assets: PathBuf::from("assets"),
            shaders: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders"),
            model: PathBuf::from("assets/model.gltf"),
        }
    }

    #[test]
    fn every_shipped_shader_links() {
        let config = shader_config();
        for name in SHIPPED {
            let shader = load_shader(&config, name, PipelineState::default());
            assert!(shader.is_usable(), "{name}: {:?}", shader.diagnostics());
        }
    }

    #[test]
    fn textured_shaders_bind_the_diffuse_slot() {
        let config = shader_config();
        for name in ["boxes", "lighting", "textured"] {
            let shader = load_shader(&config, name, PipelineState::default());
            assert!(
                shader.material_bindings().iter().any(|b| b.name == "texture_diffuse0"),
                "{name} has no texture_diffuse0"
            );
        }
    }

    #[test]
    fn no_shader_file_is_left_unused() {
        let dir = shader_config().shaders;
        for entry in std::fs::read_dir(&dir).unwrap() {
            let file = entry.unwrap().file_name().to_string_lossy().into_owned();
            let stem = file.trim_end_matches(".vert.wgsl").trim_end_matches(".frag.wgsl");
            assert!(SHIPPED.contains(&stem), "{file} is not loaded by any demo");
        }
    }
}
