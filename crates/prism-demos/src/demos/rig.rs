//! The light set shared by the lighting and model scenes, plus its lamp cubes.

use glam::{Mat4, Vec3};

use prism_engine::mesh::Mesh;
use prism_engine::render::RenderCtx;
use prism_engine::shader::Shader;

use crate::harness::FrameScene;

pub const POINT_LIGHT_POSITIONS: [Vec3; 4] = [
    Vec3::new(0.7, 0.2, 2.0),
    Vec3::new(2.3, -3.3, -4.0),
    Vec3::new(-4.0, 2.0, -12.0),
    Vec3::new(0.0, 0.0, -3.0),
];

/// (constant, linear, quadratic)
const ATTENUATION: Vec3 = Vec3::new(1.0, 0.09, 0.032);
const LAMP_SCALE: f32 = 0.2;

/// Writes the constant part of the rig: material, directional and point lights.
pub fn configure(shader: &mut Shader) {
    shader.set_vec3("material.specular", Vec3::splat(0.5));
    shader.set_float("material.shininess", 64.0);

    shader.set_vec3("dir_light.direction", [-0.2, -1.0, -0.3]);
    shader.set_vec3("dir_light.ambient", Vec3::splat(0.05));
    shader.set_vec3("dir_light.diffuse", Vec3::splat(0.4));
    shader.set_vec3("dir_light.specular", Vec3::splat(0.5));

    for (i, position) in POINT_LIGHT_POSITIONS.iter().enumerate() {
        let light = format!("point_lights[{i}]");
        shader.set_vec3(&format!("{light}.position"), *position);
        shader.set_vec3(&format!("{light}.ambient"), Vec3::splat(0.2));
        shader.set_vec3(&format!("{light}.diffuse"), Vec3::splat(0.5));
        shader.set_vec3(&format!("{light}.specular"), Vec3::ONE);
        shader.set_vec3(&format!("{light}.attenuation"), ATTENUATION);
    }

    shader.set_vec3("spot_light.ambient", Vec3::ZERO);
    shader.set_vec3("spot_light.diffuse", Vec3::ONE);
    shader.set_vec3("spot_light.specular", Vec3::ONE);
    shader.set_vec3("spot_light.attenuation", ATTENUATION);
    shader.set_float("spot_light.cut_off", 12.5_f32.to_radians().cos());
    shader.set_float("spot_light.outer_cut_off", 15.0_f32.to_radians().cos());
}

/// Per-frame part: camera matrices, eye position and the flashlight.
pub fn update(shader: &mut Shader, scene: &FrameScene) {
    super::set_camera(shader, scene);
    shader.set_vec3("view_pos", scene.camera_position);
    shader.set_vec3("spot_light.position", scene.camera_position);
    shader.set_vec3("spot_light.direction", scene.camera_front);
}

/// Draws a small white cube at every point light.
pub fn draw_lamps(
    ctx: &RenderCtx<'_>,
    pass: &mut wgpu::RenderPass<'_>,
    lamp: &mut Mesh,
    shader: &mut Shader,
    scene: &FrameScene,
) {
    super::set_camera(shader, scene);
    for position in POINT_LIGHT_POSITIONS {
        let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(LAMP_SCALE));
        shader.set_mat4("model", model);
        lamp.draw(ctx, pass, shader);
    }
}
