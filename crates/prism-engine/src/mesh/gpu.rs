use std::collections::HashMap;
use std::rc::Rc;

use wgpu::util::DeviceExt;

use crate::render::RenderCtx;
use crate::shader::Shader;
use crate::texture::Texture;

use super::material::{assign_slots, MaterialSlot};
use super::vertex::MeshData;

/// One uploaded vertex/index buffer pair with its material textures.
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
    slots: Vec<MaterialSlot>,
    // keyed by Shader::binding_key
    bind_groups: HashMap<(u64, u64), wgpu::BindGroup>,
}

impl Mesh {
    /// Uploads `data` and tags each texture with a per-kind slot.
    pub fn new(device: &wgpu::Device, data: MeshData, textures: Vec<Rc<Texture>>) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism mesh vbo"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism mesh ibo"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let slots = assign_slots(textures.iter().map(|t| t.kind()))
            .into_iter()
            .zip(textures)
            .map(|((kind, slot), texture)| MaterialSlot { kind, slot, texture })
            .collect();

        Self {
            vertex_buffer,
            index_buffer,
            vertex_count: data.vertices.len() as u32,
            index_count: data.indices.len() as u32,
            slots,
            bind_groups: HashMap::new(),
        }
    }

    pub fn slots(&self) -> &[MaterialSlot] {
        &self.slots
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Draws the mesh once with `shader`'s current uniform values.
    ///
    /// Skipped silently when the shader is unusable or the mesh is empty.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>, shader: &mut Shader) {
        if self.index_count == 0 || self.vertex_count == 0 {
            return;
        }
        if !shader.prepare_draw(ctx, pass) {
            return;
        }

        if shader.has_material() {
            let key = shader.binding_key();
            if !self.bind_groups.contains_key(&key) {
                let Some(bind_group) = shader.create_material_bind_group(ctx.device, &self.slots) else {
                    return;
                };
                // Older generations of this shader can never be bound again.
                self.bind_groups.retain(|(id, _), _| *id != key.0);
                self.bind_groups.insert(key, bind_group);
            }
            if let Some(bind_group) = self.bind_groups.get(&key) {
                pass.set_bind_group(1, bind_group, &[]);
            }
        }

        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
