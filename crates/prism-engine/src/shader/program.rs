use std::borrow::Cow;
use std::num::NonZeroU64;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::mesh::{MaterialSlot, Vertex};
use crate::render::RenderCtx;
use crate::texture::{create_sampler, Texture, TextureKind};

use super::compile::{compile, link, Program};
use super::error::{ShaderError, ShaderStage};
use super::reflect::{MaterialBinding, MaterialBindingKind, UniformLayout};
use super::ring::{UniformRing, INITIAL_SLOTS};
use super::state::PipelineState;
use super::uniforms::UniformBlock;

static NEXT_SHADER_ID: AtomicU64 = AtomicU64::new(1);

/// A linked WGSL program with named uniforms.
///
/// Construction never fails outright: a shader whose sources cannot be read,
/// compiled or linked is returned unusable, with its diagnostics logged and
/// kept in [`Shader::diagnostics`]. Draws through an unusable shader are skipped.
///
/// GPU objects are created on first use for the target's formats and rebuilt
/// if those formats change.
pub struct Shader {
    id: u64,
    label: String,
    state: PipelineState,
    program: Option<Program>,
    diagnostics: Vec<ShaderError>,
    uniforms: UniformBlock,
    gpu: Option<ShaderGpu>,
    generation: u64,
}

struct ShaderGpu {
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    pipeline: wgpu::RenderPipeline,
    group0: Group0,
    material_layout: Option<wgpu::BindGroupLayout>,
    sampler: wgpu::Sampler,
    fallback_color: Texture,
    fallback_specular: Texture,
}

/// What sits at bind group 0.
enum Group0 {
    None,
    /// Placeholder so that group 1 can be bound when a program has no uniforms.
    Empty(wgpu::BindGroup),
    Uniforms { layout: wgpu::BindGroupLayout, ring: UniformRing },
}

impl Shader {
    /// Reads, compiles and links the two WGSL files.
    ///
    /// An unreadable file is logged and compiled as empty source, which then
    /// fails to link.
    pub fn from_files(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        state: PipelineState,
    ) -> Self {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        let mut diagnostics = Vec::new();
        let vertex_src = read_source(ShaderStage::Vertex, vertex_path, &mut diagnostics);
        let fragment_src = read_source(ShaderStage::Fragment, fragment_path, &mut diagnostics);

        let label = format!(
            "{}+{}",
            file_stem(vertex_path),
            file_stem(fragment_path),
        );
        Self::build(label, &vertex_src, &fragment_src, state, diagnostics)
    }

    /// Compiles and links in-memory sources.
    pub fn from_sources(label: &str, vertex_src: &str, fragment_src: &str, state: PipelineState) -> Self {
        Self::build(label.to_string(), vertex_src, fragment_src, state, Vec::new())
    }

    fn build(
        label: String,
        vertex_src: &str,
        fragment_src: &str,
        state: PipelineState,
        mut diagnostics: Vec<ShaderError>,
    ) -> Self {
        let vertex = compile(ShaderStage::Vertex, vertex_src);
        let fragment = compile(ShaderStage::Fragment, fragment_src);

        let program = match (vertex, fragment) {
            (Ok(v), Ok(f)) => link(v, f).map_err(|e| vec![e]),
            (v, f) => Err([v.err(), f.err()].into_iter().flatten().collect()),
        };

        let program = match program {
            Ok(p) => Some(p),
            Err(errors) => {
                for e in &errors {
                    log::error!("shader {label}: {e}");
                }
                diagnostics.extend(errors);
                None
            }
        };

        let uniforms = program
            .as_ref()
            .and_then(|p| p.uniforms.clone())
            .map(UniformBlock::new)
            .unwrap_or_default();

        if program.is_some() {
            log::debug!("shader {label} linked ({} uniforms)", uniforms.layout().len());
        }

        Self {
            id: NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed),
            label,
            state,
            program,
            diagnostics,
            uniforms,
            gpu: None,
            generation: 0,
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// True when both stages compiled and linked.
    pub fn is_usable(&self) -> bool {
        self.program.is_some()
    }

    /// Every read/compile/link problem met while building this shader.
    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn uniform_layout(&self) -> &UniformLayout {
        self.uniforms.layout()
    }

    pub fn material_bindings(&self) -> &[MaterialBinding] {
        self.program.as_ref().map(|p| p.material.as_slice()).unwrap_or(&[])
    }

    /// Current staged uniform bytes.
    pub fn uniform_bytes(&self) -> &[u8] {
        self.uniforms.bytes()
    }

    /// Identifies the bind group layouts currently in use. Changes whenever the
    /// GPU objects are rebuilt, so caches of material bind groups key on it.
    pub fn binding_key(&self) -> (u64, u64) {
        (self.id, self.generation)
    }

    // ── uniform setters ───────────────────────────────────────────────────

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.uniforms.set_bool(name, value);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.uniforms.set_int(name, value);
    }

    pub fn set_uint(&mut self, name: &str, value: u32) {
        self.uniforms.set_uint(name, value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.set_float(name, value);
    }

    pub fn set_vec2(&mut self, name: &str, value: impl Into<Vec2>) {
        self.uniforms.set_vec2(name, value);
    }

    pub fn set_vec3(&mut self, name: &str, value: impl Into<Vec3>) {
        self.uniforms.set_vec3(name, value);
    }

    pub fn set_vec4(&mut self, name: &str, value: impl Into<Vec4>) {
        self.uniforms.set_vec4(name, value);
    }

    pub fn set_mat3(&mut self, name: &str, value: Mat3) {
        self.uniforms.set_mat3(name, value);
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.uniforms.set_mat4(name, value);
    }

    // ── GPU ───────────────────────────────────────────────────────────────

    /// Binds this program's pipeline and stencil reference on `pass`.
    ///
    /// Returns `false` (binding nothing) for an unusable shader.
    pub fn use_program(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) -> bool {
        if !self.ensure_gpu(ctx) {
            return false;
        }
        let Some(gpu) = self.gpu.as_ref() else { return false };

        pass.set_pipeline(&gpu.pipeline);
        if gpu.depth_format.is_some_and(|f| f.has_stencil_aspect()) {
            pass.set_stencil_reference(self.state.stencil.reference());
        }
        true
    }

    /// Binds the program and a snapshot of the current uniform values for one draw.
    pub(crate) fn prepare_draw(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) -> bool {
        if !self.use_program(ctx, pass) {
            return false;
        }
        let Some(gpu) = self.gpu.as_mut() else { return false };

        match &mut gpu.group0 {
            Group0::None => {}
            Group0::Empty(bind_group) => pass.set_bind_group(0, &*bind_group, &[]),
            Group0::Uniforms { layout, ring } => {
                let (bind_group, offset) =
                    ring.push(ctx.device, ctx.queue, layout, ctx.frame_index, self.uniforms.bytes());
                pass.set_bind_group(0, bind_group, &[offset]);
            }
        }
        true
    }

    /// Builds the `@group(1)` bind group for a mesh's material.
    ///
    /// Texture bindings are matched to slots by name; a binding with no
    /// matching slot gets a 1×1 fallback (white, or black for specular maps).
    pub(crate) fn create_material_bind_group(
        &self,
        device: &wgpu::Device,
        slots: &[MaterialSlot],
    ) -> Option<wgpu::BindGroup> {
        let program = self.program.as_ref()?;
        let gpu = self.gpu.as_ref()?;
        let layout = gpu.material_layout.as_ref()?;

        let entries: Vec<wgpu::BindGroupEntry<'_>> = program
            .material
            .iter()
            .map(|binding| {
                let resource = match binding.kind {
                    MaterialBindingKind::Sampler => wgpu::BindingResource::Sampler(&gpu.sampler),
                    MaterialBindingKind::Texture => {
                        let view = slots
                            .iter()
                            .find(|slot| slot.binding_name() == binding.name)
                            .map(|slot| slot.texture.view())
                            .unwrap_or_else(|| gpu.fallback_for(&binding.name).view());
                        wgpu::BindingResource::TextureView(view)
                    }
                };
                wgpu::BindGroupEntry { binding: binding.binding, resource }
            })
            .collect();

        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("prism {} material", self.label)),
            layout,
            entries: &entries,
        }))
    }

    pub(crate) fn has_material(&self) -> bool {
        !self.material_bindings().is_empty()
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) -> bool {
        let Some(program) = self.program.as_ref() else {
            return false;
        };

        if let Some(gpu) = &self.gpu {
            if gpu.color_format == ctx.surface_format && gpu.depth_format == ctx.depth_format {
                return true;
            }
        }

        match ShaderGpu::new(ctx, &self.label, program, &self.state) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.generation += 1;
                true
            }
            Err(e) => {
                // The device rejected the pair; keep the shader unusable from now on.
                log::error!("shader {}: {e}", self.label);
                self.diagnostics.push(e);
                self.program = None;
                self.gpu = None;
                false
            }
        }
    }
}

impl ShaderGpu {
    /// Builds the pipeline and its layouts. Validation errors raised by the
    /// device while doing so are captured and returned instead of panicking.
    fn new(
        ctx: &RenderCtx<'_>,
        label: &str,
        program: &Program,
        state: &PipelineState,
    ) -> Result<Self, ShaderError> {
        let device = ctx.device;
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("prism {label} vertex")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(program.vertex.clone())),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("prism {label} fragment")),
            source: wgpu::ShaderSource::Naga(Cow::Owned(program.fragment.clone())),
        });

        let material_layout = (!program.material.is_empty()).then(|| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = program
                .material
                .iter()
                .map(|binding| wgpu::BindGroupLayoutEntry {
                    binding: binding.binding,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: match binding.kind {
                        MaterialBindingKind::Texture => wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        MaterialBindingKind::Sampler => {
                            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                        }
                    },
                    count: None,
                })
                .collect();

            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("prism {label} material bgl")),
                entries: &entries,
            })
        });

        let (group0, group0_layout) = match &program.uniforms {
            Some(uniforms) => {
                let size = uniforms.size() as u64;
                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("prism {label} uniform bgl")),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: NonZeroU64::new(size),
                        },
                        count: None,
                    }],
                });
                let ring = UniformRing::new(device, &layout, "prism uniform ring", size, INITIAL_SLOTS);
                let group_layout = layout.clone();
                (Group0::Uniforms { layout, ring }, Some(group_layout))
            }
            None if material_layout.is_some() => {
                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("prism empty bgl"),
                    entries: &[],
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prism empty bind group"),
                    layout: &layout,
                    entries: &[],
                });
                (Group0::Empty(bind_group), Some(layout))
            }
            None => (Group0::None, None),
        };

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            group0_layout.iter().chain(material_layout.iter()).collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("prism {label} pipeline layout")),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("prism {label} pipeline")),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(program.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(program.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: state.blend.to_wgpu(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: state.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: ctx.depth_format.map(|f| state.depth_stencil(f)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(ShaderError::link(format!("pipeline creation failed: {err}")));
        }

        log::debug!("shader {label}: pipeline built for {:?}", ctx.surface_format);

        Ok(Self {
            color_format: ctx.surface_format,
            depth_format: ctx.depth_format,
            pipeline,
            group0,
            material_layout,
            sampler: create_sampler(device),
            fallback_color: Texture::solid(device, ctx.queue, "fallback color", [255; 4], TextureKind::Diffuse),
            fallback_specular: Texture::solid(
                device,
                ctx.queue,
                "fallback specular",
                [0, 0, 0, 255],
                TextureKind::Specular,
            ),
        })
    }

    fn fallback_for(&self, binding_name: &str) -> &Texture {
        if binding_name.starts_with("texture_specular") {
            &self.fallback_specular
        } else {
            &self.fallback_color
        }
    }
}

fn read_source(stage: ShaderStage, path: &Path, diagnostics: &mut Vec<ShaderError>) -> String {
    match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            let err = ShaderError::Read {
                stage,
                path: path.to_path_buf(),
                message: e.to_string(),
            };
            log::error!("{err}");
            diagnostics.push(err);
            String::new()
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
