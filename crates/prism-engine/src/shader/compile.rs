use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Handle, Interpolation, Module, Sampling, ScalarKind, Type, TypeInner};

use super::error::{ShaderError, ShaderStage};
use super::reflect::{MaterialBinding, UniformLayout};

/// Vertex attribute locations fed by `mesh::Vertex`.
const VERTEX_LOCATIONS: u32 = 3;

/// Parses and validates one WGSL source.
pub(crate) fn compile(stage: ShaderStage, source: &str) -> Result<Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            message: e.emit_to_string(source),
        })?;

    Ok(module)
}

/// A linked vertex/fragment pair plus its reflected resource interface.
#[derive(Debug, Clone)]
pub(crate) struct Program {
    pub vertex: Module,
    pub vertex_entry: String,
    pub fragment: Module,
    pub fragment_entry: String,
    pub uniforms: Option<UniformLayout>,
    pub material: Vec<MaterialBinding>,
}

/// Checks that two compiled stages form a usable program.
pub(crate) fn link(vertex: Module, fragment: Module) -> Result<Program, ShaderError> {
    let vertex_entry = entry_point(&vertex, naga::ShaderStage::Vertex)
        .ok_or_else(|| ShaderError::link("vertex source declares no @vertex entry point"))?;
    let fragment_entry = entry_point(&fragment, naga::ShaderStage::Fragment)
        .ok_or_else(|| ShaderError::link("fragment source declares no @fragment entry point"))?;

    check_vertex_inputs(&vertex, &vertex_entry).map_err(ShaderError::link)?;
    check_stage_interface(&vertex, &vertex_entry, &fragment, &fragment_entry).map_err(ShaderError::link)?;

    let uniforms = UniformLayout::merge(
        UniformLayout::reflect(&vertex).map_err(ShaderError::link)?,
        UniformLayout::reflect(&fragment).map_err(ShaderError::link)?,
    )
    .map_err(ShaderError::link)?;

    let material = MaterialBinding::merge(
        MaterialBinding::reflect(&vertex).map_err(ShaderError::link)?,
        MaterialBinding::reflect(&fragment).map_err(ShaderError::link)?,
    )
    .map_err(ShaderError::link)?;

    Ok(Program {
        vertex,
        vertex_entry,
        fragment,
        fragment_entry,
        uniforms,
        material,
    })
}

fn entry_point(module: &Module, stage: naga::ShaderStage) -> Option<String> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage)
        .map(|ep| ep.name.clone())
}

/// One user-defined inter-stage value (`@location(n)`).
#[derive(Debug, Clone, PartialEq)]
struct Varying {
    location: u32,
    inner: TypeInner,
    interpolation: Option<Interpolation>,
    sampling: Option<Sampling>,
}

/// Flattens located bindings, looking one level into struct members.
fn varyings<'a>(
    module: &Module,
    bindings: impl IntoIterator<Item = (Option<&'a Binding>, Handle<Type>)>,
) -> Vec<Varying> {
    let mut out = Vec::new();
    let mut push = |binding: &Binding, ty: Handle<Type>| {
        if let Binding::Location { location, interpolation, sampling, .. } = binding {
            out.push(Varying {
                location: *location,
                inner: module.types[ty].inner.clone(),
                interpolation: *interpolation,
                sampling: *sampling,
            });
        }
    };

    for (binding, ty) in bindings {
        match binding {
            Some(binding) => push(binding, ty),
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                    for member in members {
                        if let Some(binding) = &member.binding {
                            push(binding, member.ty);
                        }
                    }
                }
            }
        }
    }
    out
}

fn entry_inputs(module: &Module, entry: &str) -> Vec<Varying> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry)
        .map(|ep| varyings(module, ep.function.arguments.iter().map(|a| (a.binding.as_ref(), a.ty))))
        .unwrap_or_default()
}

fn entry_outputs(module: &Module, entry: &str) -> Vec<Varying> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry)
        .and_then(|ep| ep.function.result.as_ref())
        .map(|r| varyings(module, [(r.binding.as_ref(), r.ty)]))
        .unwrap_or_default()
}

/// Vertex inputs must be float attributes at locations 0 (position),
/// 1 (normal) or 2 (texture coordinate).
fn check_vertex_inputs(module: &Module, entry: &str) -> Result<(), String> {
    for input in entry_inputs(module, entry) {
        let location = input.location;
        if location >= VERTEX_LOCATIONS {
            return Err(format!(
                "vertex input @location({location}) has no attribute; meshes provide locations 0..{VERTEX_LOCATIONS}"
            ));
        }
        let is_float = match input.inner {
            TypeInner::Scalar(s) | TypeInner::Vector { scalar: s, .. } => s.kind == ScalarKind::Float,
            _ => false,
        };
        if !is_float {
            return Err(format!("vertex input @location({location}) must be f32-based"));
        }
    }

    Ok(())
}

/// Every fragment input must be written by the vertex stage with the same
/// type, interpolation and sampling.
fn check_stage_interface(
    vertex: &Module,
    vertex_entry: &str,
    fragment: &Module,
    fragment_entry: &str,
) -> Result<(), String> {
    let outputs = entry_outputs(vertex, vertex_entry);

    for input in entry_inputs(fragment, fragment_entry) {
        let location = input.location;
        let Some(output) = outputs.iter().find(|o| o.location == location) else {
            return Err(format!("fragment input @location({location}) is not written by the vertex stage"));
        };
        if output.inner != input.inner {
            return Err(format!(
                "fragment input @location({location}) is {:?} but the vertex stage writes {:?}",
                input.inner, output.inner
            ));
        }
        if output.interpolation != input.interpolation || output.sampling != input.sampling {
            return Err(format!("fragment input @location({location}) disagrees with the vertex stage on interpolation"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
        struct Uniforms {
            model: mat4x4<f32>,
            view: mat4x4<f32>,
            projection: mat4x4<f32>,
        }
        @group(0) @binding(0) var<uniform> u: Uniforms;

        struct VsOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(2) uv: vec2<f32>) -> VsOut {
            var out: VsOut;
            out.clip = u.projection * u.view * u.model * vec4<f32>(position, 1.0);
            out.uv = uv;
            return out;
        }
    "#;

    const FS: &str = r#"
        @group(1) @binding(0) var texture_diffuse0: texture_2d<f32>;
        @group(1) @binding(1) var material_sampler: sampler;

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return textureSample(texture_diffuse0, material_sampler, uv);
        }
    "#;

    fn compiled(stage: ShaderStage, src: &str) -> Module {
        compile(stage, src).unwrap()
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn syntax_error_carries_diagnostic_text() {
        let err = compile(ShaderStage::Vertex, "fn broken( {").unwrap_err();
        let ShaderError::Compile { stage, message } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(*stage, ShaderStage::Vertex);
        assert!(!message.is_empty());
        assert!(err.to_string().starts_with("vertex shader compilation failed"));
    }

    #[test]
    fn type_error_is_reported() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }";
        assert!(matches!(
            compile(ShaderStage::Fragment, src),
            Err(ShaderError::Compile { stage: ShaderStage::Fragment, .. })
        ));
    }

    #[test]
    fn empty_source_compiles_to_an_empty_module() {
        let module = compiled(ShaderStage::Vertex, "");
        assert!(module.entry_points.is_empty());
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn link_finds_entry_points_and_resources() {
        let program = link(compiled(ShaderStage::Vertex, VS), compiled(ShaderStage::Fragment, FS)).unwrap();
        assert_eq!(program.vertex_entry, "vs_main");
        assert_eq!(program.fragment_entry, "fs_main");
        assert_eq!(program.uniforms.as_ref().map(|u| u.size()), Some(192));
        assert_eq!(program.material.len(), 2);
    }

    #[test]
    fn link_fails_without_vertex_entry() {
        let err = link(compiled(ShaderStage::Vertex, ""), compiled(ShaderStage::Fragment, FS)).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn link_fails_when_stages_are_swapped() {
        let err = link(compiled(ShaderStage::Vertex, FS), compiled(ShaderStage::Fragment, VS)).unwrap_err();
        assert!(err.to_string().contains("@vertex"));
    }

    #[test]
    fn link_rejects_unfed_vertex_location() {
        let vs = r#"
            @vertex
            fn vs_main(@location(5) extra: vec4<f32>) -> @builtin(position) vec4<f32> {
                return extra;
            }
        "#;
        let err = link(compiled(ShaderStage::Vertex, vs), compiled(ShaderStage::Fragment, FS)).unwrap_err();
        assert!(err.to_string().contains("@location(5)"));
    }

    #[test]
    fn link_rejects_disagreeing_uniform_blocks() {
        let fs = r#"
            struct Uniforms { view: vec4<f32>, }
            @group(0) @binding(0) var<uniform> u: Uniforms;
            @fragment fn fs_main() -> @location(0) vec4<f32> { return u.view; }
        "#;
        let err = link(compiled(ShaderStage::Vertex, VS), compiled(ShaderStage::Fragment, fs)).unwrap_err();
        assert!(err.to_string().contains("view"));
    }

    // ── stage interface ───────────────────────────────────────────────────

    const POSITION_ONLY_VS: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
    "#;

    #[test]
    fn link_rejects_fragment_input_the_vertex_stage_never_writes() {
        let err = link(compiled(ShaderStage::Vertex, POSITION_ONLY_VS), compiled(ShaderStage::Fragment, FS)).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(err.to_string().contains("@location(0)"), "{err}");
    }

    #[test]
    fn link_rejects_mismatched_varying_types() {
        let fs = r#"
            @fragment
            fn fs_main(@location(0) uv: vec4<f32>) -> @location(0) vec4<f32> {
                return uv;
            }
        "#;
        let err = link(compiled(ShaderStage::Vertex, VS), compiled(ShaderStage::Fragment, fs)).unwrap_err();
        assert!(err.to_string().contains("@location(0)"), "{err}");
    }

    #[test]
    fn link_rejects_mismatched_interpolation() {
        let fs = r#"
            @fragment
            fn fs_main(@location(0) @interpolate(linear) uv: vec2<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(uv, 0.0, 1.0);
            }
        "#;
        let err = link(compiled(ShaderStage::Vertex, VS), compiled(ShaderStage::Fragment, fs)).unwrap_err();
        assert!(err.to_string().contains("interpolation"), "{err}");
    }

    #[test]
    fn unread_vertex_outputs_are_fine() {
        let fs = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        assert!(link(compiled(ShaderStage::Vertex, VS), compiled(ShaderStage::Fragment, fs)).is_ok());
    }
}
