use std::collections::HashMap;

use naga::{AddressSpace, ArraySize, Handle, Module, ScalarKind, Type, TypeInner, VectorSize};

/// Group holding the uniform block.
pub(crate) const UNIFORM_GROUP: u32 = 0;
/// Group holding material textures and samplers.
pub(crate) const MATERIAL_GROUP: u32 = 1;

/// Host-visible type of a reflected uniform leaf.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformType {
    F32,
    I32,
    U32,
    Vec2,
    Vec3,
    Vec4,
    /// `mat3x3<f32>`: three columns, each padded to 16 bytes.
    Mat3,
    Mat4,
}

impl UniformType {
    fn from_inner(inner: &TypeInner) -> Option<Self> {
        match *inner {
            TypeInner::Scalar(s) if s.width == 4 => match s.kind {
                ScalarKind::Float => Some(Self::F32),
                ScalarKind::Sint => Some(Self::I32),
                ScalarKind::Uint => Some(Self::U32),
                _ => None,
            },
            TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
                match size {
                    VectorSize::Bi => Some(Self::Vec2),
                    VectorSize::Tri => Some(Self::Vec3),
                    VectorSize::Quad => Some(Self::Vec4),
                }
            }
            TypeInner::Matrix { columns, rows, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
                match (columns, rows) {
                    (VectorSize::Tri, VectorSize::Tri) => Some(Self::Mat3),
                    (VectorSize::Quad, VectorSize::Quad) => Some(Self::Mat4),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Location of one uniform leaf inside the block.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformField {
    pub offset: u32,
    pub ty: UniformType,
}

/// Flattened layout of the uniform block at `@group(0) @binding(0)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    size: u32,
    fields: HashMap<String, UniformField>,
}

impl UniformLayout {
    /// Reflects the uniform block of one module.
    ///
    /// Returns `Ok(None)` when the module declares no uniforms.
    pub fn reflect(module: &Module) -> Result<Option<Self>, String> {
        let mut found: Option<Self> = None;

        for (_, var) in module.global_variables.iter() {
            if var.space != AddressSpace::Uniform {
                continue;
            }
            let name = var.name.clone().unwrap_or_default();
            let Some(binding) = var.binding.as_ref() else {
                return Err(format!("uniform `{name}` has no binding"));
            };
            if binding.group != UNIFORM_GROUP || binding.binding != 0 {
                return Err(format!(
                    "uniform `{name}` at @group({}) @binding({}); only @group(0) @binding(0) is supported",
                    binding.group, binding.binding
                ));
            }
            if found.is_some() {
                return Err(format!("uniform `{name}` redeclares @group(0) @binding(0)"));
            }

            let mut layout = Self::default();
            match &module.types[var.ty].inner {
                TypeInner::Struct { members, span } => {
                    layout.size = *span;
                    for member in members {
                        let Some(member_name) = member.name.as_ref() else { continue };
                        flatten(module, member.ty, member_name.clone(), member.offset, &mut layout.fields);
                    }
                }
                inner => {
                    layout.size = inner.size(module.to_ctx());
                    flatten(module, var.ty, name, 0, &mut layout.fields);
                }
            }
            found = Some(layout);
        }

        Ok(found)
    }

    /// Block size in bytes, as the shader sees it.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn field(&self, name: &str) -> Option<UniformField> {
        self.fields.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Combines the views two stages have of the same buffer.
    ///
    /// A name present in both must have the same offset and type.
    pub(crate) fn merge(a: Option<Self>, b: Option<Self>) -> Result<Option<Self>, String> {
        let (mut a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            (a, None) => return Ok(a),
            (None, b) => return Ok(b),
        };

        for (name, field) in b.fields {
            match a.fields.get(&name) {
                Some(existing) if *existing != field => {
                    return Err(format!(
                        "uniform `{name}` differs between stages ({:?} at {} vs {:?} at {})",
                        existing.ty, existing.offset, field.ty, field.offset
                    ));
                }
                Some(_) => {}
                None => {
                    a.fields.insert(name, field);
                }
            }
        }
        a.size = a.size.max(b.size);
        Ok(Some(a))
    }
}

fn flatten(
    module: &Module,
    ty: Handle<Type>,
    name: String,
    offset: u32,
    out: &mut HashMap<String, UniformField>,
) {
    match &module.types[ty].inner {
        TypeInner::Struct { members, .. } => {
            for member in members {
                let Some(member_name) = member.name.as_ref() else { continue };
                flatten(module, member.ty, format!("{name}.{member_name}"), offset + member.offset, out);
            }
        }
        TypeInner::Array { base, size: ArraySize::Constant(count), stride } => {
            for i in 0..count.get() {
                flatten(module, *base, format!("{name}[{i}]"), offset + i * stride, out);
            }
        }
        inner => match UniformType::from_inner(inner) {
            Some(ty) => {
                out.insert(name, UniformField { offset, ty });
            }
            None => log::debug!("uniform `{name}` has a type setters cannot reach; skipped"),
        },
    }
}

/// Kind of a material resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MaterialBindingKind {
    Texture,
    Sampler,
}

/// One `@group(1)` resource of a program.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MaterialBinding {
    pub name: String,
    pub binding: u32,
    pub kind: MaterialBindingKind,
}

impl MaterialBinding {
    /// Reflects `@group(1)` textures and samplers, sorted by binding.
    pub(crate) fn reflect(module: &Module) -> Result<Vec<Self>, String> {
        let mut out = Vec::new();

        for (_, var) in module.global_variables.iter() {
            if var.space != AddressSpace::Handle {
                continue;
            }
            let name = var.name.clone().unwrap_or_default();
            let Some(binding) = var.binding.as_ref() else {
                return Err(format!("resource `{name}` has no binding"));
            };
            if binding.group != MATERIAL_GROUP {
                return Err(format!(
                    "resource `{name}` is in @group({}); textures and samplers belong in @group(1)",
                    binding.group
                ));
            }

            let kind = match &module.types[var.ty].inner {
                TypeInner::Image {
                    dim: naga::ImageDimension::D2,
                    arrayed: false,
                    class: naga::ImageClass::Sampled { kind: ScalarKind::Float, multi: false },
                } => MaterialBindingKind::Texture,
                TypeInner::Sampler { comparison: false } => MaterialBindingKind::Sampler,
                _ => {
                    return Err(format!(
                        "resource `{name}` must be a texture_2d<f32> or a filtering sampler"
                    ));
                }
            };

            out.push(Self { name, binding: binding.binding, kind });
        }

        out.sort_by_key(|b| b.binding);
        Ok(out)
    }

    /// Union of both stages' bindings. The same binding must mean the same resource.
    pub(crate) fn merge(mut a: Vec<Self>, b: Vec<Self>) -> Result<Vec<Self>, String> {
        for item in b {
            match a.iter().find(|x| x.binding == item.binding) {
                Some(existing) if *existing != item => {
                    return Err(format!(
                        "@group(1) @binding({}) is `{}` in one stage and `{}` in the other",
                        item.binding, existing.name, item.name
                    ));
                }
                Some(_) => {}
                None => a.push(item),
            }
        }
        a.sort_by_key(|b| b.binding);
        Ok(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Module {
        naga::front::wgsl::parse_str(src).unwrap()
    }

    const LIGHTS: &str = r#"
        struct PointLight {
            position: vec3<f32>,
            intensity: f32,
        }

        struct Uniforms {
            model: mat4x4<f32>,
            view_pos: vec3<f32>,
            shininess: f32,
            lights: array<PointLight, 2>,
            use_texture: u32,
        }

        @group(0) @binding(0) var<uniform> u: Uniforms;

        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return u.model * vec4<f32>(u.lights[0].position, 1.0);
        }
    "#;

    // ── uniform layout ────────────────────────────────────────────────────

    #[test]
    fn nested_struct_and_array_offsets() {
        let layout = UniformLayout::reflect(&parse(LIGHTS)).unwrap().unwrap();

        assert_eq!(layout.field("model"), Some(UniformField { offset: 0, ty: UniformType::Mat4 }));
        assert_eq!(layout.field("view_pos"), Some(UniformField { offset: 64, ty: UniformType::Vec3 }));
        assert_eq!(layout.field("shininess"), Some(UniformField { offset: 76, ty: UniformType::F32 }));
        assert_eq!(
            layout.field("lights[0].position"),
            Some(UniformField { offset: 80, ty: UniformType::Vec3 })
        );
        assert_eq!(
            layout.field("lights[0].intensity"),
            Some(UniformField { offset: 92, ty: UniformType::F32 })
        );
        assert_eq!(
            layout.field("lights[1].position"),
            Some(UniformField { offset: 96, ty: UniformType::Vec3 })
        );
        assert_eq!(layout.field("use_texture"), Some(UniformField { offset: 112, ty: UniformType::U32 }));
        assert_eq!(layout.size(), 128);
        assert_eq!(layout.len(), 8);
    }

    #[test]
    fn unknown_name_is_absent() {
        let layout = UniformLayout::reflect(&parse(LIGHTS)).unwrap().unwrap();
        assert_eq!(layout.field("lights[2].position"), None);
        assert_eq!(layout.field("u.model"), None);
    }

    #[test]
    fn bare_uniform_uses_variable_name() {
        let src = r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;
            @fragment fn fs_main() -> @location(0) vec4<f32> { return tint; }
        "#;
        let layout = UniformLayout::reflect(&parse(src)).unwrap().unwrap();
        assert_eq!(layout.field("tint"), Some(UniformField { offset: 0, ty: UniformType::Vec4 }));
        assert_eq!(layout.size(), 16);
    }

    #[test]
    fn module_without_uniforms_reflects_none() {
        let src = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
        assert_eq!(UniformLayout::reflect(&parse(src)).unwrap(), None);
    }

    #[test]
    fn uniform_outside_group_zero_is_rejected() {
        let src = r#"
            @group(2) @binding(0) var<uniform> stray: f32;
            @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(stray); }
        "#;
        assert!(UniformLayout::reflect(&parse(src)).is_err());
    }

    // ── merge ─────────────────────────────────────────────────────────────

    #[test]
    fn merge_unions_fields_and_keeps_largest_size() {
        let a = UniformLayout::reflect(&parse(LIGHTS)).unwrap();
        let src = r#"
            struct Uniforms { model: mat4x4<f32>, }
            @group(0) @binding(0) var<uniform> u: Uniforms;
            @fragment fn fs_main() -> @location(0) vec4<f32> { return u.model[0]; }
        "#;
        let b = UniformLayout::reflect(&parse(src)).unwrap();
        let merged = UniformLayout::merge(b, a).unwrap().unwrap();
        assert_eq!(merged.size(), 128);
        assert!(merged.field("shininess").is_some());
    }

    #[test]
    fn merge_rejects_conflicting_offsets() {
        let a = UniformLayout::reflect(&parse(LIGHTS)).unwrap();
        let src = r#"
            struct Uniforms { shininess: f32, }
            @group(0) @binding(0) var<uniform> u: Uniforms;
            @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(u.shininess); }
        "#;
        let b = UniformLayout::reflect(&parse(src)).unwrap();
        let err = UniformLayout::merge(a, b).unwrap_err();
        assert!(err.contains("shininess"), "{err}");
    }

    // ── material bindings ─────────────────────────────────────────────────

    const MATERIAL: &str = r#"
        @group(1) @binding(1) var material_sampler: sampler;
        @group(1) @binding(0) var texture_diffuse0: texture_2d<f32>;

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return textureSample(texture_diffuse0, material_sampler, uv);
        }
    "#;

    #[test]
    fn material_bindings_are_sorted_by_binding() {
        let bindings = MaterialBinding::reflect(&parse(MATERIAL)).unwrap();
        assert_eq!(
            bindings,
            vec![
                MaterialBinding {
                    name: "texture_diffuse0".into(),
                    binding: 0,
                    kind: MaterialBindingKind::Texture,
                },
                MaterialBinding {
                    name: "material_sampler".into(),
                    binding: 1,
                    kind: MaterialBindingKind::Sampler,
                },
            ]
        );
    }

    #[test]
    fn conflicting_material_bindings_fail_to_merge() {
        let a = MaterialBinding::reflect(&parse(MATERIAL)).unwrap();
        let b = vec![MaterialBinding {
            name: "texture_specular0".into(),
            binding: 0,
            kind: MaterialBindingKind::Texture,
        }];
        assert!(MaterialBinding::merge(a, b).is_err());
    }
}
