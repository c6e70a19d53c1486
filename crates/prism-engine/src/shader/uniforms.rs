use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use super::reflect::{UniformLayout, UniformType};

/// CPU staging copy of a uniform block.
///
/// Setters look the name up on every call. A name the program does not
/// declare, or a value of the wrong type, leaves the block untouched.
#[derive(Debug, Clone, Default)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size() as usize];
        Self { layout, data }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Writes `b` as 1/0. Integer slots get an integer, float slots a float.
    pub fn set_bool(&mut self, name: &str, b: bool) -> bool {
        match self.lookup(name) {
            Some((offset, UniformType::I32 | UniformType::U32)) => self.put(offset, &[b as u32]),
            Some((offset, UniformType::F32)) => self.put(offset, &[if b { 1.0f32 } else { 0.0 }]),
            other => self.mismatch(name, "bool", other),
        }
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> bool {
        match self.lookup(name) {
            Some((offset, UniformType::I32)) => self.put(offset, &[value]),
            Some((offset, UniformType::U32)) if value >= 0 => self.put(offset, &[value as u32]),
            other => self.mismatch(name, "int", other),
        }
    }

    pub fn set_uint(&mut self, name: &str, value: u32) -> bool {
        match self.lookup(name) {
            Some((offset, UniformType::U32)) => self.put(offset, &[value]),
            Some((offset, UniformType::I32)) if value <= i32::MAX as u32 => self.put(offset, &[value as i32]),
            other => self.mismatch(name, "uint", other),
        }
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        match self.lookup(name) {
            Some((offset, UniformType::F32)) => self.put(offset, &[value]),
            other => self.mismatch(name, "float", other),
        }
    }

    pub fn set_vec2(&mut self, name: &str, value: impl Into<Vec2>) -> bool {
        let value: Vec2 = value.into();
        match self.lookup(name) {
            Some((offset, UniformType::Vec2)) => self.put(offset, &value.to_array()),
            other => self.mismatch(name, "vec2", other),
        }
    }

    pub fn set_vec3(&mut self, name: &str, value: impl Into<Vec3>) -> bool {
        let value: Vec3 = value.into();
        match self.lookup(name) {
            Some((offset, UniformType::Vec3)) => self.put(offset, &value.to_array()),
            other => self.mismatch(name, "vec3", other),
        }
    }

    pub fn set_vec4(&mut self, name: &str, value: impl Into<Vec4>) -> bool {
        let value: Vec4 = value.into();
        match self.lookup(name) {
            Some((offset, UniformType::Vec4)) => self.put(offset, &value.to_array()),
            other => self.mismatch(name, "vec4", other),
        }
    }

    pub fn set_mat3(&mut self, name: &str, value: Mat3) -> bool {
        match self.lookup(name) {
            Some((offset, UniformType::Mat3)) => {
                // Each column occupies a 16-byte slot.
                let mut padded = [0.0f32; 12];
                for (i, col) in value.to_cols_array_2d().iter().enumerate() {
                    padded[i * 4..i * 4 + 3].copy_from_slice(col);
                }
                self.put(offset, &padded)
            }
            other => self.mismatch(name, "mat3", other),
        }
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> bool {
        match self.lookup(name) {
            Some((offset, UniformType::Mat4)) => self.put(offset, &value.to_cols_array()),
            other => self.mismatch(name, "mat4", other),
        }
    }

    fn lookup(&self, name: &str) -> Option<(usize, UniformType)> {
        self.layout.field(name).map(|f| (f.offset as usize, f.ty))
    }

    fn put<T: bytemuck::Pod>(&mut self, offset: usize, values: &[T]) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let Some(dst) = self.data.get_mut(offset..offset + bytes.len()) else {
            log::warn!("uniform write at {offset} overruns a {}-byte block", self.data.len());
            return false;
        };
        dst.copy_from_slice(bytes);
        true
    }

    fn mismatch(&self, name: &str, wanted: &str, found: Option<(usize, UniformType)>) -> bool {
        match found {
            None => log::debug!("uniform `{name}` not found; {wanted} ignored"),
            Some((_, ty)) => log::debug!("uniform `{name}` is {ty:?}; {wanted} ignored"),
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(src: &str) -> UniformBlock {
        let module = naga::front::wgsl::parse_str(src).unwrap();
        UniformBlock::new(UniformLayout::reflect(&module).unwrap().unwrap())
    }

    const SRC: &str = r#"
        struct Material {
            shininess: f32,
            tint: vec3<f32>,
        }
        struct Uniforms {
            model: mat4x4<f32>,
            normal_matrix: mat3x3<f32>,
            material: Material,
            mode: i32,
            enabled: u32,
        }
        @group(0) @binding(0) var<uniform> u: Uniforms;
        @vertex fn vs_main() -> @builtin(position) vec4<f32> { return u.model[0]; }
    "#;

    fn f32_at(b: &UniformBlock, offset: usize) -> f32 {
        bytemuck::pod_read_unaligned(&b.bytes()[offset..offset + 4])
    }

    fn u32_at(b: &UniformBlock, offset: usize) -> u32 {
        bytemuck::pod_read_unaligned(&b.bytes()[offset..offset + 4])
    }

    // ── setters ───────────────────────────────────────────────────────────

    #[test]
    fn block_is_zeroed_at_reflected_size() {
        let b = block(SRC);
        // model 64 + mat3 48 + Material 32 + i32 + u32, rounded to 16.
        assert_eq!(b.bytes().len(), 160);
        assert!(b.bytes().iter().all(|&x| x == 0));
    }

    #[test]
    fn mat4_is_written_column_major() {
        let mut b = block(SRC);
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(b.set_mat4("model", m));
        assert_eq!(f32_at(&b, 48), 1.0);
        assert_eq!(f32_at(&b, 52), 2.0);
        assert_eq!(f32_at(&b, 56), 3.0);
        assert_eq!(f32_at(&b, 60), 1.0);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let mut b = block(SRC);
        let m = Mat3::from_cols(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0), Vec3::new(7.0, 8.0, 9.0));
        assert!(b.set_mat3("normal_matrix", m));
        assert_eq!(f32_at(&b, 64), 1.0);
        assert_eq!(f32_at(&b, 76), 0.0);
        assert_eq!(f32_at(&b, 80), 4.0);
        assert_eq!(f32_at(&b, 96), 7.0);
        assert_eq!(f32_at(&b, 104), 9.0);
    }

    #[test]
    fn nested_members_are_addressed_with_dots() {
        let mut b = block(SRC);
        assert!(b.set_float("material.shininess", 32.0));
        assert!(b.set_vec3("material.tint", [0.5, 0.25, 1.0]));
        assert_eq!(f32_at(&b, 112), 32.0);
        assert_eq!(f32_at(&b, 128), 0.5);
        assert_eq!(f32_at(&b, 136), 1.0);
    }

    #[test]
    fn bool_and_int_setters() {
        let mut b = block(SRC);
        assert!(b.set_int("mode", -3));
        assert!(b.set_bool("enabled", true));
        assert_eq!(bytemuck::pod_read_unaligned::<i32>(&b.bytes()[144..148]), -3);
        assert_eq!(u32_at(&b, 148), 1);
        assert!(b.set_bool("enabled", false));
        assert_eq!(u32_at(&b, 148), 0);
    }

    // ── silent no-ops ─────────────────────────────────────────────────────

    #[test]
    fn missing_name_changes_nothing() {
        let mut b = block(SRC);
        assert!(!b.set_float("material.diffuse", 1.0));
        assert!(!b.set_mat4("projection", Mat4::IDENTITY));
        assert!(b.bytes().iter().all(|&x| x == 0));
    }

    #[test]
    fn wrong_type_changes_nothing() {
        let mut b = block(SRC);
        assert!(!b.set_float("model", 1.0));
        assert!(!b.set_vec3("material.shininess", Vec3::ONE));
        assert!(!b.set_int("enabled", -1));
        assert!(b.bytes().iter().all(|&x| x == 0));
    }

    #[test]
    fn empty_block_ignores_everything() {
        let mut b = UniformBlock::default();
        assert!(!b.set_float("anything", 1.0));
        assert!(b.bytes().is_empty());
    }
}
