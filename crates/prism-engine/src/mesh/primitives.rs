//! Built-in geometry used by the demos.
//!
//! Texture coordinates follow the flipped-upload convention: `v = 0` is the
//! bottom edge of the image. Every triangle winds counter-clockwise when seen
//! from the side its normal points to.

use glam::Vec3;

use super::vertex::{MeshData, Vertex};

/// Unit cube centred on the origin, one 0..1 UV square per face.
pub fn cube() -> MeshData {
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut data = MeshData::default();
    for (normal, u, v) in faces {
        push_face(&mut data, normal * 0.5, normal, u * 0.5, v * 0.5, 1.0);
    }
    data
}

/// Horizontal square at height `y`, facing up, spanning `±half_extent` on X and Z.
///
/// UVs run from 0 to `uv_repeat` so that a repeating sampler tiles the texture.
pub fn plane(half_extent: f32, y: f32, uv_repeat: f32) -> MeshData {
    let mut data = MeshData::default();
    push_face(
        &mut data,
        Vec3::new(0.0, y, 0.0),
        Vec3::Y,
        Vec3::X * half_extent,
        Vec3::NEG_Z * half_extent,
        uv_repeat,
    );
    data
}

/// Upright unit quad facing +Z with its left edge on the Y axis
/// (x in 0..1, y in -0.5..0.5).
pub fn quad() -> MeshData {
    let mut data = MeshData::default();
    push_face(
        &mut data,
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::Z,
        Vec3::X * 0.5,
        Vec3::Y * 0.5,
        1.0,
    );
    data
}

/// The classic first triangle, facing +Z.
pub fn triangle() -> MeshData {
    let n = [0.0, 0.0, 1.0];
    MeshData::new(
        vec![
            Vertex::new([-0.5, -0.5, 0.0], n, [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], n, [1.0, 0.0]),
            Vertex::new([0.0, 0.5, 0.0], n, [0.5, 1.0]),
        ],
        vec![0, 1, 2],
    )
}

/// Appends a quad centred on `center` spanning `±u` and `±v`; `u × v` must point along `normal`.
fn push_face(data: &mut MeshData, center: Vec3, normal: Vec3, u: Vec3, v: Vec3, uv_scale: f32) {
    let base = data.vertices.len() as u32;
    for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        let position = center + u * su + v * sv;
        let uv = [(su + 1.0) * 0.5 * uv_scale, (sv + 1.0) * 0.5 * uv_scale];
        data.vertices.push(Vertex::new(position.to_array(), normal.to_array(), uv));
    }
    data.indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_winding_matches_normals(data: &MeshData) {
        for tri in data.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| data.vertices[i as usize]);
            let pa = Vec3::from(a.position);
            let face = (Vec3::from(b.position) - pa).cross(Vec3::from(c.position) - pa);
            assert!(face.dot(Vec3::from(a.normal)) > 0.0, "triangle {tri:?} winds against its normal");
        }
    }

    #[test]
    fn cube_has_six_quads() {
        let cube = cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        assert_winding_matches_normals(&cube);
    }

    #[test]
    fn cube_fits_unit_box() {
        for v in cube().vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn plane_repeats_uvs() {
        let plane = plane(5.0, -0.5, 2.0);
        assert_winding_matches_normals(&plane);
        assert!(plane.vertices.iter().all(|v| v.position[1] == -0.5));
        let max_uv = plane.vertices.iter().map(|v| v.tex_coords[0]).fold(0.0, f32::max);
        assert_eq!(max_uv, 2.0);
        let max_x = plane.vertices.iter().map(|v| v.position[0]).fold(0.0, f32::max);
        assert_eq!(max_x, 5.0);
    }

    #[test]
    fn quad_spans_expected_rect() {
        let quad = quad();
        assert_winding_matches_normals(&quad);
        let xs: Vec<f32> = quad.vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = quad.vertices.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(ys, vec![-0.5, -0.5, 0.5, 0.5]);
        // top edge samples the top of the image
        assert_eq!(quad.vertices[2].tex_coords, [1.0, 1.0]);
    }

    #[test]
    fn triangle_faces_viewer() {
        assert_winding_matches_normals(&triangle());
    }
}
