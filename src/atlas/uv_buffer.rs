use crate::types::LightmapTriangle;

/// Flatten packed UVs into one interleaved `[u, v]` buffer in mesh corner
/// order.
///
/// Local corner `j` of a triangle is mesh corner `(longest_edge + j) % 3`,
/// so each UV is scattered back to the slot of the corner it was projected
/// from. Slots are addressed through `source_index`, which keeps the buffer
/// correct even if the input slice is not in mesh order.
pub fn build(triangles: &[LightmapTriangle]) -> Vec<f32> {
    let mut buffer = vec![0.0_f32; triangles.len() * 6];
    for tri in triangles {
        for (j, uv) in tri.uvs.iter().enumerate() {
            let corner = (tri.longest_edge + j) % 3;
            let at = (tri.source_index * 3 + corner) * 2;
            buffer[at] = uv.x;
            buffer[at + 1] = uv.y;
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::atlas::{packer, projector};

    fn rotated(longest_edge: usize, source_index: usize) -> LightmapTriangle {
        LightmapTriangle {
            local: [Vec2::ZERO; 3],
            uvs: [
                Vec2::new(0.1, 0.2),
                Vec2::new(0.3, 0.4),
                Vec2::new(0.5, 0.6),
            ],
            width: 1.0,
            height: 1.0,
            source_index,
            longest_edge,
        }
    }

    #[test]
    fn buffer_spans_three_uv_pairs_per_triangle() {
        let triangles = vec![rotated(0, 0), rotated(0, 1)];
        assert_eq!(build(&triangles).len(), 12);
    }

    #[test]
    fn rotation_scatters_uvs_to_source_corners() {
        // longest_edge 1: local corners 0,1,2 came from mesh corners 1,2,0.
        let buffer = build(&[rotated(1, 0)]);
        assert_eq!(&buffer[2..4], &[0.1, 0.2]);
        assert_eq!(&buffer[4..6], &[0.3, 0.4]);
        assert_eq!(&buffer[0..2], &[0.5, 0.6]);

        // longest_edge 2: local corners 0,1,2 came from mesh corners 2,0,1.
        let buffer = build(&[rotated(2, 0)]);
        assert_eq!(&buffer[4..6], &[0.1, 0.2]);
        assert_eq!(&buffer[0..2], &[0.3, 0.4]);
        assert_eq!(&buffer[2..4], &[0.5, 0.6]);
    }

    #[test]
    fn scrambled_slice_order_still_fills_mesh_slots() {
        let triangles = vec![rotated(0, 1), rotated(0, 0)];
        let buffer = build(&triangles);
        assert_eq!(&buffer[0..2], &[0.1, 0.2]);
        assert_eq!(&buffer[6..8], &[0.1, 0.2]);
    }

    #[test]
    fn atlas_distances_recover_source_edge_lengths() {
        // Full projection and packing round trip: scaling the UVs back to
        // pixels must reproduce every 3D edge length at the corners the
        // edge connects in the mesh. Edge 1 is the longest here, so the
        // scatter has to rotate.
        let corners = [
            Vec3::new(5.0, 11.0, 2.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(13.0, 4.0, -1.0),
        ];
        let mut triangles = vec![projector::project_triangle(corners, 0)];
        packer::pack(&mut triangles, 64, 64).unwrap();
        let buffer = build(&triangles);

        let uv_at = |corner: usize| {
            Vec2::new(buffer[corner * 2], buffer[corner * 2 + 1]) * 64.0
        };
        for edge in 0..3 {
            let len_3d = corners[edge].distance(corners[(edge + 1) % 3]);
            let len_uv = uv_at(edge).distance(uv_at((edge + 1) % 3));
            assert_relative_eq!(len_uv, len_3d, epsilon = 1e-3);
        }
    }
}
