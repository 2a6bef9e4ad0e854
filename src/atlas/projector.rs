use glam::{Vec2, Vec3};
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::types::{ChannelMesh, LightmapTriangle, PositionReader};

/// Flatten every triangle of a mesh into local 2D space.
///
/// Layout and index-width violations fail loudly up front; a missing
/// position channel is the recoverable skip condition. Projection itself is
/// pure per-triangle work and runs in parallel.
pub fn project_mesh(mesh: &ChannelMesh) -> Result<Vec<LightmapTriangle>> {
    mesh.validate()?;
    let indices = mesh.indices.as_u16()?;
    let positions = PositionReader::new(mesh)?;

    let triangles: Vec<LightmapTriangle> = indices
        .par_chunks_exact(3)
        .enumerate()
        .map(|(face, corner_indices)| {
            let corners = [
                positions.get(corner_indices[0] as usize),
                positions.get(corner_indices[1] as usize),
                positions.get(corner_indices[2] as usize),
            ];
            project_triangle(corners, face)
        })
        .collect();

    debug!(triangles = triangles.len(), "Projected mesh triangles");
    Ok(triangles)
}

/// Flatten one 3D triangle onto the plane, preserving all three edge
/// lengths.
///
/// The longest edge becomes the base, laid along +X from the origin; the
/// corners are relabeled so the base runs corner 0 to corner 1 and corner 2
/// is the apex. The apex position follows from the law of cosines; its
/// height is derived a second time from Heron's formula, independent of the
/// projection. Both radicands are clamped at zero so near-collinear input
/// degrades to a zero-height sliver instead of NaN.
pub fn project_triangle(corners: [Vec3; 3], source_index: usize) -> LightmapTriangle {
    // Edge e runs from corner e to corner (e + 1) % 3.
    let lengths = [
        corners[0].distance(corners[1]),
        corners[1].distance(corners[2]),
        corners[2].distance(corners[0]),
    ];

    // Longest edge wins; the lowest index breaks ties deterministically.
    let mut longest_edge = 0;
    for edge in 1..3 {
        if lengths[edge] > lengths[longest_edge] {
            longest_edge = edge;
        }
    }

    let base = lengths[longest_edge];
    if base <= f32::EPSILON {
        // All three corners coincide; no meaningful placement exists.
        return LightmapTriangle {
            local: [Vec2::ZERO; 3],
            uvs: [Vec2::ZERO; 3],
            width: 0.0,
            height: 0.0,
            source_index,
            longest_edge,
        };
    }

    let a = corners[longest_edge];
    let b = corners[(longest_edge + 1) % 3];
    let c = corners[(longest_edge + 2) % 3];

    // Law of cosines via unit edge vectors out of the base origin.
    let len_ac = lengths[(longest_edge + 2) % 3];
    let cos_ac = (b - a)
        .normalize_or_zero()
        .dot((c - a).normalize_or_zero());
    let sin_ac = (1.0 - cos_ac * cos_ac).max(0.0).sqrt();

    let local = [
        Vec2::ZERO,
        Vec2::new(base, 0.0),
        Vec2::new(len_ac * cos_ac, len_ac * sin_ac),
    ];

    // Apex height from Heron's formula: area = sqrt(s(s-a)(s-b)(s-c)),
    // area = 0.5 * base * height.
    let len_bc = lengths[(longest_edge + 1) % 3];
    let s = (base + len_bc + len_ac) * 0.5;
    let area = (s * (s - base) * (s - len_bc) * (s - len_ac)).max(0.0).sqrt();
    let height = area / (0.5 * base);

    LightmapTriangle {
        local,
        uvs: [Vec2::ZERO; 3],
        width: base,
        height,
        source_index,
        longest_edge,
    }
}
