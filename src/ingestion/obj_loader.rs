use std::path::Path;

use glam::Vec3;
use tracing::{debug, warn};

use crate::error::{LumelError, Result};
use crate::types::{ChannelFormat, ChannelMesh, ChannelSemantic, IndexBuffer, VertexChannel};

/// Diffuse color applied when a face has no material.
const DEFAULT_DIFFUSE: [f32; 3] = [0.5, 0.5, 0.5];

/// Load an OBJ file (+ associated MTL) into one interleaved channel mesh.
pub fn load_obj(path: &Path) -> Result<ChannelMesh> {
    // No single_index: position and normal index streams stay separate so
    // faces can be expanded with their own corner attributes.
    let options = tobj::LoadOptions {
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, materials_result) = tobj::load_obj(path, &options)
        .map_err(|e| LumelError::Input(format!("Failed to load OBJ: {e}")))?;

    debug!(model_count = models.len(), "Loaded OBJ models");

    let materials = match materials_result {
        Ok(mats) => mats,
        Err(e) => {
            warn!("Failed to load MTL: {e}");
            Vec::new()
        }
    };

    Ok(expand_models(&models, &materials))
}

/// Expand indexed OBJ data into one flat per-face vertex stream.
///
/// Every face gets three dedicated vertices carrying position, normal and
/// diffuse color, so corner attributes never alias between faces. Missing
/// normals fall back to the face plane, missing materials to mid-gray.
pub fn expand_models(models: &[tobj::Model], materials: &[tobj::Material]) -> ChannelMesh {
    let channels = vec![
        VertexChannel {
            semantic: ChannelSemantic::Position,
            format: ChannelFormat::Float3,
        },
        VertexChannel {
            semantic: ChannelSemantic::Normal,
            format: ChannelFormat::Float3,
        },
        VertexChannel {
            semantic: ChannelSemantic::Color,
            format: ChannelFormat::Float3,
        },
    ];

    let mut floats: Vec<f32> = Vec::new();
    for model in models {
        let mesh = &model.mesh;
        let diffuse = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .and_then(|mat| mat.diffuse)
            .unwrap_or(DEFAULT_DIFFUSE);

        let per_corner_normals =
            !mesh.normals.is_empty() && mesh.normal_indices.len() == mesh.indices.len();

        for face in 0..mesh.indices.len() / 3 {
            let position_at = |corner: usize| {
                let i = mesh.indices[face * 3 + corner] as usize * 3;
                Vec3::new(
                    mesh.positions[i],
                    mesh.positions[i + 1],
                    mesh.positions[i + 2],
                )
            };
            let corners = [position_at(0), position_at(1), position_at(2)];
            let face_normal = (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .normalize_or_zero();

            for (corner, position) in corners.iter().enumerate() {
                let normal = if per_corner_normals {
                    let i = mesh.normal_indices[face * 3 + corner] as usize * 3;
                    Vec3::new(mesh.normals[i], mesh.normals[i + 1], mesh.normals[i + 2])
                } else {
                    face_normal
                };
                floats.extend_from_slice(&[
                    position.x, position.y, position.z, normal.x, normal.y, normal.z,
                    diffuse[0], diffuse[1], diffuse[2],
                ]);
            }
        }
    }

    let vertex_count = floats.len() / 9;
    let indices = if vertex_count <= usize::from(u16::MAX) + 1 {
        IndexBuffer::U16((0..vertex_count).map(|i| i as u16).collect())
    } else {
        IndexBuffer::U32((0..vertex_count).map(|i| i as u32).collect())
    };

    ChannelMesh {
        channels,
        vertex_data: bytemuck::cast_slice(&floats).to_vec(),
        indices,
    }
}
