pub mod obj_loader;

use std::path::Path;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{LumelError, Result};
use crate::types::{ChannelMesh, ChannelSemantic};

/// Result of the ingestion stage.
#[derive(Debug)]
pub struct IngestionResult {
    pub mesh: ChannelMesh,
    pub stats: IngestionStats,
}

/// Statistics about the ingested data.
#[derive(Debug)]
pub struct IngestionStats {
    pub total_vertices: usize,
    pub total_triangles: usize,
    pub has_normals: bool,
    pub has_colors: bool,
    pub index_width_bits: u32,
    pub input_format: String,
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Obj,
}

impl InputFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Ok(InputFormat::Obj),
            _ => Err(LumelError::Input(format!(
                "Unsupported file format: .{ext}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Obj => "OBJ",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the full ingestion stage.
pub fn ingest(config: &PipelineConfig) -> Result<IngestionResult> {
    // 1. Validate input exists
    if !config.input.exists() {
        return Err(LumelError::Input(format!(
            "Input file not found: {}",
            config.input.display()
        )));
    }

    // 2. Detect format
    let format = InputFormat::from_path(&config.input)?;
    info!(format = %format, path = %config.input.display(), "Detected input format");

    // 3. Dispatch to loader
    let mesh = match format {
        InputFormat::Obj => obj_loader::load_obj(&config.input)?,
    };

    // 4. Compute stats
    let stats = compute_stats(&mesh, format);
    debug!(
        vertices = stats.total_vertices,
        triangles = stats.total_triangles,
        "Ingestion stats"
    );

    Ok(IngestionResult { mesh, stats })
}

/// Compute summary statistics from the ingested mesh.
pub fn compute_stats(mesh: &ChannelMesh, format: InputFormat) -> IngestionStats {
    IngestionStats {
        total_vertices: mesh.vertex_count(),
        total_triangles: mesh.triangle_count(),
        has_normals: mesh.has_channel(ChannelSemantic::Normal),
        has_colors: mesh.has_channel(ChannelSemantic::Color),
        index_width_bits: mesh.indices.width_bits(),
        input_format: format.to_string(),
    }
}
