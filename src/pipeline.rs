use std::fs;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::atlas::{self, Lightmap};
use crate::config::PipelineConfig;
use crate::error::{LumelError, Result};
use crate::ingestion::{self, IngestionResult};

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub triangle_count: usize,
    pub lightmapped: bool,
    pub duration: Duration,
}

/// Pipeline orchestrator -- drives the three processing stages.
pub struct Pipeline;

impl Pipeline {
    /// Run the full lightmapping pipeline.
    pub fn run(config: &PipelineConfig) -> Result<ProcessingResult> {
        let start = Instant::now();

        info!(input = %config.input.display(), "Starting pipeline");

        // Early exit
        if config.dry_run {
            info!("--dry-run: scanning input and reporting stats");
            let ingestion_result = ingestion::ingest(config)?;
            print_dry_run_summary(&ingestion_result);
            return Ok(ProcessingResult {
                triangle_count: ingestion_result.stats.total_triangles,
                lightmapped: false,
                duration: start.elapsed(),
            });
        }

        // Full pipeline
        info!("Stage 1/3: Ingestion");
        let ingestion_result = ingestion::ingest(config)?;

        info!("Stage 2/3: Lightmap generation");
        // A mesh without positions or one that cannot fit the atlas loses
        // its lightmap but does not abort the run.
        let lightmap = match atlas::generate(&ingestion_result.mesh, &config.atlas) {
            Ok(lightmap) => Some(lightmap),
            Err(e @ (LumelError::NoPositionChannel | LumelError::AtlasOverflow { .. })) => {
                warn!(%e, "Mesh left without a lightmap");
                None
            }
            Err(e) => return Err(e),
        };

        info!("Stage 3/3: Output");
        if let Some(ref lightmap) = lightmap {
            write_outputs(config, &ingestion_result, lightmap)?;
            print_atlas_summary(lightmap);
        }

        let duration = start.elapsed();
        info!(
            triangles = ingestion_result.stats.total_triangles,
            lightmapped = lightmap.is_some(),
            elapsed = ?duration,
            "Pipeline complete"
        );

        Ok(ProcessingResult {
            triangle_count: ingestion_result.stats.total_triangles,
            lightmapped: lightmap.is_some(),
            duration,
        })
    }
}

/// Sidecar manifest describing the written artifacts.
#[derive(Debug, Serialize)]
struct LightmapManifest {
    atlas_width: u32,
    atlas_height: u32,
    triangle_count: usize,
    uv_count: usize,
    shelf_count: usize,
    degenerate_triangles: usize,
}

/// Write the UV buffer, the optional atlas image and the manifest.
fn write_outputs(
    config: &PipelineConfig,
    ingestion: &IngestionResult,
    lightmap: &Lightmap,
) -> Result<()> {
    fs::create_dir_all(&config.output)?;

    // UV buffer: interleaved little-endian f32 pairs in mesh corner order.
    let uv_path = config.output.join("lightmap_uv.bin");
    let mut bytes = Vec::with_capacity(lightmap.uvs.len() * 4);
    for value in &lightmap.uvs {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(&uv_path, &bytes)?;
    info!(path = %uv_path.display(), uvs = lightmap.uvs.len() / 2, "Wrote UV buffer");

    if let Some(ref image) = lightmap.image {
        let image_path = config.output.join("atlas.png");
        image.save(&image_path).map_err(|e| {
            LumelError::Output(format!("Failed to write {}: {e}", image_path.display()))
        })?;
        info!(path = %image_path.display(), "Wrote atlas image");
    }

    let manifest = LightmapManifest {
        atlas_width: lightmap.width,
        atlas_height: lightmap.height,
        triangle_count: ingestion.stats.total_triangles,
        uv_count: lightmap.uvs.len() / 2,
        shelf_count: lightmap.shelf_count,
        degenerate_triangles: lightmap.degenerate_triangles,
    };
    let manifest_path = config.output.join("lightmap.json");
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| LumelError::Output(format!("Failed to serialize manifest: {e}")))?;
    fs::write(&manifest_path, json)?;
    info!(path = %manifest_path.display(), "Wrote manifest");

    Ok(())
}

/// Print dry-run summary with mesh stats.
fn print_dry_run_summary(ingestion: &IngestionResult) {
    let stats = &ingestion.stats;
    println!("=== Dry Run Summary ===");
    println!("  Format:    {}", stats.input_format);
    println!("  Vertices:  {}", stats.total_vertices);
    println!("  Triangles: {}", stats.total_triangles);
    println!("  Normals:   {}", if stats.has_normals { "yes" } else { "no" });
    println!("  Colors:    {}", if stats.has_colors { "yes" } else { "no" });
    println!("  Indices:   {}-bit", stats.index_width_bits);
}

/// Print atlas summary after generation.
fn print_atlas_summary(lightmap: &Lightmap) {
    println!("=== Lightmap Atlas ===");
    println!("  Atlas:      {}x{}", lightmap.width, lightmap.height);
    println!("  UV pairs:   {}", lightmap.uvs.len() / 2);
    println!("  Shelves:    {}", lightmap.shelf_count);
    println!("  Degenerate: {}", lightmap.degenerate_triangles);
}
