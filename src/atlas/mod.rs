pub mod packer;
pub mod projector;
pub mod uv_buffer;
pub mod visualizer;

use image::RgbaImage;
use tracing::{debug, info};

use crate::config::AtlasConfig;
use crate::error::Result;
use crate::types::ChannelMesh;

/// Heights below this pack as zero-area placements instead of real shelf
/// space.
const DEGENERATE_HEIGHT: f32 = 1e-6;

/// Everything one mesh gains from a lightmap pass.
#[derive(Debug)]
pub struct Lightmap {
    pub width: u32,
    pub height: u32,
    /// Interleaved `[u, v]` pairs, three per triangle, in mesh corner order.
    pub uvs: Vec<f32>,
    /// Debug rendering of the packed layout, when requested.
    pub image: Option<RgbaImage>,
    pub shelf_count: usize,
    pub degenerate_triangles: usize,
}

/// Run the full atlas pass over one mesh: flatten, pack, scatter UVs and
/// optionally rasterize the layout.
pub fn generate(mesh: &ChannelMesh, config: &AtlasConfig) -> Result<Lightmap> {
    let mut triangles = projector::project_mesh(mesh)?;

    let degenerate_triangles = triangles
        .iter()
        .filter(|tri| tri.height < DEGENERATE_HEIGHT)
        .count();
    if degenerate_triangles > 0 {
        debug!(
            count = degenerate_triangles,
            "Degenerate triangles will pack as zero-area placements"
        );
    }

    let packed = packer::pack(&mut triangles, config.width, config.height)?;
    let uvs = uv_buffer::build(&triangles);
    let image = config
        .visualize
        .then(|| visualizer::render(&packed.footprints, config.width, config.height));

    info!(
        triangles = triangles.len(),
        shelves = packed.shelf_count,
        "Lightmap atlas generated"
    );

    Ok(Lightmap {
        width: config.width,
        height: config.height,
        uvs,
        image,
        shelf_count: packed.shelf_count,
        degenerate_triangles,
    })
}
