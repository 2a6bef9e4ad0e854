use glam::Vec2;

/// One mesh face flattened into 2D and, after packing, placed in the atlas.
///
/// Created by the projector, mutated once by the packer (atlas UVs), then
/// consumed by the UV buffer builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightmapTriangle {
    /// Edge-preserving local corners: the longest edge runs along +X from
    /// the origin, the apex sits above it.
    pub local: [Vec2; 3],
    /// Normalized atlas corners, filled in by the packer.
    pub uvs: [Vec2; 3],
    /// Base extent (longest edge length).
    pub width: f32,
    /// Apex height above the base.
    pub height: f32,
    /// This face's position in the source mesh triangle order.
    pub source_index: usize,
    /// Which original edge (0..3) became the base. Local corner `j` is mesh
    /// corner `(longest_edge + j) % 3`.
    pub longest_edge: usize,
}

/// A placement's outline in atlas pixel space, recorded for the visualizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleFootprint {
    pub corners: [Vec2; 3],
    /// Round-robin slot into [`ATLAS_PALETTE`].
    pub color_index: usize,
    pub source_index: usize,
}

/// ColorBrewer Paired-12 fill colors for the debug atlas, as 0xRRGGBB.
pub const ATLAS_PALETTE: [u32; 12] = [
    0xa6cee3, 0x1f78b4, 0xb2df8a, 0x33a02c, 0xfb9a99, 0xe31a1c, 0xfdbf6f, 0xff7f00, 0xcab2d6,
    0x6a3d9a, 0xffff99, 0xb15928,
];
