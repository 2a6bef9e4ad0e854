pub mod mesh;
pub mod triangle;

pub use mesh::{
    ChannelFormat, ChannelMesh, ChannelSemantic, IndexBuffer, PositionReader, VertexChannel,
};
pub use triangle::{ATLAS_PALETTE, LightmapTriangle, TriangleFootprint};
