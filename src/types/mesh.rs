use bytemuck::pod_read_unaligned;
use glam::Vec3;

use crate::error::{LumelError, Result};

/// What a vertex channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSemantic {
    Position,
    Normal,
    Color,
    TexCoord,
}

/// Element layout of a vertex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFormat {
    /// Three f32 components.
    Float3,
    /// Four packed u8 components.
    UByte4,
}

impl ChannelFormat {
    /// Bytes one element occupies.
    pub fn size(self) -> usize {
        match self {
            ChannelFormat::Float3 => 12,
            ChannelFormat::UByte4 => 4,
        }
    }
}

/// One entry of a mesh's vertex layout description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexChannel {
    pub semantic: ChannelSemantic,
    pub format: ChannelFormat,
}

/// Triangle index buffer.
///
/// The 32-bit variant exists as a mesh capability; the lightmap pipeline
/// itself accepts only 16-bit indices and rejects wider buffers loudly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index width in bits.
    pub fn width_bits(&self) -> u32 {
        match self {
            IndexBuffer::U16(_) => 16,
            IndexBuffer::U32(_) => 32,
        }
    }

    /// The 16-bit indices, or a loud error for wider buffers.
    pub fn as_u16(&self) -> Result<&[u16]> {
        match self {
            IndexBuffer::U16(v) => Ok(v),
            IndexBuffer::U32(_) => Err(LumelError::UnsupportedIndexWidth(32)),
        }
    }

    fn max_index(&self) -> Option<u32> {
        match self {
            IndexBuffer::U16(v) => v.iter().map(|&i| u32::from(i)).max(),
            IndexBuffer::U32(v) => v.iter().copied().max(),
        }
    }
}

impl Default for IndexBuffer {
    fn default() -> Self {
        IndexBuffer::U16(Vec::new())
    }
}

/// The fundamental geometry container: a channel-described interleaved
/// vertex buffer plus a triangle index buffer.
#[derive(Debug, Clone, Default)]
pub struct ChannelMesh {
    /// Channel layout, in buffer order.
    pub channels: Vec<VertexChannel>,
    /// Interleaved vertex bytes, `stride()` per vertex.
    pub vertex_data: Vec<u8>,
    pub indices: IndexBuffer,
}

impl ChannelMesh {
    /// Bytes one vertex occupies.
    pub fn stride(&self) -> usize {
        self.channels.iter().map(|c| c.format.size()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        let stride = self.stride();
        if stride == 0 {
            0
        } else {
            self.vertex_data.len() / stride
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_channel(&self, semantic: ChannelSemantic) -> bool {
        self.channels.iter().any(|c| c.semantic == semantic)
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertex_data.is_empty()
    }

    /// Format and byte offset of the first channel with `semantic`.
    pub fn channel_offset(&self, semantic: ChannelSemantic) -> Option<(ChannelFormat, usize)> {
        let mut offset = 0;
        for channel in &self.channels {
            if channel.semantic == semantic {
                return Some((channel.format, offset));
            }
            offset += channel.format.size();
        }
        None
    }

    /// Check buffer consistency. Violations are programmer errors and fail
    /// loudly rather than being skipped over.
    pub fn validate(&self) -> Result<()> {
        let stride = self.stride();
        if stride == 0 && !self.vertex_data.is_empty() {
            return Err(LumelError::MalformedLayout(
                "vertex data present but no channels declared".into(),
            ));
        }
        if stride > 0 && self.vertex_data.len() % stride != 0 {
            return Err(LumelError::MalformedLayout(format!(
                "vertex buffer length {} is not a multiple of stride {stride}",
                self.vertex_data.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(LumelError::MalformedLayout(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(max) = self.indices.max_index() {
            if max as usize >= self.vertex_count() {
                return Err(LumelError::MalformedLayout(format!(
                    "index {max} out of bounds for {} vertices",
                    self.vertex_count()
                )));
            }
        }
        Ok(())
    }
}

/// Typed reader for the position channel of an interleaved vertex buffer.
///
/// The channel offset and stride are resolved once at construction; reads
/// are unaligned f32 triples, so any channel ordering works.
#[derive(Debug, Clone, Copy)]
pub struct PositionReader<'a> {
    data: &'a [u8],
    stride: usize,
    offset: usize,
}

impl<'a> PositionReader<'a> {
    /// Locate the position channel. A missing or non-Float3 position channel
    /// is the recoverable skip condition for lightmap generation.
    pub fn new(mesh: &'a ChannelMesh) -> Result<Self> {
        match mesh.channel_offset(ChannelSemantic::Position) {
            Some((ChannelFormat::Float3, offset)) => Ok(Self {
                data: &mesh.vertex_data,
                stride: mesh.stride(),
                offset,
            }),
            _ => Err(LumelError::NoPositionChannel),
        }
    }

    /// Position of vertex `index`. Callers validate the mesh first; an out
    /// of range index panics like any slice access.
    pub fn get(&self, index: usize) -> Vec3 {
        let at = index * self.stride + self.offset;
        pod_read_unaligned(&self.data[at..at + ChannelFormat::Float3.size()])
    }
}
