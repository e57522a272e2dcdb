//! Vertex layout description and the allocator seam that turns assembled
//! buffers into a mesh handle.

use std::mem::{offset_of, size_of};

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{AllocError, MeshError};
use crate::path::MeshVertex;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    TexCoord,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
}

impl VertexFormat {
    pub fn size(self) -> usize {
        match self {
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 => 12,
            VertexFormat::Float4 => 16,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    #[default]
    Uint32,
}

impl IndexFormat {
    pub fn size(self) -> usize {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }

    /// Largest vertex count addressable with this index type.
    pub fn max_vertices(self) -> usize {
        match self {
            IndexFormat::Uint16 => u16::MAX as usize + 1,
            IndexFormat::Uint32 => u32::MAX as usize,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    pub offset: usize,
}

/// Per-vertex layout a renderer expects the mesh buffers to follow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VertexDescriptor {
    pub attributes: Vec<VertexAttribute>,
    pub stride: usize,
    #[serde(default)]
    pub index_format: IndexFormat,
}

impl VertexDescriptor {
    /// The layout of [`MeshVertex`] with 32-bit indices.
    pub fn mesh_vertex() -> Self {
        VertexDescriptor {
            attributes: vec![
                VertexAttribute {
                    semantic: VertexSemantic::Position,
                    format: VertexFormat::Float3,
                    offset: offset_of!(MeshVertex, position),
                },
                VertexAttribute {
                    semantic: VertexSemantic::Normal,
                    format: VertexFormat::Float3,
                    offset: offset_of!(MeshVertex, normal),
                },
                VertexAttribute {
                    semantic: VertexSemantic::TexCoord,
                    format: VertexFormat::Float2,
                    offset: offset_of!(MeshVertex, tex_coords),
                },
            ],
            stride: size_of::<MeshVertex>(),
            index_format: IndexFormat::Uint32,
        }
    }

    pub fn with_index_format(mut self, index_format: IndexFormat) -> Self {
        self.index_format = index_format;
        self
    }

    pub fn attribute(&self, semantic: VertexSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    /// Checks that [`MeshVertex`] data can be handed over as-is for this layout.
    pub fn validate(&self) -> Result<(), MeshError> {
        let expected = VertexDescriptor::mesh_vertex();
        if self.stride != expected.stride {
            return Err(MeshError::Layout(format!(
                "stride is {}, expected {}",
                self.stride, expected.stride
            )));
        }
        if self.attributes.len() != expected.attributes.len() {
            return Err(MeshError::Layout(format!(
                "{} attributes declared, expected {}",
                self.attributes.len(),
                expected.attributes.len()
            )));
        }
        for want in &expected.attributes {
            match self.attribute(want.semantic) {
                Some(got) if got == want => {}
                Some(got) => {
                    return Err(MeshError::Layout(format!(
                        "{:?} declared as {:?} at offset {}, expected {:?} at offset {}",
                        want.semantic, got.format, got.offset, want.format, want.offset
                    )))
                }
                None => {
                    return Err(MeshError::Layout(format!("missing {:?} attribute", want.semantic)))
                }
            }
        }
        Ok(())
    }
}

impl Default for VertexDescriptor {
    fn default() -> Self {
        VertexDescriptor::mesh_vertex()
    }
}

/// Raw buffers of an assembled mesh, laid out per `descriptor`.
#[derive(Debug, Clone, Copy)]
pub struct MeshData<'a> {
    pub descriptor: &'a VertexDescriptor,
    pub vertex_data: &'a [u8],
    pub vertex_count: usize,
    pub index_data: &'a [u8],
    pub index_count: usize,
}

impl MeshData<'_> {
    pub fn byte_len(&self) -> usize {
        self.vertex_data.len() + self.index_data.len()
    }
}

/// Turns raw vertex and index bytes into a mesh handle the renderer can use.
pub trait MeshBufferAllocator {
    type Mesh;

    fn allocate(&mut self, data: &MeshData<'_>) -> Result<Self::Mesh, AllocError>;
}

/// Allocator keeping meshes in host memory, with an optional byte budget.
#[derive(Debug, Clone, Default)]
pub struct HeapAllocator {
    budget: Option<usize>,
    allocated: usize,
}

impl HeapAllocator {
    pub fn new() -> Self {
        HeapAllocator::default()
    }

    pub fn with_budget(budget: usize) -> Self {
        HeapAllocator { budget: Some(budget), allocated: 0 }
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

impl MeshBufferAllocator for HeapAllocator {
    type Mesh = HeapMesh;

    fn allocate(&mut self, data: &MeshData<'_>) -> Result<HeapMesh, AllocError> {
        let requested = self.allocated + data.byte_len();
        if let Some(budget) = self.budget {
            if requested > budget {
                return Err(AllocError::BudgetExceeded { requested, budget });
            }
        }
        self.allocated = requested;
        debug!(bytes = data.byte_len(), total = self.allocated, "allocated heap mesh");
        Ok(HeapMesh {
            descriptor: data.descriptor.clone(),
            vertex_data: data.vertex_data.to_vec(),
            vertex_count: data.vertex_count,
            index_data: data.index_data.to_vec(),
            index_count: data.index_count,
        })
    }
}

/// Mesh produced by [`HeapAllocator`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeapMesh {
    pub descriptor: VertexDescriptor,
    vertex_data: Vec<u8>,
    vertex_count: usize,
    index_data: Vec<u8>,
    index_count: usize,
}

impl HeapMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    pub fn index_data(&self) -> &[u8] {
        &self.index_data
    }

    pub fn vertices(&self) -> Vec<MeshVertex> {
        if self.descriptor.stride < size_of::<MeshVertex>() {
            return Vec::new();
        }
        self.vertex_data
            .chunks_exact(self.descriptor.stride)
            .map(|b| bytemuck::pod_read_unaligned::<MeshVertex>(&b[..size_of::<MeshVertex>()]))
            .collect()
    }

    pub fn indices(&self) -> Vec<u32> {
        match self.descriptor.index_format {
            IndexFormat::Uint16 => self
                .index_data
                .chunks_exact(2)
                .map(|b| bytemuck::pod_read_unaligned::<u16>(b) as u32)
                .collect(),
            IndexFormat::Uint32 => self
                .index_data
                .chunks_exact(4)
                .map(bytemuck::pod_read_unaligned::<u32>)
                .collect(),
        }
    }

    /// Axis-aligned bounds of all vertex positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let vertices = self.vertices();
        let first = vertices.first()?.position;
        Some(vertices.iter().fold((first, first), |(mut min, mut max), v| {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
            (min, max)
        }))
    }
}
