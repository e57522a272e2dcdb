use lyon::tessellation::TessellationError;
use thiserror::Error;

use crate::mesh::IndexFormat;

/// Fatal failures of a mesh build. No mesh is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("extrusion depth must be positive and finite, got {0}")]
    InvalidDepth(f32),
    #[error("flattening tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f32),
    #[error("font {0:?} provides no glyph outlines")]
    EmptyFont(String),
    #[error("vertex layout does not match MeshVertex: {0}")]
    Layout(String),
    #[error("{vertex_count} vertices cannot be addressed with {format:?} indices")]
    IndexOverflow { vertex_count: usize, format: IndexFormat },
    #[error(transparent)]
    Allocation(#[from] AllocError),
}

/// Refusal of a buffer allocator to realize a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("mesh needs {requested} bytes but the allocator budget is {budget}")]
    BudgetExceeded { requested: usize, budget: usize },
    #[error("allocator rejected the mesh: {0}")]
    Rejected(String),
}

/// Failure to triangulate one glyph. The build degrades that glyph to empty geometry.
#[derive(Debug, Error)]
pub enum TessellateError {
    #[error("contour contains a non-finite coordinate")]
    NonFinite,
    #[error("tessellator rejected the outline: {0:?}")]
    Engine(TessellationError),
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font face: {0}")]
    Parse(#[from] ttf_parser::FaceParsingError),
}
