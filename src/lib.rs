//! Extruded 3D text meshes.
//!
//! A string is laid out glyph by glyph along a baseline, each glyph outline
//! is flattened into closed contours, triangulated with the non-zero fill
//! rule, and extruded into a solid with a front face, a back face and side
//! walls. The combined buffers are handed to a [`MeshBufferAllocator`],
//! whose mesh handle is the only thing that outlives the build.
//!
//! ```no_run
//! use extruded_text::{build_text_mesh, load_font, BuildOptions, HeapAllocator, VertexDescriptor};
//!
//! let font = load_font("fonts/DejaVuSans.ttf", "Hello").unwrap();
//! let mesh = build_text_mesh(
//!     "Hello",
//!     &font,
//!     &BuildOptions::default(),
//!     &VertexDescriptor::mesh_vertex(),
//!     &mut HeapAllocator::new(),
//! )
//! .unwrap();
//! println!("{} vertices", mesh.mesh.vertex_count());
//! ```

pub mod error;
pub mod extrude;
pub mod font;
pub mod glyph;
pub mod mesh;
pub mod outline;
pub mod path;
pub mod tessellate;
pub mod ttfload;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

pub use error::{AllocError, FontError, MeshError, TessellateError};
pub use extrude::{GlyphTriangles, MeshAssembler};
pub use font::{Font, GlyphOutline};
pub use glyph::{Glyph, GlyphList};
pub use mesh::{
    HeapAllocator, HeapMesh, IndexFormat, MeshBufferAllocator, MeshData, VertexAttribute,
    VertexDescriptor, VertexFormat, VertexSemantic,
};
pub use path::{MeshVertex, PathContour, PathVertex};
pub use tessellate::GlyphTessellator;
pub use ttfload::load_font;

/// Half a font unit of a 1000-unit em.
pub const DEFAULT_TOLERANCE: f32 = 0.0005;

/// Parameters of one mesh build.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BuildOptions {
    /// Extrusion depth along -z, in em units. Must be positive.
    pub depth: f32,
    /// Maximum distance between a flattened curve and the true outline.
    pub tolerance: f32,
    pub apply_kerning: bool,
    /// Extra spacing added after every glyph advance.
    pub tracking: f32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            depth: 1.0,
            tolerance: DEFAULT_TOLERANCE,
            apply_kerning: true,
            tracking: 0.0,
        }
    }
}

impl BuildOptions {
    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if !(self.depth.is_finite() && self.depth > 0.0) {
            return Err(MeshError::InvalidDepth(self.depth));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(MeshError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Counters describing one build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub glyphs: usize,
    /// Glyphs whose outline could not be triangulated and were left empty.
    pub degraded_glyphs: usize,
    pub front_triangles: usize,
    pub back_triangles: usize,
    pub side_triangles: usize,
    pub vertex_count: usize,
    pub index_count: usize,
}

/// A finished mesh handle together with build statistics.
#[derive(Debug, Clone)]
pub struct TextMesh<M> {
    pub mesh: M,
    pub stats: BuildStats,
}

/// Builds the extruded mesh of `text` set in `font`.
///
/// Characters without an outline contribute nothing but their advance, and a
/// glyph that cannot be triangulated is left empty and counted in
/// [`BuildStats::degraded_glyphs`]. The build fails as a whole when the
/// options are invalid, the font has no outlines at all, the layout does not
/// describe [`MeshVertex`], or the allocator refuses the buffers.
pub fn build_text_mesh<A: MeshBufferAllocator>(
    text: &str,
    font: &Font,
    options: &BuildOptions,
    descriptor: &VertexDescriptor,
    allocator: &mut A,
) -> Result<TextMesh<A::Mesh>, MeshError> {
    options.validate()?;
    descriptor.validate()?;
    if !font.has_outlines() {
        return Err(MeshError::EmptyFont(font.name.clone()));
    }

    let mut glyphs = GlyphList::layout(text, font, options);
    let mut tessellator = GlyphTessellator::new(options.tolerance);
    let mut stats = BuildStats { glyphs: glyphs.len(), ..Default::default() };

    for glyph in glyphs.iter_mut() {
        outline::extract_glyph(glyph, options.tolerance);
        if let Err(err) = tessellator.tessellate(glyph) {
            warn!(ch = ?glyph.ch, %err, "glyph could not be tessellated, leaving it empty");
            glyph.set_geometry(&[], &[]);
            stats.degraded_glyphs += 1;
        }
    }

    let mut assembler = MeshAssembler::new(options.depth);
    for glyph in &glyphs {
        let tris = assembler.add_glyph(glyph);
        debug!(ch = ?glyph.ch, front = tris.front, sides = tris.sides, "extruded glyph");
        stats.front_triangles += tris.front;
        stats.back_triangles += tris.back;
        stats.side_triangles += tris.sides;
    }
    drop(glyphs);

    stats.vertex_count = assembler.vertex_count();
    stats.index_count = assembler.index_count();
    if stats.vertex_count > descriptor.index_format.max_vertices() {
        return Err(MeshError::IndexOverflow {
            vertex_count: stats.vertex_count,
            format: descriptor.index_format,
        });
    }

    let index_data = assembler.index_bytes(descriptor.index_format);
    let data = MeshData {
        descriptor,
        vertex_data: assembler.vertex_bytes(),
        vertex_count: stats.vertex_count,
        index_data: &index_data,
        index_count: stats.index_count,
    };
    let mesh = allocator.allocate(&data)?;
    debug!(
        glyphs = stats.glyphs,
        degraded = stats.degraded_glyphs,
        vertices = stats.vertex_count,
        indices = stats.index_count,
        "built text mesh"
    );
    Ok(TextMesh { mesh, stats })
}
