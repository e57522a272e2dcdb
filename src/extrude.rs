//! Extrusion of tessellated glyphs into one solid vertex/index buffer.
//!
//! Every glyph contributes a front face at `z = 0`, a back face at
//! `z = -depth` with reversed winding, and one flat-shaded quad per contour
//! edge joining the two. All faces are wound like the glyph's fill: when the
//! glyph's contour area is positive (y up) every triangle is
//! counter-clockwise seen from outside the solid, and the other way around.
//! Wall normals point away from the filled region of each contour, whatever
//! direction that contour runs in.

use lyon::math::{vector, Vector};

use crate::glyph::Glyph;
use crate::mesh::IndexFormat;
use crate::path::{MeshVertex, PathContour, PathVertex};

const FRONT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const BACK_NORMAL: [f32; 3] = [0.0, 0.0, -1.0];

/// Maps glyph-local positions into `[0, 1]` over the glyph's contour bounds.
#[derive(Clone, Copy, Debug)]
struct TexMapping {
    min: PathVertex,
    inv_width: f32,
    inv_height: f32,
}

impl TexMapping {
    fn for_glyph(glyph: &Glyph<'_>) -> Self {
        let bounds = glyph.local_bounds().unwrap_or_default();
        let inv = |extent: f32| if extent > f32::EPSILON { 1.0 / extent } else { 0.0 };
        TexMapping {
            min: bounds.min.into(),
            inv_width: inv(bounds.width()),
            inv_height: inv(bounds.height()),
        }
    }

    fn s(&self, v: PathVertex) -> f32 {
        (v.x - self.min.x) * self.inv_width
    }

    fn st(&self, v: PathVertex) -> [f32; 2] {
        [self.s(v), (v.y - self.min.y) * self.inv_height]
    }
}

fn edge_vector(a: PathVertex, b: PathVertex) -> Vector {
    vector(b.x - a.x, b.y - a.y)
}

/// Whether the glyph's fill lies on the left of the contour's edges.
///
/// Steps off the middle of the longest edge to its left and asks the
/// non-zero rule of the whole glyph whether that point is filled.
fn fills_left(glyph: &Glyph<'_>, contour: &PathContour) -> Option<bool> {
    let (a, b) = contour.edges().max_by(|e, f| {
        let le = edge_vector(e.0, e.1).square_length();
        let lf = edge_vector(f.0, f.1).square_length();
        le.total_cmp(&lf)
    })?;
    let dir = edge_vector(a, b);
    let len = dir.length();
    if len <= f32::EPSILON {
        return None;
    }
    let step = vector(-dir.y, dir.x) * 1e-3;
    let beside = PathVertex::new((a.x + b.x) * 0.5 + step.x, (a.y + b.y) * 0.5 + step.y);
    Some(glyph.winding_number(beside) != 0)
}

/// Unit normal of edge `a -> b` pointing away from the fill.
fn edge_normal(a: PathVertex, b: PathVertex, fill_left: bool) -> [f32; 3] {
    let dir = edge_vector(a, b);
    if dir.length() <= f32::EPSILON {
        return [0.0, 0.0, 0.0];
    }
    let dir = dir.normalize();
    let out = if fill_left { vector(dir.y, -dir.x) } else { vector(-dir.y, dir.x) };
    [out.x, out.y, 0.0]
}

/// Triangle counts contributed by one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphTriangles {
    pub front: usize,
    pub back: usize,
    pub sides: usize,
}

/// Accumulates extruded glyphs into a single vertex and index buffer.
#[derive(Debug)]
pub struct MeshAssembler {
    depth: f32,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl MeshAssembler {
    pub fn new(depth: f32) -> Self {
        MeshAssembler { depth, vertices: Vec::new(), indices: Vec::new() }
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Extrudes one tessellated glyph, placed at its baseline origin.
    ///
    /// Glyphs without triangulated geometry contribute nothing.
    pub fn add_glyph(&mut self, glyph: &Glyph<'_>) -> GlyphTriangles {
        if !glyph.has_geometry() {
            return GlyphTriangles::default();
        }
        let tex = TexMapping::for_glyph(glyph);
        // Front winding of the whole glyph; walls follow it.
        let positive = glyph.contour_area() >= 0.0;
        let origin = glyph.origin;
        let place = |v: PathVertex, z: f32| [v.x + origin.x, v.y + origin.y, z];

        let front_start = self.base();
        for &v in glyph.vertices() {
            self.vertices.push(MeshVertex::new(place(v, 0.0), FRONT_NORMAL, tex.st(v)));
        }
        let back_start = self.base();
        for &v in glyph.vertices() {
            self.vertices.push(MeshVertex::new(place(v, -self.depth), BACK_NORMAL, tex.st(v)));
        }

        let triangles = glyph.index_count() / 3;
        for tri in glyph.indices().chunks_exact(3) {
            self.indices.extend([front_start + tri[0], front_start + tri[1], front_start + tri[2]]);
        }
        for tri in glyph.indices().chunks_exact(3) {
            self.indices.extend([back_start + tri[0], back_start + tri[2], back_start + tri[1]]);
        }

        let mut sides = 0;
        for contour in &glyph.contours {
            let fill_left = fills_left(glyph, contour).unwrap_or(positive);
            for (a, b) in contour.edges() {
                let normal = edge_normal(a, b, fill_left);
                let base = self.base();
                self.vertices.extend([
                    MeshVertex::new(place(a, 0.0), normal, [tex.s(a), 0.0]),
                    MeshVertex::new(place(b, 0.0), normal, [tex.s(b), 0.0]),
                    MeshVertex::new(place(a, -self.depth), normal, [tex.s(a), 1.0]),
                    MeshVertex::new(place(b, -self.depth), normal, [tex.s(b), 1.0]),
                ]);
                // a0, a1, b1 turns towards the right of the edge.
                let (a0, b0, a1, b1) = (base, base + 1, base + 2, base + 3);
                if fill_left == positive {
                    self.indices.extend([a0, a1, b1, a0, b1, b0]);
                } else {
                    self.indices.extend([a0, b1, a1, a0, b0, b1]);
                }
                sides += 2;
            }
        }

        GlyphTriangles { front: triangles, back: triangles, sides }
    }

    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Index buffer bytes in the requested format.
    ///
    /// Callers check that the vertex count fits the format first.
    pub fn index_bytes(&self, format: IndexFormat) -> Vec<u8> {
        match format {
            IndexFormat::Uint32 => bytemuck::cast_slice(&self.indices).to_vec(),
            IndexFormat::Uint16 => {
                let narrow: Vec<u16> = self.indices.iter().map(|&i| i as u16).collect();
                bytemuck::cast_slice(&narrow).to_vec()
            }
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
