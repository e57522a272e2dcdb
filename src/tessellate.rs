//! Triangulation of glyph contours with lyon's fill tessellator.

use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};

use crate::error::TessellateError;
use crate::glyph::Glyph;
use crate::path::{PathContour, PathVertex};

struct VertexCtor;

impl FillVertexConstructor<PathVertex> for VertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> PathVertex {
        vertex.position().into()
    }
}

/// Closed lyon path with one sub-path per contour.
pub fn contours_to_path(contours: &[PathContour]) -> Path {
    let mut builder = Path::builder();
    for contour in contours.iter().filter(|c| !c.is_empty()) {
        let v = contour.vertices();
        builder.begin(point(v[0].x, v[0].y));
        for p in &v[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    builder.build()
}

pub(crate) fn triangle_area(a: PathVertex, b: PathVertex, c: PathVertex) -> f32 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

/// Reusable fill tessellator using the non-zero rule, so a contour wound
/// against its enclosing contour cuts a hole.
pub struct GlyphTessellator {
    tessellator: FillTessellator,
    options: FillOptions,
}

impl GlyphTessellator {
    pub fn new(tolerance: f32) -> Self {
        GlyphTessellator {
            tessellator: FillTessellator::new(),
            options: FillOptions::default()
                .with_fill_rule(FillRule::NonZero)
                .with_tolerance(tolerance),
        }
    }

    /// Triangulates the glyph's contours and stores the result on the glyph.
    ///
    /// Every triangle is wound like the glyph's overall fill. For outers and
    /// the holes nested in them the triangle areas then sum to the summed
    /// signed area of the contours; separate outers running in opposite
    /// directions all take the sign of the larger total. On failure the
    /// glyph keeps no geometry.
    pub fn tessellate(&mut self, glyph: &mut Glyph<'_>) -> Result<(), TessellateError> {
        glyph.set_geometry(&[], &[]);
        if glyph.contours.is_empty() {
            return Ok(());
        }
        let finite = glyph
            .contours
            .iter()
            .flat_map(|c| c.vertices())
            .all(|v| v.x.is_finite() && v.y.is_finite());
        if !finite {
            return Err(TessellateError::NonFinite);
        }

        let path = contours_to_path(&glyph.contours);
        let mut buffers: VertexBuffers<PathVertex, u32> = VertexBuffers::new();
        self.tessellator
            .tessellate_path(
                &path,
                &self.options,
                &mut BuffersBuilder::new(&mut buffers, VertexCtor),
            )
            .map_err(TessellateError::Engine)?;

        let positive = glyph.contour_area() >= 0.0;
        for tri in buffers.indices.chunks_exact_mut(3) {
            let area = triangle_area(
                buffers.vertices[tri[0] as usize],
                buffers.vertices[tri[1] as usize],
                buffers.vertices[tri[2] as usize],
            );
            if (area > 0.0 && !positive) || (area < 0.0 && positive) {
                tri.swap(1, 2);
            }
        }

        glyph.set_geometry(&buffers.vertices, &buffers.indices);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(points: &[(f32, f32)]) -> PathContour {
        let mut c = PathContour::new();
        for &(x, y) in points {
            c.add_vertex(PathVertex::new(x, y));
        }
        c
    }

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> PathContour {
        contour(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    fn reversed(c: &PathContour) -> PathContour {
        let mut r = PathContour::new();
        for v in c.vertices().iter().rev() {
            r.add_vertex(*v);
        }
        r
    }

    fn triangulated_area(glyph: &Glyph) -> f32 {
        let v = glyph.vertices();
        glyph
            .indices()
            .chunks_exact(3)
            .map(|t| triangle_area(v[t[0] as usize], v[t[1] as usize], v[t[2] as usize]))
            .sum()
    }

    #[test]
    fn no_contours_gives_empty_geometry() {
        let mut glyph = Glyph::new();
        GlyphTessellator::new(0.1).tessellate(&mut glyph).unwrap();
        assert_eq!(glyph.vertex_count(), 0);
        assert_eq!(glyph.index_count(), 0);
    }

    #[test]
    fn single_contour_area_is_covered() {
        let shape = contour(&[(0.0, 0.0), (3.0, 0.0), (3.0, 1.0), (1.0, 1.0), (1.0, 3.0), (0.0, 3.0)]);
        let expected = shape.signed_area();
        let mut glyph = Glyph::new();
        glyph.contours.push(shape);
        GlyphTessellator::new(0.1).tessellate(&mut glyph).unwrap();
        assert_eq!(glyph.index_count() % 3, 0);
        assert!((triangulated_area(&glyph) - expected).abs() < 1e-4);
    }

    #[test]
    fn clockwise_contour_keeps_negative_area() {
        let shape = reversed(&square(0.0, 0.0, 2.0, 2.0));
        let mut glyph = Glyph::new();
        glyph.contours.push(shape);
        GlyphTessellator::new(0.1).tessellate(&mut glyph).unwrap();
        assert!((triangulated_area(&glyph) + 4.0).abs() < 1e-4);
    }

    #[test]
    fn hole_is_excluded() {
        let mut glyph = Glyph::new();
        glyph.contours.push(square(0.0, 0.0, 4.0, 4.0));
        glyph.contours.push(reversed(&square(1.0, 1.0, 3.0, 3.0)));
        GlyphTessellator::new(0.1).tessellate(&mut glyph).unwrap();
        assert!((triangulated_area(&glyph) - 12.0).abs() < 1e-4);

        // No triangle may sit inside the hole.
        let v = glyph.vertices();
        for t in glyph.indices().chunks_exact(3) {
            let cx = (v[t[0] as usize].x + v[t[1] as usize].x + v[t[2] as usize].x) / 3.0;
            let cy = (v[t[0] as usize].y + v[t[1] as usize].y + v[t[2] as usize].y) / 3.0;
            assert!(!(cx > 1.0 && cx < 3.0 && cy > 1.0 && cy < 3.0));
        }
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut glyph = Glyph::new();
        glyph.contours.push(contour(&[(0.0, 0.0), (f32::NAN, 0.0), (1.0, 1.0)]));
        let result = GlyphTessellator::new(0.1).tessellate(&mut glyph);
        assert!(matches!(result, Err(TessellateError::NonFinite)));
        assert!(!glyph.has_geometry());
    }

    #[test]
    fn retessellation_replaces_geometry() {
        let mut tess = GlyphTessellator::new(0.1);
        let mut glyph = Glyph::new();
        glyph.contours.push(square(0.0, 0.0, 1.0, 1.0));
        tess.tessellate(&mut glyph).unwrap();
        let first = glyph.index_count();
        tess.tessellate(&mut glyph).unwrap();
        assert_eq!(glyph.index_count(), first);
    }
}
