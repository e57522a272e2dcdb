//! Per-character records for one mesh build.
//!
//! A [`Glyph`] borrows its outline from the [`Font`] and owns everything
//! derived from it: the flattened contours and, once tessellated, a private
//! copy of the flat triangulation. A [`GlyphList`] keeps every glyph of a
//! string in order and is dropped as a whole once the mesh is assembled.

use lyon::math::{point, Box2D};
use lyon::path::Path;
use tracing::warn;

use crate::font::Font;
use crate::path::{PathContour, PathVertex};
use crate::BuildOptions;

#[derive(Clone, Debug, Default)]
pub struct Glyph<'a> {
    pub ch: Option<char>,
    /// Outline owned by the font. `None` for glyphs that draw nothing.
    pub outline: Option<&'a Path>,
    /// Baseline offset of the glyph origin within the string.
    pub origin: PathVertex,
    pub contours: Vec<PathContour>,
    vertices: Vec<PathVertex>,
    indices: Vec<u32>,
}

impl<'a> Glyph<'a> {
    pub fn new() -> Self {
        Glyph::default()
    }

    pub fn with_outline(ch: char, outline: &'a Path, origin: PathVertex) -> Self {
        Glyph {
            ch: Some(ch),
            outline: Some(outline),
            origin,
            ..Default::default()
        }
    }

    /// Replaces the glyph's triangulation with a copy of the given buffers.
    pub fn set_geometry(&mut self, vertices: &[PathVertex], indices: &[u32]) {
        self.vertices = vertices.to_vec();
        self.indices = indices.to_vec();
    }

    pub fn vertices(&self) -> &[PathVertex] {
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

    pub fn has_geometry(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    /// Sum of contour signed areas; its sign is the fill winding of the glyph.
    pub fn contour_area(&self) -> f32 {
        self.contours.iter().map(PathContour::signed_area).sum()
    }

    /// Non-zero winding of all contours around `p`; the glyph fills `p`
    /// when it is not zero.
    pub fn winding_number(&self, p: PathVertex) -> i32 {
        self.contours.iter().map(|c| c.winding_number(p)).sum()
    }

    /// Bounding box of all contour vertices in glyph-local coordinates.
    pub fn local_bounds(&self) -> Option<Box2D> {
        if self.contours.iter().all(PathContour::is_empty) {
            return None;
        }
        let points = self
            .contours
            .iter()
            .flat_map(|c| c.vertices())
            .map(|v| point(v.x, v.y));
        Some(Box2D::from_points(points))
    }
}

/// Arena of the glyphs laid out for one string.
#[derive(Debug, Default)]
pub struct GlyphList<'a> {
    glyphs: Vec<Glyph<'a>>,
}

impl<'a> GlyphList<'a> {
    pub fn new() -> Self {
        GlyphList { glyphs: Vec::new() }
    }

    /// Places the characters of `text` one after another along the baseline.
    ///
    /// Characters the font has no entry for are skipped without advancing
    /// the pen.
    pub fn layout(text: &str, font: &'a Font, options: &BuildOptions) -> Self {
        let mut list = GlyphList::new();
        let mut pen_x = 0.0;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            let outline = match font.glyph(ch) {
                Some(g) => g,
                None => {
                    warn!(?ch, font = %font.name, "no glyph for character, skipping");
                    continue;
                }
            };
            if options.apply_kerning {
                if let Some(p) = prev {
                    pen_x += font.kerning(p, ch);
                }
            }
            list.push(Glyph::with_outline(ch, &outline.outline, PathVertex::new(pen_x, 0.0)));
            pen_x += outline.advance + options.tracking;
            prev = Some(ch);
        }
        list
    }

    pub fn push(&mut self, glyph: Glyph<'a>) {
        self.glyphs.push(glyph);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Glyph<'a>> {
        self.glyphs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Glyph<'a>> {
        self.glyphs.iter_mut()
    }
}

impl<'a, 'l> IntoIterator for &'l GlyphList<'a> {
    type Item = &'l Glyph<'a>;
    type IntoIter = std::slice::Iter<'l, Glyph<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.glyphs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::GlyphOutline;

    fn font() -> Font {
        let mut font = Font::new("layout");
        font.insert_glyph('A', GlyphOutline::blank(0.6));
        font.insert_glyph('V', GlyphOutline::blank(0.5));
        font.insert_glyph(' ', GlyphOutline::blank(0.25));
        font.set_kerning('A', 'V', -0.1);
        font
    }

    #[test]
    fn set_geometry_copies_and_replaces() {
        let mut glyph = Glyph::new();
        let mut verts = vec![
            PathVertex::new(0.0, 0.0),
            PathVertex::new(1.0, 0.0),
            PathVertex::new(0.0, 1.0),
        ];
        let indices = vec![0, 1, 2];
        glyph.set_geometry(&verts, &indices);
        verts[0] = PathVertex::new(9.0, 9.0);
        assert_eq!(glyph.vertices()[0], PathVertex::new(0.0, 0.0));
        assert!(glyph.has_geometry());

        glyph.set_geometry(&verts[..0], &[]);
        assert_eq!(glyph.vertex_count(), 0);
        assert_eq!(glyph.index_count(), 0);
        assert!(!glyph.has_geometry());
    }

    #[test]
    fn bounds_and_winding_cover_every_contour() {
        let mut glyph = Glyph::new();
        assert!(glyph.local_bounds().is_none());

        for (x0, x1) in [(0.0, 1.0), (2.0, 2.5)] {
            let mut c = PathContour::new();
            for (x, y) in [(x0, -0.5), (x1, -0.5), (x1, 1.0), (x0, 1.0)] {
                c.add_vertex(PathVertex::new(x, y));
            }
            glyph.contours.push(c);
        }
        let bounds = glyph.local_bounds().unwrap();
        assert_eq!((bounds.min.x, bounds.min.y), (0.0, -0.5));
        assert_eq!((bounds.max.x, bounds.max.y), (2.5, 1.0));

        assert_eq!(glyph.winding_number(PathVertex::new(0.5, 0.0)), 1);
        assert_eq!(glyph.winding_number(PathVertex::new(2.25, 0.0)), 1);
        assert_eq!(glyph.winding_number(PathVertex::new(1.5, 0.0)), 0);
    }

    #[test]
    fn layout_accumulates_advances() {
        let font = font();
        let opts = BuildOptions { apply_kerning: false, ..Default::default() };
        let list = GlyphList::layout("A V", &font, &opts);
        let xs: Vec<f32> = list.iter().map(|g| g.origin.x).collect();
        assert_eq!(xs.len(), 3);
        assert!((xs[1] - 0.6).abs() < 1e-6);
        assert!((xs[2] - 0.85).abs() < 1e-6);
    }

    #[test]
    fn layout_applies_kerning_and_tracking() {
        let font = font();
        let opts = BuildOptions { tracking: 0.05, ..Default::default() };
        let list = GlyphList::layout("AV", &font, &opts);
        let v = list.iter().nth(1).unwrap();
        assert!((v.origin.x - (0.6 + 0.05 - 0.1)).abs() < 1e-6);
    }

    #[test]
    fn layout_skips_missing_characters() {
        let font = font();
        let list = GlyphList::layout("AxV", &font, &BuildOptions::default());
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().map(|g| g.ch).collect::<Vec<_>>(), vec![Some('A'), Some('V')]);
    }
}
