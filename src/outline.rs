//! Flattening of glyph outlines into closed polygonal contours.

use lyon::path::iterator::PathIterator;
use lyon::path::{Path, PathEvent};
use tracing::trace;

use crate::glyph::Glyph;
use crate::path::{PathContour, PathVertex};

/// Contours with fewer vertices than this enclose no area.
const MIN_CONTOUR_VERTICES: usize = 3;

/// Walks `path` and returns one closed contour per sub-path.
///
/// Curves are subdivided so that no point of the polyline strays more than
/// `tolerance` from the true curve. Orientation is kept as found in the
/// outline; the start vertex is never repeated at the end of a contour.
pub fn extract_contours(path: &Path, tolerance: f32) -> Vec<PathContour> {
    let mut contours = Vec::new();
    let mut current: Option<PathContour> = None;

    for evt in path.iter().flattened(tolerance) {
        match evt {
            PathEvent::Begin { at } => {
                if let Some(c) = current.take() {
                    finish_contour(c, &mut contours);
                }
                let mut c = PathContour::new();
                c.add_vertex(at.into());
                current = Some(c);
            }
            PathEvent::Line { to, .. } => {
                if let Some(c) = current.as_mut() {
                    let v = PathVertex::from(to);
                    if c.last() != Some(&v) {
                        c.add_vertex(v);
                    }
                }
            }
            PathEvent::End { .. } => {
                if let Some(c) = current.take() {
                    finish_contour(c, &mut contours);
                }
            }
            // Flattening only yields lines.
            PathEvent::Quadratic { .. } | PathEvent::Cubic { .. } => {}
        }
    }
    if let Some(c) = current.take() {
        finish_contour(c, &mut contours);
    }
    contours
}

fn finish_contour(mut contour: PathContour, contours: &mut Vec<PathContour>) {
    if contour.vertex_count() > 1 && contour.last() == contour.vertices().first() {
        contour.pop();
    }
    if contour.vertex_count() < MIN_CONTOUR_VERTICES {
        trace!(vertices = contour.vertex_count(), "dropping degenerate contour");
        return;
    }
    contours.push(contour);
}

/// Fills the contour list of `glyph` from its borrowed outline.
pub fn extract_glyph(glyph: &mut Glyph<'_>, tolerance: f32) {
    glyph.contours = match glyph.outline {
        Some(path) => extract_contours(path, tolerance),
        None => Vec::new(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::math::point;
    use lyon::path::path::Builder;
    use lyon::path::Winding;

    fn add_rect(b: &mut Builder, x0: f32, y0: f32, x1: f32, y1: f32, ccw: bool) {
        b.begin(point(x0, y0));
        if ccw {
            b.line_to(point(x1, y0));
            b.line_to(point(x1, y1));
            b.line_to(point(x0, y1));
        } else {
            b.line_to(point(x0, y1));
            b.line_to(point(x1, y1));
            b.line_to(point(x1, y0));
        }
        b.end(true);
    }

    #[test]
    fn empty_outline_yields_no_contours() {
        assert!(extract_contours(&Path::new(), 0.01).is_empty());
    }

    #[test]
    fn polygon_is_copied_without_closing_duplicate() {
        let mut b = Path::builder();
        b.begin(point(0.0, 0.0));
        b.line_to(point(1.0, 0.0));
        b.line_to(point(1.0, 1.0));
        b.line_to(point(0.0, 0.0));
        b.end(true);
        let contours = extract_contours(&b.build(), 0.01);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].vertex_count(), 3);
    }

    #[test]
    fn each_subpath_is_a_contour_with_orientation_kept() {
        let mut b = Path::builder();
        add_rect(&mut b, 0.0, 0.0, 4.0, 4.0, true);
        add_rect(&mut b, 1.0, 1.0, 3.0, 3.0, false);
        let contours = extract_contours(&b.build(), 0.01);
        assert_eq!(contours.len(), 2);
        assert!((contours[0].signed_area() - 16.0).abs() < 1e-5);
        assert!((contours[1].signed_area() + 4.0).abs() < 1e-5);
    }

    #[test]
    fn curves_stay_within_tolerance() {
        let tolerance = 0.001;
        let mut b = Path::builder();
        b.add_circle(point(0.0, 0.0), 1.0, Winding::Positive);
        let contours = extract_contours(&b.build(), tolerance);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.vertex_count() > 16);
        for v in c.vertices() {
            let r = (v.x * v.x + v.y * v.y).sqrt();
            assert!((r - 1.0).abs() < 0.01);
        }
        for (a, b) in c.edges() {
            let mx = (a.x + b.x) * 0.5;
            let my = (a.y + b.y) * 0.5;
            let r = (mx * mx + my * my).sqrt();
            assert!(1.0 - r <= tolerance * 2.0 + 1e-4);
        }
        assert!((c.signed_area().abs() - std::f32::consts::PI).abs() < 0.01);
    }

    #[test]
    fn degenerate_subpaths_are_dropped() {
        let mut b = Path::builder();
        b.begin(point(0.0, 0.0));
        b.line_to(point(1.0, 0.0));
        b.end(true);
        assert!(extract_contours(&b.build(), 0.01).is_empty());
    }

    #[test]
    fn glyph_without_outline_has_no_contours() {
        let mut glyph = Glyph::new();
        extract_glyph(&mut glyph, 0.01);
        assert!(glyph.contours.is_empty());

        let mut b = Path::builder();
        add_rect(&mut b, 0.0, 0.0, 1.0, 1.0, true);
        let path = b.build();
        let mut glyph = Glyph::with_outline('I', &path, PathVertex::default());
        extract_glyph(&mut glyph, 0.01);
        assert_eq!(glyph.contours.len(), 1);
    }
}
