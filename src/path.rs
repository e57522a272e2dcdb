use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};

/// A 2D point on a planar glyph outline.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PathVertex {
    pub x: f32,
    pub y: f32,
}

impl PathVertex {
    pub fn new(x: f32, y: f32) -> Self {
        PathVertex { x, y }
    }
}

impl From<lyon::math::Point> for PathVertex {
    fn from(p: lyon::math::Point) -> Self {
        PathVertex { x: p.x, y: p.y }
    }
}

/// One closed sub-path of a glyph outline.
///
/// The contour is implicitly closed: the last vertex connects back to the
/// first one whenever edges are walked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathContour {
    vertices: Vec<PathVertex>,
}

impl PathContour {
    pub fn new() -> Self {
        PathContour { vertices: Vec::new() }
    }

    pub fn add_vertex(&mut self, v: PathVertex) {
        self.vertices.push(v);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn vertices(&self) -> &[PathVertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn last(&self) -> Option<&PathVertex> {
        self.vertices.last()
    }

    pub(crate) fn pop(&mut self) -> Option<PathVertex> {
        self.vertices.pop()
    }

    /// Consecutive vertex pairs, wrapping from the last vertex to the first.
    pub fn edges(&self) -> impl Iterator<Item = (PathVertex, PathVertex)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area; positive for counter-clockwise contours in a y-up frame.
    pub fn signed_area(&self) -> f32 {
        let twice: f64 = self
            .edges()
            .map(|(a, b)| a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64)
            .sum();
        (twice * 0.5) as f32
    }

    /// Number of times the contour winds around `p`, counter-clockwise
    /// turns counted positive. Points on the contour itself may land on
    /// either side.
    pub fn winding_number(&self, p: PathVertex) -> i32 {
        let (px, py) = (p.x as f64, p.y as f64);
        let mut winding = 0;
        for (a, b) in self.edges() {
            let (ax, ay, bx, by) = (a.x as f64, a.y as f64, b.x as f64, b.y as f64);
            let side = (bx - ax) * (py - ay) - (px - ax) * (by - ay);
            if ay <= py {
                if by > py && side > 0.0 {
                    winding += 1;
                }
            } else if by <= py && side < 0.0 {
                winding -= 1;
            }
        }
        winding
    }
}

/// Final GPU-facing vertex of the extruded mesh.
#[repr(C)]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        MeshVertex { position, normal, tex_coords }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> PathContour {
        let mut c = PathContour::new();
        c.add_vertex(PathVertex::new(0.0, 0.0));
        c.add_vertex(PathVertex::new(size, 0.0));
        c.add_vertex(PathVertex::new(size, size));
        c.add_vertex(PathVertex::new(0.0, size));
        c
    }

    #[test]
    fn growth_preserves_vertices() {
        let mut c = PathContour::new();
        assert_eq!(c.vertex_count(), 0);
        for i in 0..1000 {
            c.add_vertex(PathVertex::new(i as f32, -(i as f32)));
        }
        assert_eq!(c.vertex_count(), 1000);
        assert!(c.capacity() >= 1000);
        for (i, v) in c.vertices().iter().enumerate() {
            assert_eq!(*v, PathVertex::new(i as f32, -(i as f32)));
        }
    }

    #[test]
    fn edges_wrap_around() {
        let c = square(1.0);
        let edges: Vec<_> = c.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (PathVertex::new(0.0, 1.0), PathVertex::new(0.0, 0.0)));
    }

    #[test]
    fn empty_contour_has_no_edges() {
        let c = PathContour::new();
        assert_eq!(c.edges().count(), 0);
        assert_eq!(c.signed_area(), 0.0);
    }

    #[test]
    fn signed_area_follows_orientation() {
        let ccw = square(2.0);
        assert!((ccw.signed_area() - 4.0).abs() < 1e-6);

        let mut cw = PathContour::new();
        for v in ccw.vertices().iter().rev() {
            cw.add_vertex(*v);
        }
        assert!((cw.signed_area() + 4.0).abs() < 1e-6);
    }

    #[test]
    fn winding_number_counts_turns() {
        let ccw = square(2.0);
        let mut cw = PathContour::new();
        for v in ccw.vertices().iter().rev() {
            cw.add_vertex(*v);
        }
        let inside = PathVertex::new(0.5, 1.5);
        let outside = PathVertex::new(2.5, 1.0);
        assert_eq!(ccw.winding_number(inside), 1);
        assert_eq!(cw.winding_number(inside), -1);
        assert_eq!(ccw.winding_number(outside), 0);
        assert_eq!(cw.winding_number(outside), 0);
        assert_eq!(PathContour::new().winding_number(inside), 0);
    }

    #[test]
    fn mesh_vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
        let v = MeshVertex::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0], [0.5, 0.25]);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 32);
    }
}
