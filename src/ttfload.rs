use std::collections::HashMap;
use std::path::PathBuf;

use lyon::math::{point, Point};
use lyon::path::path::Builder as PathBuilder;
use lyon::path::Path;
use tracing::{debug, warn};
use ttf_parser as ttf;

use crate::error::FontError;
use crate::font::{Font, GlyphOutline};

const FONT_SIZE: f32 = 1.0;

/// Loads the outlines of `symbols` from a TrueType/OpenType file.
pub fn load_font(filename: &str, symbols: &str) -> Result<Font, FontError> {
    let path_buf = PathBuf::from(filename);
    let font_data = std::fs::read(&path_buf)?;
    let name = path_buf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    Font::from_ttf_data(&name, &font_data, symbols)
}

impl Font {
    /// Builds a font from raw face data, scaled so one em spans 1.0.
    ///
    /// Characters the face does not map fall back to the `.notdef` glyph.
    /// Bitmap and SVG glyphs have no outline and are stored as blanks.
    pub fn from_ttf_data(name: &str, data: &[u8], symbols: &str) -> Result<Font, FontError> {
        let face = ttf::Face::parse(data, 0)?;
        let scale = FONT_SIZE / face.units_per_em() as f32;

        let mut g_map = HashMap::new();
        for ch in symbols.chars() {
            let id = face.glyph_index(ch).unwrap_or_else(|| {
                debug!(?ch, "character not mapped by face, using .notdef");
                ttf::GlyphId(0)
            });
            g_map.insert(u32::from(ch), (ch, id));
        }

        let mut glyphs = HashMap::new();
        for (&cp, &(ch, id)) in &g_map {
            let advance = face.glyph_hor_advance(id).unwrap_or(0) as f32 * scale;
            let glyph = if face.glyph_raster_image(id, u16::MAX).is_some()
                || face.glyph_svg_image(id).is_some()
            {
                warn!(?ch, "bitmap and SVG glyphs are not supported, using a blank glyph");
                GlyphOutline::blank(advance)
            } else {
                let mut builder = Builder::new(scale);
                match face.outline_glyph(id, &mut builder) {
                    Some(_) => GlyphOutline::new(advance, builder.build()),
                    None => GlyphOutline::blank(advance),
                }
            };
            glyphs.insert(cp, glyph);
        }

        let kerning = kerning_pairs(&face, &g_map, scale);
        let pairs: usize = kerning.values().map(HashMap::len).sum();
        debug!(name, glyphs = glyphs.len(), kerning_pairs = pairs, "loaded font");

        Ok(Font {
            name: name.into(),
            ascender: face.ascender() as f32 * scale,
            descender: face.descender() as f32 * scale,
            line_gap: face.line_gap() as f32 * scale,
            glyph_map: glyphs,
            kerning,
        })
    }
}

fn kerning_pairs(
    face: &ttf::Face,
    g_map: &HashMap<u32, (char, ttf::GlyphId)>,
    scale: f32,
) -> HashMap<u32, HashMap<u32, f32>> {
    let mut pairs: HashMap<u32, HashMap<u32, f32>> = HashMap::new();
    let table = match face.tables().kern {
        Some(t) => t,
        None => return pairs,
    };
    for subtable in table.subtables {
        if !subtable.horizontal || subtable.has_cross_stream {
            continue;
        }
        for (&left, &(_, left_id)) in g_map {
            for (&right, &(_, right_id)) in g_map {
                let row = pairs.entry(left).or_default();
                if row.contains_key(&right) {
                    continue;
                }
                if let Some(k) = subtable.glyphs_kerning(left_id, right_id) {
                    if k != 0 {
                        row.insert(right, k as f32 * scale);
                    }
                }
            }
        }
    }
    pairs.retain(|_, row| !row.is_empty());
    pairs
}

struct Builder {
    path: PathBuilder,
    needs_end: bool,
    scale: f32,
}

impl ttf::OutlineBuilder for Builder {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.needs_end {
            self.path.end(false);
        }
        let at = self.point(x, y);
        self.path.begin(at);
        self.needs_end = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let to = self.point(x, y);
        self.path.line_to(to);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let ctrl = self.point(x1, y1);
        let to = self.point(x, y);
        self.path.quadratic_bezier_to(ctrl, to);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let ctrl1 = self.point(x1, y1);
        let ctrl2 = self.point(x2, y2);
        let to = self.point(x, y);
        self.path.cubic_bezier_to(ctrl1, ctrl2, to);
    }

    fn close(&mut self) {
        if self.needs_end {
            self.path.end(true);
            self.needs_end = false;
        }
    }
}

impl Builder {
    fn new(scale: f32) -> Self {
        Builder {
            path: Path::builder(),
            needs_end: false,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> Point {
        point(x * self.scale, y * self.scale)
    }

    fn build(mut self) -> Path {
        if self.needs_end {
            self.path.end(false);
        }
        self.path.build()
    }
}
