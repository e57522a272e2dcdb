use std::collections::HashMap;
use lyon::algorithms::aabb::fast_bounding_box;
use lyon::path::Path;
use serde::{Serialize, Deserialize};

/// An owned set of glyph outlines with the metrics needed to lay them out on a baseline.
///
/// Coordinates are in em units: a glyph one em tall spans 1.0 on the y axis.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Font {
    pub name: String,
    pub ascender: f32,
    pub descender: f32,
    pub line_gap: f32,
    pub glyph_map: HashMap<u32, GlyphOutline>,
    /// Left codepoint to right codepoint to horizontal adjustment.
    #[serde(default)]
    pub kerning: HashMap<u32, HashMap<u32, f32>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GlyphOutline {
    pub advance: f32,
    pub bbox: (f32, f32, f32, f32),
    pub outline: Path,
}

impl GlyphOutline {
    /// Control points count towards the bounding box, so curved outlines
    /// get a conservative one.
    pub fn new(advance: f32, outline: Path) -> Self {
        let b = fast_bounding_box(outline.iter());
        GlyphOutline { advance, bbox: (b.min.x, b.min.y, b.max.x, b.max.y), outline }
    }

    /// A glyph that advances the pen but draws nothing, such as a space.
    pub fn blank(advance: f32) -> Self {
        GlyphOutline { advance, bbox: (0.0, 0.0, 0.0, 0.0), outline: Path::new() }
    }
}

impl Font {
    pub fn new(name: &str) -> Self {
        Font { name: name.into(), ..Default::default() }
    }

    pub fn insert_glyph(&mut self, ch: char, glyph: GlyphOutline) {
        self.glyph_map.insert(u32::from(ch), glyph);
    }

    pub fn set_kerning(&mut self, left: char, right: char, adjust: f32) {
        self.kerning
            .entry(u32::from(left))
            .or_default()
            .insert(u32::from(right), adjust);
    }

    pub fn glyph(&self, ch: char) -> Option<&GlyphOutline> {
        self.glyph_map.get(&u32::from(ch))
    }

    /// Horizontal adjustment between two adjacent characters, zero when the pair is not kerned.
    pub fn kerning(&self, left: char, right: char) -> f32 {
        self.kerning
            .get(&u32::from(left))
            .and_then(|row| row.get(&u32::from(right)))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn has_outlines(&self) -> bool {
        !self.glyph_map.is_empty()
    }
}
