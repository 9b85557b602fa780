use std::collections::BTreeSet;

/// Names of the glyphs point graphics can be drawn with.
#[derive(Debug, Default)]
pub struct GlyphModule {
    glyphs: BTreeSet<String>,
}

const STANDARD_GLYPHS: [&str; 16] = [
    "arrow",
    "arrow_solid",
    "axes",
    "axes_solid",
    "cone",
    "cone_solid",
    "cross",
    "cube_solid",
    "cube_wireframe",
    "cylinder",
    "cylinder_solid",
    "diamond",
    "line",
    "point",
    "sheet",
    "sphere",
];

impl GlyphModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_standard_glyphs(&mut self) {
        self.glyphs
            .extend(STANDARD_GLYPHS.iter().map(|name| name.to_string()));
    }

    pub fn find_glyph_by_name(&self, name: &str) -> bool {
        self.glyphs.contains(name)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
