//! A small, `Display`-able summary of a build, used by `vscene-cli inspect` and by
//! tests: the place per-document aggregate counts live.

use std::fmt;

use crate::error::BuildDiagnostics;
use crate::scene::vector_scene::VectorScene;

/// Counts and discard tallies for one completed build, detached from the scene
/// itself so it can be serialized or printed without cloning texel arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VectorSceneStats {
    pub page_count: u32,
    pub stroke_count: u32,
    pub fill_path_count: u32,
    pub glyph_count: u32,
    pub text_instance_count: u32,
    pub raster_layer_count: u32,
    pub diagnostics: BuildDiagnostics,
}

impl VectorSceneStats {
    #[must_use]
    pub fn from_scene(scene: &VectorScene, diagnostics: BuildDiagnostics) -> Self {
        Self {
            page_count: scene.counts.page_count,
            stroke_count: scene.counts.stroke_count,
            fill_path_count: scene.counts.fill_path_count,
            glyph_count: scene.counts.glyph_count,
            text_instance_count: scene.counts.text_instance_count,
            raster_layer_count: scene.counts.raster_layer_count,
            diagnostics,
        }
    }
}

impl fmt::Display for VectorSceneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pages:          {}", self.page_count)?;
        writeln!(f, "strokes:        {}", self.stroke_count)?;
        writeln!(f, "fill paths:     {}", self.fill_path_count)?;
        writeln!(f, "glyphs:         {}", self.glyph_count)?;
        writeln!(f, "text instances: {}", self.text_instance_count)?;
        writeln!(f, "raster layers:  {}", self.raster_layer_count)?;
        writeln!(
            f,
            "segments:       {} source -> {} merged ({} strokes survive culling)",
            self.diagnostics.source_segment_count, self.diagnostics.merged_segment_count, self.stroke_count
        )?;
        write!(
            f,
            "discarded:      {} transparent, {} degenerate, {} duplicate, {} contained",
            self.diagnostics.discarded_transparent,
            self.diagnostics.discarded_degenerate,
            self.diagnostics.discarded_duplicate,
            self.diagnostics.discarded_contained
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_counts() {
        let stats = VectorSceneStats { page_count: 2, stroke_count: 10, ..Default::default() };
        let text = stats.to_string();
        assert!(text.contains("pages:          2"));
        assert!(text.contains("strokes:        10"));
    }
}
