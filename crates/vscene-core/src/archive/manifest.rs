//! The archive's JSON manifest (§4.8): describes which texture files make up a
//! scene, their shape, and the channel layout used to write them, so the binary
//! payloads themselves stay a flat, format-agnostic blob.

use serde::{Deserialize, Serialize};

/// Current manifest format version. Version 1 stored stroke style textures as a
/// single-channel luma broadcast with no half-width channel (§9 legacy layout); see
/// [`super::codec::read_archive`] for the migration this crate performs on load.
/// Version 2 dropped the provenance and discard counts and the `page_bounds`/
/// `pages_per_row` geometry fields now carried in version 3.
pub const CURRENT_FORMAT_VERSION: u32 = 3;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    /// `[r0, g0, b0, a0, r1, g1, b1, a1, ...]`
    Interleaved,
    /// `[r0, r1, ..., g0, g1, ..., b0, b1, ..., a0, a1, ...]`
    ChannelMajor,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    StrokeEndpoints,
    StrokeStyles,
    StrokeMeta,
    StrokeBounds,
    FillColor,
    FillMeta,
    FillSegments,
    GlyphMeta,
    GlyphSegments,
    TextTransformAb,
    TextTransformMeta,
    TextColor,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TextureDescriptor {
    pub kind: TextureKind,
    /// Number of 4-float records; texture pixel dimensions are derived from this at
    /// load time rather than trusted from the manifest (§4.6 `ceil(sqrt(n))` rule).
    pub element_count: u32,
    pub channel_layout: ChannelLayout,
    /// File name relative to the archive directory.
    pub file: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RasterFormat {
    /// Raw premultiplied RGBA8, row-major, uncompressed.
    Raw,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RasterDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: RasterFormat,
    pub transform: [f64; 6],
    pub file: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SceneManifestCounts {
    pub page_count: u32,
    pub stroke_count: u32,
    pub fill_path_count: u32,
    pub fill_segment_count: u32,
    pub glyph_count: u32,
    pub glyph_segment_count: u32,
    pub text_instance_count: u32,
    pub raster_layer_count: u32,
    pub source_segment_count: u64,
    pub merged_segment_count: u64,
    pub discarded_transparent: u64,
    pub discarded_degenerate: u64,
    pub discarded_duplicate: u64,
    pub discarded_contained: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SceneManifestGeometry {
    pub bounds: [f64; 4],
    pub page_bounds: [f64; 4],
    pub page_rects: Vec<[f64; 4]>,
    pub pages_per_row: u32,
    pub max_half_width: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub format_version: u32,
    pub counts: SceneManifestCounts,
    pub geometry: SceneManifestGeometry,
    pub textures: Vec<TextureDescriptor>,
    pub rasters: Vec<RasterDescriptor>,
    /// File holding the raw `u32` glyph-id array, index-aligned with the
    /// `GlyphMeta`/`GlyphSegments` textures. `None` when the scene has no glyphs.
    pub glyph_ids_file: Option<String>,
    pub source_pdf_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_round_trips_through_json() {
        let manifest = Manifest {
            format_version: CURRENT_FORMAT_VERSION,
            counts: SceneManifestCounts {
                page_count: 1,
                stroke_count: 2,
                fill_path_count: 0,
                fill_segment_count: 0,
                glyph_count: 0,
                glyph_segment_count: 0,
                text_instance_count: 0,
                raster_layer_count: 0,
                source_segment_count: 2,
                merged_segment_count: 2,
                discarded_transparent: 0,
                discarded_degenerate: 0,
                discarded_duplicate: 0,
                discarded_contained: 0,
            },
            geometry: SceneManifestGeometry {
                bounds: [0.0, 0.0, 10.0, 10.0],
                page_bounds: [0.0, 0.0, 10.0, 10.0],
                page_rects: vec![[0.0, 0.0, 10.0, 10.0]],
                pages_per_row: 1,
                max_half_width: 1.0,
            },
            textures: vec![TextureDescriptor {
                kind: TextureKind::StrokeEndpoints,
                element_count: 2,
                channel_layout: ChannelLayout::Interleaved,
                file: "stroke_endpoints.bin".to_string(),
            }],
            rasters: Vec::new(),
            glyph_ids_file: None,
            source_pdf_file: None,
        };
        let json = serde_json::to_string(&manifest).unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manifest);
    }
}
