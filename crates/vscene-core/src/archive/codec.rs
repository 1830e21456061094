//! Reads and writes the on-disk archive (§4.8): a directory holding a JSON manifest
//! plus one raw binary file per non-empty texture and raster layer. Compression is
//! explicitly out of scope here: this crate owns the container layout, not a
//! general-purpose compressor (§1).

use std::path::Path;

use crate::error::SceneError;
use crate::geom::BOUNDS_MARGIN;
use crate::scene::packer::derive_stroke_bound;
use crate::scene::vector_scene::{FillArrays, GlyphArrays, RasterLayer, SceneCounts, StrokeArrays, TextArrays, Texel, VectorScene};

use super::manifest::{
    ChannelLayout, Manifest, RasterDescriptor, RasterFormat, SceneManifestCounts, SceneManifestGeometry, TextureDescriptor, TextureKind,
    CURRENT_FORMAT_VERSION,
};

/// Legacy (format version 1) stroke half-width, substituted when migrating a
/// single-channel luma-only stroke style texture (§9 legacy layout migration).
const LEGACY_DEFAULT_HALF_WIDTH: f32 = 1.0;

fn write_texels(dir: &Path, file_name: &str, data: &[Texel]) -> Result<Option<String>, SceneError> {
    if data.is_empty() {
        return Ok(None);
    }
    std::fs::write(dir.join(file_name), bytemuck::cast_slice(data))?;
    Ok(Some(file_name.to_string()))
}

fn texture_descriptor(kind: TextureKind, file: Option<String>, element_count: usize) -> Option<TextureDescriptor> {
    file.map(|file| TextureDescriptor { kind, element_count: element_count as u32, channel_layout: ChannelLayout::Interleaved, file })
}

/// Writes `scene` into `dir`, which must already exist. `source_pdf_file` is carried
/// through to the manifest purely as provenance metadata.
pub fn write_archive(dir: &Path, scene: &VectorScene, source_pdf_file: Option<String>) -> Result<(), SceneError> {
    let mut textures = Vec::new();

    let s = &scene.strokes;
    if let Some(d) = texture_descriptor(TextureKind::StrokeEndpoints, write_texels(dir, "stroke_endpoints.bin", &s.endpoints)?, s.len()) {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::StrokeStyles, write_texels(dir, "stroke_styles.bin", &s.styles)?, s.len()) {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::StrokeMeta, write_texels(dir, "stroke_meta.bin", &s.meta)?, s.len()) {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::StrokeBounds, write_texels(dir, "stroke_bounds.bin", &s.bounds)?, s.len()) {
        textures.push(d);
    }

    let f = &scene.fills;
    if let Some(d) = texture_descriptor(TextureKind::FillColor, write_texels(dir, "fill_color.bin", &f.color)?, f.color.len()) {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::FillMeta, write_texels(dir, "fill_meta.bin", &f.meta)?, f.meta.len()) {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::FillSegments, write_texels(dir, "fill_segments.bin", &f.segments)?, f.segments.len()) {
        textures.push(d);
    }

    let g = &scene.glyphs;
    if let Some(d) = texture_descriptor(TextureKind::GlyphMeta, write_texels(dir, "glyph_meta.bin", &g.meta)?, g.meta.len()) {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::GlyphSegments, write_texels(dir, "glyph_segments.bin", &g.segments)?, g.segments.len()) {
        textures.push(d);
    }
    let glyph_ids_file = if g.ids.is_empty() {
        None
    } else {
        std::fs::write(dir.join("glyph_ids.bin"), bytemuck::cast_slice(&g.ids))?;
        Some("glyph_ids.bin".to_string())
    };

    let t = &scene.text;
    if let Some(d) = texture_descriptor(TextureKind::TextTransformAb, write_texels(dir, "text_transform_ab.bin", &t.transform_ab)?, t.transform_ab.len()) {
        textures.push(d);
    }
    if let Some(d) =
        texture_descriptor(TextureKind::TextTransformMeta, write_texels(dir, "text_transform_meta.bin", &t.transform_meta)?, t.transform_meta.len())
    {
        textures.push(d);
    }
    if let Some(d) = texture_descriptor(TextureKind::TextColor, write_texels(dir, "text_color.bin", &t.color)?, t.color.len()) {
        textures.push(d);
    }

    let mut rasters = Vec::new();
    for (i, raster) in scene.rasters.iter().enumerate() {
        let file = format!("raster_{i}.rgba");
        std::fs::write(dir.join(&file), &raster.rgba8_premultiplied)?;
        rasters.push(RasterDescriptor { width: raster.width, height: raster.height, format: RasterFormat::Raw, transform: raster.transform, file });
    }

    let manifest = Manifest {
        format_version: CURRENT_FORMAT_VERSION,
        counts: SceneManifestCounts {
            page_count: scene.counts.page_count,
            stroke_count: scene.counts.stroke_count,
            fill_path_count: scene.counts.fill_path_count,
            fill_segment_count: scene.counts.fill_segment_count,
            glyph_count: scene.counts.glyph_count,
            glyph_segment_count: scene.counts.glyph_segment_count,
            text_instance_count: scene.counts.text_instance_count,
            raster_layer_count: scene.counts.raster_layer_count,
            source_segment_count: scene.counts.source_segment_count,
            merged_segment_count: scene.counts.merged_segment_count,
            discarded_transparent: scene.counts.discarded_transparent,
            discarded_degenerate: scene.counts.discarded_degenerate,
            discarded_duplicate: scene.counts.discarded_duplicate,
            discarded_contained: scene.counts.discarded_contained,
        },
        geometry: SceneManifestGeometry {
            bounds: [scene.bounds.x0, scene.bounds.y0, scene.bounds.x1, scene.bounds.y1],
            page_bounds: [scene.page_bounds.x0, scene.page_bounds.y0, scene.page_bounds.x1, scene.page_bounds.y1],
            page_rects: scene.page_rects.iter().map(|r| [r.x0, r.y0, r.x1, r.y1]).collect(),
            pages_per_row: scene.pages_per_row,
            max_half_width: scene.max_half_width,
        },
        textures,
        rasters,
        glyph_ids_file,
        source_pdf_file,
    };

    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(dir.join("manifest.json"), json)?;
    Ok(())
}

fn read_texels(dir: &Path, desc: &TextureDescriptor) -> Result<Vec<Texel>, SceneError> {
    let bytes = std::fs::read(dir.join(&desc.file))?;
    let expected = desc.element_count as usize * 16;
    if bytes.len() < expected {
        return Err(SceneError::TruncatedTexture { name: desc.file.clone(), expected, found: bytes.len() });
    }
    match desc.channel_layout {
        ChannelLayout::Interleaved => {
            let texels: &[Texel] = bytemuck::cast_slice(&bytes[..expected]);
            Ok(texels.to_vec())
        }
        ChannelLayout::ChannelMajor => {
            let floats: &[f32] = bytemuck::cast_slice(&bytes[..expected]);
            let n = desc.element_count as usize;
            let mut out = Vec::with_capacity(n);
            for i in 0..n {
                out.push([floats[i], floats[n + i], floats[2 * n + i], floats[3 * n + i]]);
            }
            Ok(out)
        }
    }
}

/// Reads a legacy (format version 1) single-channel luma texture, broadcasting each
/// value into a `(half_width, luma, luma, luma)` style record (§9 legacy layout).
fn read_legacy_stroke_styles(dir: &Path, desc: &TextureDescriptor) -> Result<Vec<Texel>, SceneError> {
    let bytes = std::fs::read(dir.join(&desc.file))?;
    let expected = desc.element_count as usize * 4;
    if bytes.len() < expected {
        return Err(SceneError::TruncatedTexture { name: desc.file.clone(), expected, found: bytes.len() });
    }
    let lumas: &[f32] = bytemuck::cast_slice(&bytes[..expected]);
    Ok(lumas.iter().map(|&luma| [LEGACY_DEFAULT_HALF_WIDTH, luma, luma, luma]).collect())
}

/// Reads an archive directory back into a [`VectorScene`]. Missing non-essential
/// textures are reconstructed rather than treated as errors: a missing stroke-bounds
/// texture is derived from endpoints and styles (§9 "derived textures").
pub fn read_archive(dir: &Path) -> Result<VectorScene, SceneError> {
    let manifest_bytes = std::fs::read(dir.join("manifest.json"))?;
    let manifest: Manifest = serde_json::from_slice(&manifest_bytes)?;

    let find = |kind: TextureKind| manifest.textures.iter().find(|d| d.kind == kind);

    let mut strokes = StrokeArrays::default();
    if let Some(d) = find(TextureKind::StrokeEndpoints) {
        strokes.endpoints = read_texels(dir, d)?;
    }
    if let Some(d) = find(TextureKind::StrokeStyles) {
        strokes.styles = if manifest.format_version < CURRENT_FORMAT_VERSION && d.element_count as usize * 16 != std::fs::metadata(dir.join(&d.file))?.len() as usize {
            read_legacy_stroke_styles(dir, d)?
        } else {
            read_texels(dir, d)?
        };
    }
    if let Some(d) = find(TextureKind::StrokeMeta) {
        strokes.meta = read_texels(dir, d)?;
    } else if !strokes.endpoints.is_empty() {
        strokes.meta = vec![[0.0, 0.0, 0.0, crate::scene::vector_scene::pack_alpha_and_flags(1.0, 0)]; strokes.endpoints.len()];
    }
    strokes.bounds = if let Some(d) = find(TextureKind::StrokeBounds) {
        read_texels(dir, d)?
    } else {
        strokes
            .endpoints
            .iter()
            .zip(strokes.styles.iter().chain(std::iter::repeat(&[BOUNDS_MARGIN as f32, 0.0, 0.0, 0.0])))
            .map(|(e, s)| derive_stroke_bound(*e, s[0]))
            .collect()
    };

    let mut fills = FillArrays::default();
    if let Some(d) = find(TextureKind::FillColor) {
        fills.color = read_texels(dir, d)?;
    }
    if let Some(d) = find(TextureKind::FillMeta) {
        fills.meta = read_texels(dir, d)?;
    }
    if let Some(d) = find(TextureKind::FillSegments) {
        fills.segments = read_texels(dir, d)?;
    }

    let mut glyphs = GlyphArrays::default();
    if let Some(d) = find(TextureKind::GlyphMeta) {
        glyphs.meta = read_texels(dir, d)?;
    }
    if let Some(d) = find(TextureKind::GlyphSegments) {
        glyphs.segments = read_texels(dir, d)?;
    }
    if let Some(file) = &manifest.glyph_ids_file {
        let bytes = std::fs::read(dir.join(file))?;
        glyphs.ids = bytemuck::cast_slice(&bytes).to_vec();
    }

    let mut text = TextArrays::default();
    if let Some(d) = find(TextureKind::TextTransformAb) {
        text.transform_ab = read_texels(dir, d)?;
    }
    if let Some(d) = find(TextureKind::TextTransformMeta) {
        text.transform_meta = read_texels(dir, d)?;
    }
    if let Some(d) = find(TextureKind::TextColor) {
        text.color = read_texels(dir, d)?;
    }

    let mut rasters = Vec::new();
    for desc in &manifest.rasters {
        let bytes = std::fs::read(dir.join(&desc.file))?;
        let expected = desc.width as usize * desc.height as usize * 4;
        if bytes.len() < expected {
            return Err(SceneError::TruncatedTexture { name: desc.file.clone(), expected, found: bytes.len() });
        }
        rasters.push(RasterLayer { width: desc.width, height: desc.height, rgba8_premultiplied: bytes, transform: desc.transform });
    }

    let counts = SceneCounts {
        stroke_count: strokes.len() as u32,
        fill_path_count: manifest.counts.fill_path_count,
        fill_segment_count: manifest.counts.fill_segment_count,
        glyph_count: manifest.counts.glyph_count,
        glyph_segment_count: manifest.counts.glyph_segment_count,
        text_instance_count: manifest.counts.text_instance_count,
        raster_layer_count: manifest.counts.raster_layer_count,
        page_count: manifest.counts.page_count,
        source_segment_count: manifest.counts.source_segment_count,
        merged_segment_count: manifest.counts.merged_segment_count,
        discarded_transparent: manifest.counts.discarded_transparent,
        discarded_degenerate: manifest.counts.discarded_degenerate,
        discarded_duplicate: manifest.counts.discarded_duplicate,
        discarded_contained: manifest.counts.discarded_contained,
    };

    let bounds = kurbo::Rect::new(
        manifest.geometry.bounds[0],
        manifest.geometry.bounds[1],
        manifest.geometry.bounds[2],
        manifest.geometry.bounds[3],
    );
    let page_bounds = kurbo::Rect::new(
        manifest.geometry.page_bounds[0],
        manifest.geometry.page_bounds[1],
        manifest.geometry.page_bounds[2],
        manifest.geometry.page_bounds[3],
    );
    let page_rects = manifest.geometry.page_rects.iter().map(|r| kurbo::Rect::new(r[0], r[1], r[2], r[3])).collect();

    Ok(VectorScene {
        strokes,
        fills,
        glyphs,
        text,
        rasters,
        counts,
        bounds,
        page_bounds,
        page_rects,
        pages_per_row: manifest.geometry.pages_per_row.max(1),
        max_half_width: manifest.geometry.max_half_width,
    })
}
