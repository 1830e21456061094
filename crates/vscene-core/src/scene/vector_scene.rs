//! The packed, GPU-ready scene (§3): every array is a flat sequence of 4-float
//! texels (`bytemuck::Pod`/`Zeroable` `#[repr(C)]` records), the same fixed-width
//! packing convention a GPU vertex/attribute upload buffer uses, applied here
//! directly on the core data since packing, not upload, is this crate's actual
//! deliverable.

use bytemuck::{Pod, Zeroable};
use kurbo::Rect;

/// One 4-float texel, the fixed channel width every packed array uses (§4.6).
pub type Texel = [f32; 4];

/// Packs `(flags, alpha)` into one float: the integer part holds `flags`, the
/// fractional part holds `alpha` clamped to `[0, 0.999]` so it never rounds up into
/// the next integer and corrupts the flag bits.
#[must_use]
pub fn pack_alpha_and_flags(alpha: f32, flags: u32) -> f32 {
    flags as f32 + alpha.clamp(0.0, 0.999)
}

/// Inverse of [`pack_alpha_and_flags`].
#[must_use]
pub fn unpack_alpha_and_flags(packed: f32) -> (f32, u32) {
    let flags = packed.floor();
    (packed - flags, flags as u32)
}

/// Per-stroke endpoint, style, packed meta, and cached bound arrays, index-aligned
/// (stroke `i`'s data lives at index `i` of every array).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeArrays {
    /// `(x0, y0, x1, y1)`.
    pub endpoints: Vec<Texel>,
    /// `(half_width, r, g, b)`; legacy (format version 1) archives stored a single
    /// luma channel, broadcast into `r`, `g`, `b` on migration.
    pub styles: Vec<Texel>,
    /// `(reserved, reserved, reserved, packed_alpha_and_flags)`.
    pub meta: Vec<Texel>,
    /// `(min_x, min_y, max_x, max_y)`, expanded by half-width plus flatten tolerance;
    /// consumed directly by the spatial grid (§4.6).
    pub bounds: Vec<Texel>,
}

impl StrokeArrays {
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// `(r, g, b, alpha)` plus `(segment_start, segment_count, reserved, even_odd_flag)`
/// per fill path, and the flattened boundary-segment pool they slice into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillArrays {
    pub color: Vec<Texel>,
    pub meta: Vec<Texel>,
    /// `(x0, y0, x1, y1)` boundary segments, concatenated across all fill paths.
    pub segments: Vec<Texel>,
}

/// Glyph outlines, deduplicated by id and referenced from text instances by index,
/// never by pointer (§9).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphArrays {
    pub ids: Vec<u32>,
    /// `(segment_start, segment_count, reserved, reserved)`.
    pub meta: Vec<Texel>,
    /// `(x0, y0, x1, y1)` outline segments in glyph-local units.
    pub segments: Vec<Texel>,
}

/// One instance of a glyph placed on a page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextArrays {
    /// `(a, b, c, d)` of the glyph-to-page transform.
    pub transform_ab: Vec<Texel>,
    /// `(e, f, glyph_index, alpha)`.
    pub transform_meta: Vec<Texel>,
    /// `(r, g, b, reserved)`.
    pub color: Vec<Texel>,
}

/// A raster image placed on a page; stored as raw premultiplied RGBA8 rather than
/// texel-packed, since it's already a pixel grid.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterLayer {
    pub width: u32,
    pub height: u32,
    pub rgba8_premultiplied: Vec<u8>,
    /// `(a, b, c, d, e, f)` placement transform into composed scene space.
    pub transform: [f64; 6],
}

/// Aggregate counts mirrored 1:1 with §3's invariants, kept alongside the arrays so
/// consumers don't need to re-derive them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneCounts {
    pub stroke_count: u32,
    pub fill_path_count: u32,
    pub fill_segment_count: u32,
    pub glyph_count: u32,
    pub glyph_segment_count: u32,
    pub text_instance_count: u32,
    pub raster_layer_count: u32,
    pub page_count: u32,
    pub source_segment_count: u64,
    pub merged_segment_count: u64,
    pub discarded_transparent: u64,
    pub discarded_degenerate: u64,
    pub discarded_duplicate: u64,
    pub discarded_contained: u64,
}

/// The complete, packed scene produced by one successful build (§3).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorScene {
    pub strokes: StrokeArrays,
    pub fills: FillArrays,
    pub glyphs: GlyphArrays,
    pub text: TextArrays,
    pub rasters: Vec<RasterLayer>,
    pub counts: SceneCounts,
    /// Union of per-page primitive bounds, in scene space (§4.5).
    pub bounds: Rect,
    /// Union of the composed page view rectangles, in scene space (§4.5).
    pub page_bounds: Rect,
    /// Placed bound of each page after composition (§4.5).
    pub page_rects: Vec<Rect>,
    /// Column count used when composing pages onto the scene grid. Always at least 1.
    pub pages_per_row: u32,
    pub max_half_width: f32,
}

/// Checks bytemuck record layout compiles to the expected size; exercised as a test
/// rather than asserted at runtime since the layout is fixed at compile time.
const _ASSERT_TEXEL_IS_POD: fn() = || {
    fn assert_pod<T: Pod + Zeroable>() {}
    assert_pod::<Texel>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_alpha_and_flags_round_trip() {
        for flags in 0u32..8 {
            for step in 0..10 {
                let alpha = step as f32 / 10.0;
                let packed = pack_alpha_and_flags(alpha, flags);
                let (unpacked_alpha, unpacked_flags) = unpack_alpha_and_flags(packed);
                assert_eq!(unpacked_flags, flags);
                assert!((unpacked_alpha - alpha.min(0.999)).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_stroke_arrays_len() {
        let mut arrays = StrokeArrays::default();
        assert!(arrays.is_empty());
        arrays.endpoints.push([0.0, 0.0, 1.0, 1.0]);
        assert_eq!(arrays.len(), 1);
    }

    #[test]
    fn test_texel_is_pod() {
        let t: Texel = [1.0, 2.0, 3.0, 4.0];
        let bytes = bytemuck::bytes_of(&t);
        assert_eq!(bytes.len(), 16);
    }
}
