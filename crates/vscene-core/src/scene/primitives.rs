//! Intermediate, full-precision primitives the interpreter emits per page, before
//! the packer (§4.6) reduces them to `f32` texel records. Kept separate from the
//! packed [`super::vector_scene::VectorScene`] arrays so the merger and culler can
//! operate on plain `f64` geometry.

use kurbo::Point;

/// A single stroke segment, already merged and culled, ready for packing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmittedStroke {
    pub p0: Point,
    pub p1: Point,
    pub half_width: f64,
    pub luma: f64,
    pub alpha: f64,
}

impl EmittedStroke {
    #[must_use]
    pub fn length_sq(&self) -> f64 {
        (self.p1 - self.p0).hypot2()
    }
}

/// A filled path: boundary segments plus the paint used to fill them.
#[derive(Clone, Debug, PartialEq)]
pub struct EmittedFillPath {
    pub segments: Vec<(Point, Point)>,
    pub color: (f64, f64, f64),
    pub alpha: f64,
    pub even_odd: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmittedGlyph {
    pub id: u32,
    /// Outline segments in glyph-local units.
    pub segments: Vec<(Point, Point)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmittedTextInstance {
    pub glyph_id: u32,
    /// Glyph-space-to-page-space transform for this instance.
    pub transform: kurbo::Affine,
    pub color: (f64, f64, f64),
    pub alpha: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmittedRaster {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major.
    pub rgba8_premultiplied: Vec<u8>,
    pub transform: kurbo::Affine,
}

/// Everything one page's interpreter pass produced, in page-local coordinates.
#[derive(Clone, Debug, Default)]
pub struct PagePrimitives {
    pub strokes: Vec<EmittedStroke>,
    pub fills: Vec<EmittedFillPath>,
    pub glyphs: Vec<EmittedGlyph>,
    pub text_instances: Vec<EmittedTextInstance>,
    pub rasters: Vec<EmittedRaster>,
    pub page_bounds: kurbo::Rect,
}
