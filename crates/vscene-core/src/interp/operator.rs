//! The operator vocabulary an [`OperatorSource`](crate::provider::OperatorSource)
//! yields per page: the PDF-like subset named in §4.1 (`save`/`restore`/CTM/path
//! construction/paint) plus the text-run and raster families added in
//! SPEC_FULL.md §4 to populate the data model's text/glyph/raster arrays.

use crate::color::ColorInput;

/// One subcommand of a `construct_path` operator's packed path data, already
/// decoded from its wire form (§4.1: `{MoveTo=0, LineTo=1, CurveTo=2, QuadTo=3,
/// Close=4}`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegmentOp {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    QuadTo(f64, f64, f64, f64),
    Close,
}

/// How a constructed path is painted. Even-odd vs. nonzero winding only matters for
/// fills; stroke-only paint ops ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOp {
    Stroke,
    CloseStroke,
    Fill,
    FillEvenOdd,
    FillStroke,
    FillEvenOddStroke,
    CloseFillStroke,
    CloseFillEvenOddStroke,
}

impl PaintOp {
    #[must_use]
    pub fn strokes(self) -> bool {
        matches!(
            self,
            PaintOp::Stroke
                | PaintOp::CloseStroke
                | PaintOp::FillStroke
                | PaintOp::FillEvenOddStroke
                | PaintOp::CloseFillStroke
                | PaintOp::CloseFillEvenOddStroke
        )
    }

    #[must_use]
    pub fn fills(self) -> bool {
        matches!(
            self,
            PaintOp::Fill
                | PaintOp::FillEvenOdd
                | PaintOp::FillStroke
                | PaintOp::FillEvenOddStroke
                | PaintOp::CloseFillStroke
                | PaintOp::CloseFillEvenOddStroke
        )
    }

    #[must_use]
    pub fn closes_implicitly(self) -> bool {
        matches!(
            self,
            PaintOp::CloseStroke | PaintOp::CloseFillStroke | PaintOp::CloseFillEvenOddStroke
        )
    }

    #[must_use]
    pub fn even_odd(self) -> bool {
        matches!(self, PaintOp::FillEvenOdd | PaintOp::FillEvenOddStroke | PaintOp::CloseFillEvenOddStroke)
    }
}

/// A 6-element row-major affine matrix `[a, b, c, d, e, f]`, the wire shape a CTM or
/// text matrix arrives in before being lifted to `kurbo::Affine`.
pub type MatrixArgs = [f64; 6];

/// One decoded operator from the page's operator stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    Save,
    Restore,
    ConcatMatrix(MatrixArgs),
    SetLineWidth(f64),
    SetStrokeColor(ColorInput),
    SetFillColor(ColorInput),
    SetStrokeAlpha(f64),
    SetFillAlpha(f64),
    ConstructPath { paint: PaintOp, data: Vec<f64> },
    BeginText,
    SetTextMatrix(MatrixArgs),
    DefineGlyph { id: u32, segments: Vec<f64> },
    ShowGlyphs { glyph_ids: Vec<u32>, advances: Vec<f64> },
    EndText,
    DrawRaster { width: u32, height: u32, rgba8: Vec<u8>, matrix: MatrixArgs },
    /// An operator name the interpreter doesn't recognize: skipped, tallied, never
    /// fatal (§4.1, §7).
    Unknown(String),
}
