//! Colour parsing and the luma reduction used for stroke colour, grounded in
//! `vsvg::color::Color`'s gray/rgb constructors and `to_rgba` packing.

/// Rec. 709 relative luma weights, used to collapse a stroke colour to the single
/// scalar the scene format stores per stroke (§3 `stroke_styles`).
const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.7152;
const LUMA_B: f64 = 0.0722;

/// A colour value as produced by an operator-stream colour-setting opcode, before it
/// is reduced to the representation the scene actually stores.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorInput {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
}

impl ColorInput {
    /// Collapses any colour model to `(r, g, b)` in `[0, 1]`, clamping out-of-range
    /// components rather than rejecting them (operator streams are not trusted input).
    #[must_use]
    pub fn to_rgb(self) -> (f64, f64, f64) {
        let (r, g, b) = match self {
            ColorInput::Gray(v) => (v, v, v),
            ColorInput::Rgb(r, g, b) => (r, g, b),
            ColorInput::Cmyk(c, m, y, k) => cmyk_to_rgb(c, m, y, k),
        };
        (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Reduces the colour directly to luma, the form strokes are stored in.
    #[must_use]
    pub fn to_luma(self) -> f64 {
        let (r, g, b) = self.to_rgb();
        luma(r, g, b)
    }
}

/// Naive under-colour-removal CMYK to RGB conversion: `r = (1-c)(1-k)`, etc.
#[must_use]
pub fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> (f64, f64, f64) {
    let r = (1.0 - c) * (1.0 - k);
    let g = (1.0 - m) * (1.0 - k);
    let b = (1.0 - y) * (1.0 - k);
    (r, g, b)
}

/// Rec. 709 luma of an RGB triple already in `[0, 1]`.
#[must_use]
pub fn luma(r: f64, g: f64, b: f64) -> f64 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Premultiplies straight alpha `(r, g, b, a)` into premultiplied form, the
/// convention raster layers and composited textures use (§9 Design Notes).
#[must_use]
pub fn premultiply(r: f64, g: f64, b: f64, a: f64) -> (f64, f64, f64, f64) {
    (r * a, g * a, b * a, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gray_to_rgb() {
        assert_eq!(ColorInput::Gray(0.5).to_rgb(), (0.5, 0.5, 0.5));
    }

    #[test]
    fn test_cmyk_black() {
        let (r, g, b) = cmyk_to_rgb(0.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(r, 0.0);
        assert_abs_diff_eq!(g, 0.0);
        assert_abs_diff_eq!(b, 0.0);
    }

    #[test]
    fn test_cmyk_white() {
        let (r, g, b) = cmyk_to_rgb(0.0, 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(r, 1.0);
        assert_abs_diff_eq!(g, 1.0);
        assert_abs_diff_eq!(b, 1.0);
    }

    #[test]
    fn test_luma_white_is_one() {
        assert_abs_diff_eq!(luma(1.0, 1.0, 1.0), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_luma_black_is_zero() {
        assert_abs_diff_eq!(luma(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_clamp_out_of_range() {
        assert_eq!(ColorInput::Gray(1.5).to_rgb(), (1.0, 1.0, 1.0));
        assert_eq!(ColorInput::Gray(-0.5).to_rgb(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_premultiply() {
        let (r, g, b, a) = premultiply(1.0, 0.5, 0.2, 0.5);
        assert_abs_diff_eq!(r, 0.5);
        assert_abs_diff_eq!(g, 0.25);
        assert_abs_diff_eq!(b, 0.1);
        assert_abs_diff_eq!(a, 0.5);
    }
}
