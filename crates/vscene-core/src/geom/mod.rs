//! 2D affine math, bounds, and the quantization helpers shared by the culler,
//! merger, and grid index.

use kurbo::{Affine, Point, Rect, Vec2};

/// Margin added to a stroke's endpoint bound to account for its half-width plus the
/// curve-flattening tolerance. Shared by the scene packer and the spatial grid so both derive
/// identical bounds (§3 invariant, §4.6).
pub const BOUNDS_MARGIN: f64 = 0.35;

/// `scale(M) = (|col0| + |col1|) / 2`, the isotropic scale factor of an affine transform.
///
/// Used to derive a path's stroke half-width from the line width and CTM (§4.1).
#[must_use]
pub fn affine_scale(m: &Affine) -> f64 {
    let c = m.as_coeffs();
    let col0 = Vec2::new(c[0], c[1]).hypot();
    let col1 = Vec2::new(c[2], c[3]).hypot();
    (col0 + col1) / 2.0
}

/// Returns `true` if all six coefficients of `m` are finite.
#[must_use]
pub fn affine_is_finite(m: &Affine) -> bool {
    m.as_coeffs().iter().all(|v| v.is_finite())
}

/// Axis-aligned bound of the two endpoints, expanded by `margin` on every side.
#[must_use]
pub fn endpoint_bounds(p0: Point, p1: Point, margin: f64) -> Rect {
    Rect::from_points(p0, p1).inflate(margin, margin)
}

/// Rounds `v` to the nearest multiple of `step`, returned as an integer grouping key.
///
/// `step` must be strictly positive.
#[must_use]
pub fn quantize(v: f64, step: f64) -> i64 {
    (v / step).round() as i64
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn dist_sq(a: Point, b: Point) -> f64 {
    (a - b).hypot2()
}

/// Squared perpendicular distance from `p` to the infinite chord through `a`-`b`.
///
/// Falls back to the squared distance from `p` to `a` when the chord is degenerate
/// (`a` and `b` coincide), since there is no well-defined direction to project onto.
#[must_use]
pub fn perp_dist_sq(p: Point, a: Point, b: Point) -> f64 {
    let chord = b - a;
    let l2 = chord.hypot2();
    if l2 < 1e-20 {
        return dist_sq(p, a);
    }
    let cross = (p - a).cross(chord);
    cross * cross / l2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_scale_identity() {
        assert!((affine_scale(&Affine::IDENTITY) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_affine_scale_uniform() {
        let m = Affine::scale(2.0);
        assert!((affine_scale(&m) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_affine_is_finite() {
        assert!(affine_is_finite(&Affine::IDENTITY));
        let bad = Affine::new([f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(!affine_is_finite(&bad));
    }

    #[test]
    fn test_endpoint_bounds_margin() {
        let r = endpoint_bounds(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.35);
        assert_eq!(r, Rect::new(-1.35, -1.35, 11.35, 1.35));
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(1.23456, 0.001), 1235);
        assert_eq!(quantize(-1.23456, 0.001), -1235);
    }

    #[test]
    fn test_perp_dist_sq_on_chord() {
        let d = perp_dist_sq(Point::new(5.0, 0.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(d < 1e-12);
    }

    #[test]
    fn test_perp_dist_sq_off_chord() {
        let d = perp_dist_sq(Point::new(5.0, 3.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!((d - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_perp_dist_sq_degenerate_chord() {
        let d = perp_dist_sq(Point::new(3.0, 4.0), Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert!((d - 25.0).abs() < 1e-9);
    }
}
