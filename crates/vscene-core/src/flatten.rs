//! Adaptive curve flattening: cubic and quadratic Béziers reduced to polylines
//! by recursive de Casteljau subdivision, bounded by a flatness tolerance and a
//! maximum recursion depth (§4.2).
//!
//! This is a bespoke subdivision rather than `kurbo`'s own `flatten` helper: the
//! tolerance test below (perpendicular deviation of both control points against the
//! chord, in squared form) and the fixed depth cap are part of the contract this
//! crate promises its callers, not an incidental implementation detail.

use kurbo::Point;

/// Default perpendicular-deviation tolerance, in scene units (§4.2).
pub const DEFAULT_FLATNESS: f64 = 0.35;

/// Default maximum subdivision depth (§4.2): bounds worst-case output size.
pub const DEFAULT_MAX_DEPTH: u32 = 9;

fn mid(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Squared perpendicular deviation of a cubic's control points from its chord.
///
/// Degenerate chords (`p0 == p3`) fall back to the squared distance of each control
/// point from `p0`, since there is no chord to project onto.
fn max_dev_sq(p0: Point, p1: Point, p2: Point, p3: Point) -> f64 {
    let chord = p3 - p0;
    let l2 = chord.hypot2();
    if l2 < 1e-20 {
        let d1 = (p1 - p0).hypot2();
        let d2 = (p2 - p0).hypot2();
        return d1.max(d2);
    }
    let cross1 = (p1 - p0).cross(chord);
    let cross2 = (p2 - p0).cross(chord);
    (cross1 * cross1 / l2).max(cross2 * cross2 / l2)
}

struct CubicSpan {
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    depth: u32,
}

/// Flattens a cubic Bézier into a polyline, returned as the sequence of points
/// strictly after `p0` (callers already hold `p0` as their current point).
///
/// Output is in curve order: the last point is always `p3`.
#[must_use]
pub fn flatten_cubic(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    flatness: f64,
    max_depth: u32,
) -> Vec<Point> {
    let tolerance_sq = flatness * flatness;
    let mut out = Vec::new();
    // Explicit stack, right-span pushed before left so popping (LIFO) visits the
    // curve in order without recursion.
    let mut stack = vec![CubicSpan { p0, p1, p2, p3, depth: 0 }];
    while let Some(span) = stack.pop() {
        if span.depth >= max_depth || max_dev_sq(span.p0, span.p1, span.p2, span.p3) <= tolerance_sq {
            out.push(span.p3);
            continue;
        }
        let p01 = mid(span.p0, span.p1);
        let p12 = mid(span.p1, span.p2);
        let p23 = mid(span.p2, span.p3);
        let p012 = mid(p01, p12);
        let p123 = mid(p12, p23);
        let p0123 = mid(p012, p123);
        stack.push(CubicSpan { p0: p0123, p1: p123, p2: p23, p3: span.p3, depth: span.depth + 1 });
        stack.push(CubicSpan { p0: span.p0, p1: p01, p2: p012, p3: p0123, depth: span.depth + 1 });
    }
    out
}

/// Flattens a quadratic Bézier by degree-elevating it to a cubic, then flattening
/// that with [`flatten_cubic`].
#[must_use]
pub fn flatten_quad(p0: Point, p1: Point, p2: Point, flatness: f64, max_depth: u32) -> Vec<Point> {
    let c1 = p0 + (p1 - p0) * (2.0 / 3.0);
    let c2 = p2 + (p1 - p2) * (2.0 / 3.0);
    flatten_cubic(p0, c1, c2, p2, flatness, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flatten_straight_cubic_collapses_to_one_point() {
        let p0 = Point::new(0.0, 0.0);
        let p3 = Point::new(10.0, 0.0);
        let p1 = Point::new(3.0, 0.0);
        let p2 = Point::new(7.0, 0.0);
        let out = flatten_cubic(p0, p1, p2, p3, DEFAULT_FLATNESS, DEFAULT_MAX_DEPTH);
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0].x, 10.0);
    }

    #[test]
    fn test_flatten_ends_at_p3() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(0.0, 50.0);
        let p2 = Point::new(50.0, 50.0);
        let p3 = Point::new(50.0, 0.0);
        let out = flatten_cubic(p0, p1, p2, p3, DEFAULT_FLATNESS, DEFAULT_MAX_DEPTH);
        let last = *out.last().unwrap();
        assert_abs_diff_eq!(last.x, 50.0);
        assert_abs_diff_eq!(last.y, 0.0);
    }

    #[test]
    fn test_flatten_respects_depth_cap() {
        // A curve with a huge bow forces maximal subdivision; with max_depth = d the
        // output can have at most 2^d segments.
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(0.0, 1e6);
        let p2 = Point::new(100.0, -1e6);
        let p3 = Point::new(100.0, 0.0);
        let max_depth = 4;
        let out = flatten_cubic(p0, p1, p2, p3, 0.01, max_depth);
        assert!(out.len() <= 1 << max_depth);
    }

    #[test]
    fn test_tighter_flatness_yields_more_points() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(0.0, 10.0);
        let p2 = Point::new(10.0, 10.0);
        let p3 = Point::new(10.0, 0.0);
        let coarse = flatten_cubic(p0, p1, p2, p3, 2.0, DEFAULT_MAX_DEPTH);
        let fine = flatten_cubic(p0, p1, p2, p3, 0.01, DEFAULT_MAX_DEPTH);
        assert!(fine.len() >= coarse.len());
    }

    #[test]
    fn test_flatten_quad_matches_elevated_cubic() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(5.0, 10.0);
        let p2 = Point::new(10.0, 0.0);
        let out = flatten_quad(p0, p1, p2, DEFAULT_FLATNESS, DEFAULT_MAX_DEPTH);
        assert!(!out.is_empty());
        let last = *out.last().unwrap();
        assert_abs_diff_eq!(last.x, 10.0);
        assert_abs_diff_eq!(last.y, 0.0);
    }

    #[test]
    fn test_degenerate_chord_still_terminates() {
        let p0 = Point::new(1.0, 1.0);
        let p1 = Point::new(2.0, 1.0);
        let p2 = Point::new(1.0, 2.0);
        let p3 = Point::new(1.0, 1.0);
        let out = flatten_cubic(p0, p1, p2, p3, DEFAULT_FLATNESS, DEFAULT_MAX_DEPTH);
        assert!(!out.is_empty());
    }
}
