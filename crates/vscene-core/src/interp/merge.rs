//! Collinear-join segment merger (§4.3): consecutive straight segments of the same
//! subpath are folded into one when they're nearly collinear and end-to-end
//! adjacent, shrinking long straight-line drafting runs to a handful of strokes.
//! Curve-derived segments never merge, even when the flattened chords happen to
//! line up.

use kurbo::Point;

/// Endpoint adjacency tolerance, squared (§4.3).
const JOIN_DIST_SQ: f64 = 1e-6;
/// Minimum cosine of the angle between consecutive directions to treat them as
/// collinear (§4.3).
const COLLINEAR_COS: f64 = 0.999995;
/// Maximum perpendicular deviation of the joint from the combined chord (§4.3).
const COMBINED_CHORD_DEVIATION: f64 = 0.05;

fn should_merge(ps: Point, pe: Point, ns: Point, ne: Point) -> bool {
    if (pe - ns).hypot2() > JOIN_DIST_SQ {
        return false;
    }
    let d1 = pe - ps;
    let d2 = ne - ns;
    let len1 = d1.hypot();
    let len2 = d2.hypot();
    if len1 < 1e-12 || len2 < 1e-12 {
        return false;
    }
    let cos_theta = d1.dot(d2) / (len1 * len2);
    if cos_theta < COLLINEAR_COS {
        return false;
    }
    let chord = ne - ps;
    let chord_len2 = chord.hypot2();
    if chord_len2 < 1e-20 {
        return true;
    }
    let cross = (pe - ps).cross(chord);
    let dist = (cross * cross / chord_len2).sqrt();
    dist <= COMBINED_CHORD_DEVIATION
}

/// Folds consecutive mergeable straight segments within one subpath run.
///
/// Callers flush (call [`SegmentMerger::flush`]) on every `MoveTo` and at the end of
/// the path: merging never crosses a subpath boundary.
#[derive(Debug, Default)]
pub struct SegmentMerger {
    pending: Option<(Point, Point)>,
}

impl SegmentMerger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one geometric segment. `allow_merge` is `false` for segments produced
    /// by flattening a curve (§4.3): those always flush immediately and are emitted
    /// as-is.
    pub fn push(&mut self, p0: Point, p1: Point, allow_merge: bool, out: &mut Vec<(Point, Point)>) {
        if !allow_merge {
            self.flush(out);
            out.push((p0, p1));
            return;
        }
        match self.pending {
            None => self.pending = Some((p0, p1)),
            Some((ps, pe)) => {
                if should_merge(ps, pe, p0, p1) {
                    self.pending = Some((ps, p1));
                } else {
                    out.push((ps, pe));
                    self.pending = Some((p0, p1));
                }
            }
        }
    }

    /// Emits the pending segment, if any, and clears it.
    pub fn flush(&mut self, out: &mut Vec<(Point, Point)>) {
        if let Some(seg) = self.pending.take() {
            out.push(seg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_collinear_adjacent_segments() {
        let mut m = SegmentMerger::new();
        let mut out = Vec::new();
        m.push(Point::new(0.0, 0.0), Point::new(5.0, 0.0), true, &mut out);
        m.push(Point::new(5.0, 0.0), Point::new(10.0, 0.0), true, &mut out);
        m.flush(&mut out);
        assert_eq!(out, vec![(Point::new(0.0, 0.0), Point::new(10.0, 0.0))]);
    }

    #[test]
    fn test_does_not_merge_across_angle() {
        let mut m = SegmentMerger::new();
        let mut out = Vec::new();
        m.push(Point::new(0.0, 0.0), Point::new(5.0, 0.0), true, &mut out);
        m.push(Point::new(5.0, 0.0), Point::new(5.0, 5.0), true, &mut out);
        m.flush(&mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_does_not_merge_non_adjacent() {
        let mut m = SegmentMerger::new();
        let mut out = Vec::new();
        m.push(Point::new(0.0, 0.0), Point::new(5.0, 0.0), true, &mut out);
        m.push(Point::new(6.0, 0.0), Point::new(10.0, 0.0), true, &mut out);
        m.flush(&mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_curve_derived_segments_never_merge() {
        let mut m = SegmentMerger::new();
        let mut out = Vec::new();
        m.push(Point::new(0.0, 0.0), Point::new(5.0, 0.0), false, &mut out);
        m.push(Point::new(5.0, 0.0), Point::new(10.0, 0.0), false, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_flush_on_moveto_prevents_cross_subpath_merge() {
        let mut m = SegmentMerger::new();
        let mut out = Vec::new();
        m.push(Point::new(0.0, 0.0), Point::new(5.0, 0.0), true, &mut out);
        m.flush(&mut out); // subpath boundary
        m.push(Point::new(5.0, 0.0), Point::new(10.0, 0.0), true, &mut out);
        m.flush(&mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_merge_chain_of_three() {
        let mut m = SegmentMerger::new();
        let mut out = Vec::new();
        m.push(Point::new(0.0, 0.0), Point::new(3.0, 0.0), true, &mut out);
        m.push(Point::new(3.0, 0.0), Point::new(6.0, 0.0), true, &mut out);
        m.push(Point::new(6.0, 0.0), Point::new(9.0, 0.0), true, &mut out);
        m.flush(&mut out);
        assert_eq!(out, vec![(Point::new(0.0, 0.0), Point::new(9.0, 0.0))]);
    }
}
