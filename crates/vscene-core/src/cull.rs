//! The visibility culler (§4.4): four sequential filters applied to a page's
//! merged stroke segments, each operating on the survivors of the previous one.
//! Relative input order is preserved among survivors throughout.

use std::collections::{HashMap, HashSet};

use kurbo::{Point, Vec2};

use crate::error::BuildDiagnostics;
use crate::geom::quantize;
use crate::scene::primitives::EmittedStroke;

const TRANSPARENT_ALPHA: f64 = 1e-3;
const DEGENERATE_LENGTH_SQ: f64 = 1e-10;
const DUP_POSITION_STEP: f64 = 0.001;
const DUP_STYLE_STEP: f64 = 0.0001;
const GROUP_DIRECTION_STEP: f64 = 1e-5;
const GROUP_OFFSET_STEP: f64 = 0.005;
const GROUP_LUMA_STEP: f64 = 0.0001;
const CONTAINMENT_WIDTH_SLACK: f64 = 1e-4;
const CONTAINMENT_INTERVAL_SLACK: f64 = 0.05;
const OPAQUE_ALPHA: f64 = 0.999;

type DupKey = (i64, i64, i64, i64, i64, i64, i64);

fn duplicate_key(s: &EmittedStroke) -> DupKey {
    let (mut ax, mut ay, mut bx, mut by) = (s.p0.x, s.p0.y, s.p1.x, s.p1.y);
    if (ax, ay) > (bx, by) {
        std::mem::swap(&mut ax, &mut bx);
        std::mem::swap(&mut ay, &mut by);
    }
    (
        quantize(ax, DUP_POSITION_STEP),
        quantize(ay, DUP_POSITION_STEP),
        quantize(bx, DUP_POSITION_STEP),
        quantize(by, DUP_POSITION_STEP),
        quantize(s.half_width, DUP_STYLE_STEP),
        quantize(s.luma, DUP_STYLE_STEP),
        quantize(s.alpha, DUP_STYLE_STEP),
    )
}

/// A direction vector normalized to `[0, pi)` so that a segment and its reverse
/// land in the same orientation bucket.
fn canonical_direction(p0: Point, p1: Point) -> Vec2 {
    let d = p1 - p0;
    let len = d.hypot();
    if len < 1e-12 {
        return Vec2::new(1.0, 0.0);
    }
    let mut dir = d / len;
    if dir.x < 0.0 || (dir.x == 0.0 && dir.y < 0.0) {
        dir = -dir;
    }
    dir
}

type GroupKey = (i64, i64, i64);

fn group_key(s: &EmittedStroke, dir: Vec2) -> GroupKey {
    let offset = dir.x * s.p0.y - dir.y * s.p0.x;
    (
        quantize(dir.x, GROUP_DIRECTION_STEP),
        quantize(offset, GROUP_OFFSET_STEP),
        quantize(s.luma, GROUP_LUMA_STEP),
    )
}

#[derive(Clone, Copy)]
struct Candidate {
    pos: usize,
    start: f64,
    end: f64,
    half_width: f64,
    length: f64,
    alpha: f64,
}

fn containment_filter(items: &[(usize, EmittedStroke)]) -> Vec<bool> {
    let mut keep = vec![true; items.len()];
    let mut origins: HashMap<GroupKey, Point> = HashMap::new();
    let mut groups: HashMap<GroupKey, Vec<Candidate>> = HashMap::new();

    for (slot, (_, s)) in items.iter().enumerate() {
        let dir = canonical_direction(s.p0, s.p1);
        let key = group_key(s, dir);
        let origin = *origins.entry(key).or_insert(s.p0);
        let t0 = (s.p0 - origin).dot(dir);
        let t1 = (s.p1 - origin).dot(dir);
        let (start, end) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        groups.entry(key).or_default().push(Candidate {
            pos: slot,
            start,
            end,
            half_width: s.half_width,
            length: (end - start).abs(),
            alpha: s.alpha,
        });
    }

    for candidates in groups.values_mut() {
        candidates.sort_by(|a, b| {
            b.half_width
                .partial_cmp(&a.half_width)
                .unwrap()
                .then(b.length.partial_cmp(&a.length).unwrap())
                .then(a.start.partial_cmp(&b.start).unwrap())
        });
        let mut covers: Vec<(f64, f64, f64)> = Vec::new();
        for c in candidates.iter() {
            let covered = covers.iter().any(|&(cs, ce, chw)| {
                chw >= c.half_width - CONTAINMENT_WIDTH_SLACK
                    && cs <= c.start + CONTAINMENT_INTERVAL_SLACK
                    && ce >= c.end - CONTAINMENT_INTERVAL_SLACK
            });
            if covered {
                keep[c.pos] = false;
            } else if c.alpha >= OPAQUE_ALPHA {
                covers.push((c.start, c.end, c.half_width));
            }
        }
    }
    keep
}

/// Runs the four-stage visibility culler over `strokes`, returning the survivors (in
/// original order) and accumulating discard counts into `diagnostics`. A no-op when
/// `enable` is `false`.
pub fn cull_strokes(strokes: Vec<EmittedStroke>, enable: bool, diagnostics: &mut BuildDiagnostics) -> Vec<EmittedStroke> {
    if !enable {
        return strokes;
    }

    let mut stage12 = Vec::with_capacity(strokes.len());
    for (i, s) in strokes.into_iter().enumerate() {
        if s.alpha <= TRANSPARENT_ALPHA {
            diagnostics.discarded_transparent += 1;
            continue;
        }
        if s.length_sq() < DEGENERATE_LENGTH_SQ {
            diagnostics.discarded_degenerate += 1;
            continue;
        }
        stage12.push((i, s));
    }

    let mut seen = HashSet::new();
    let mut stage3 = Vec::with_capacity(stage12.len());
    for (i, s) in stage12 {
        let key = duplicate_key(&s);
        if !seen.insert(key) {
            diagnostics.discarded_duplicate += 1;
            continue;
        }
        stage3.push((i, s));
    }

    let keep = containment_filter(&stage3);
    diagnostics.discarded_contained += keep.iter().filter(|k| !**k).count() as u64;

    stage3
        .into_iter()
        .zip(keep)
        .filter_map(|((_, s), k)| k.then_some(s))
        .collect()
}
