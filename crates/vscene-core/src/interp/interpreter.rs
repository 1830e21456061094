//! The operator interpreter (§4.1): walks one page's operator stream against a
//! graphics-state stack and emits the raw primitives later stages consume. Never
//! returns an error for a malformed operator stream: anomalies are tallied on
//! [`BuildDiagnostics`] and logged once, per §7's "log + skip, continue" policy.

use kurbo::{Affine, Point, Rect};

use crate::color::premultiply;
use crate::config::BuildOptions;
use crate::error::BuildDiagnostics;
use crate::flatten::{flatten_cubic, flatten_quad};
use crate::geom::affine_is_finite;
use crate::scene::primitives::{EmittedFillPath, EmittedGlyph, EmittedRaster, EmittedStroke, EmittedTextInstance, PagePrimitives};

use super::gstate::GraphicsStateStack;
use super::merge::SegmentMerger;
use super::operator::{Operator, PaintOp};
use super::path_data::decode_path_data;

fn stroke_half_width(line_width: f64, ctm: &Affine) -> f64 {
    if line_width == 0.0 {
        return 0.35;
    }
    (line_width * crate::geom::affine_scale(ctm) * 0.5).max(0.2)
}

fn apply(ctm: &Affine, x: f64, y: f64) -> Point {
    *ctm * Point::new(x, y)
}

struct SubpathGeom {
    segments: Vec<(Point, Point, bool)>,
    start: Point,
    end: Point,
    closed: bool,
}

/// Walks decoded path subcommands, already transformed by `ctm`, into a list of
/// per-subpath geometry runs.
fn build_subpaths(
    ops: &[crate::interp::operator::PathSegmentOp],
    ctm: &Affine,
    flatness: f64,
    max_depth: u32,
) -> Vec<SubpathGeom> {
    use crate::interp::operator::PathSegmentOp as S;

    let mut subpaths = Vec::new();
    let mut cur: Option<SubpathGeom> = None;
    let mut current_point = Point::ZERO;

    for op in ops {
        match *op {
            S::MoveTo(x, y) => {
                if let Some(sp) = cur.take() {
                    subpaths.push(sp);
                }
                let p = apply(ctm, x, y);
                current_point = p;
                cur = Some(SubpathGeom { segments: Vec::new(), start: p, end: p, closed: false });
            }
            S::LineTo(x, y) => {
                let p = apply(ctm, x, y);
                let sp = cur.get_or_insert_with(|| SubpathGeom {
                    segments: Vec::new(),
                    start: current_point,
                    end: current_point,
                    closed: false,
                });
                sp.segments.push((current_point, p, true));
                sp.end = p;
                current_point = p;
            }
            S::CurveTo(x1, y1, x2, y2, x3, y3) => {
                let c1 = apply(ctm, x1, y1);
                let c2 = apply(ctm, x2, y2);
                let p3 = apply(ctm, x3, y3);
                let sp = cur.get_or_insert_with(|| SubpathGeom {
                    segments: Vec::new(),
                    start: current_point,
                    end: current_point,
                    closed: false,
                });
                let mut prev = current_point;
                for pt in flatten_cubic(current_point, c1, c2, p3, flatness, max_depth) {
                    sp.segments.push((prev, pt, false));
                    prev = pt;
                }
                sp.end = p3;
                current_point = p3;
            }
            S::QuadTo(x1, y1, x2, y2) => {
                let c1 = apply(ctm, x1, y1);
                let p2 = apply(ctm, x2, y2);
                let sp = cur.get_or_insert_with(|| SubpathGeom {
                    segments: Vec::new(),
                    start: current_point,
                    end: current_point,
                    closed: false,
                });
                let mut prev = current_point;
                for pt in flatten_quad(current_point, c1, p2, flatness, max_depth) {
                    sp.segments.push((prev, pt, false));
                    prev = pt;
                }
                sp.end = p2;
                current_point = p2;
            }
            S::Close => {
                if let Some(sp) = cur.as_mut() {
                    if (sp.end - sp.start).hypot2() > 1e-12 {
                        sp.segments.push((sp.end, sp.start, true));
                    }
                    sp.end = sp.start;
                    sp.closed = true;
                    current_point = sp.start;
                }
            }
        }
    }
    if let Some(sp) = cur.take() {
        subpaths.push(sp);
    }
    subpaths
}

fn fill_segments(subpaths: &[SubpathGeom]) -> Vec<(Point, Point)> {
    let mut out = Vec::new();
    for sp in subpaths {
        for &(p0, p1, _) in &sp.segments {
            out.push((p0, p1));
        }
        if !sp.closed && (sp.end - sp.start).hypot2() > 1e-12 {
            out.push((sp.end, sp.start));
        }
    }
    out
}

fn stroke_segments(subpaths: &[SubpathGeom], implicit_close: bool, enable_merge: bool) -> Vec<(Point, Point)> {
    let mut out = Vec::new();
    let last_index = subpaths.len().saturating_sub(1);
    for (i, sp) in subpaths.iter().enumerate() {
        let mut merger = SegmentMerger::new();
        for &(p0, p1, allow_merge) in &sp.segments {
            merger.push(p0, p1, allow_merge && enable_merge, &mut out);
        }
        if implicit_close && i == last_index && !sp.closed && (sp.end - sp.start).hypot2() > 1e-12 {
            merger.push(sp.end, sp.start, enable_merge, &mut out);
        }
        merger.flush(&mut out);
    }
    out
}

/// Interprets one page's operator stream, returning the primitives it drew and
/// accumulating anomaly counts into `diagnostics`.
pub fn interpret_page(
    ops: &[Operator],
    page_bounds: Rect,
    options: &BuildOptions,
    diagnostics: &mut BuildDiagnostics,
) -> PagePrimitives {
    let mut gstate = GraphicsStateStack::new();
    let mut primitives = PagePrimitives { page_bounds, ..PagePrimitives::default() };
    let mut seen_glyph_ids = std::collections::HashSet::new();

    let mut in_text = false;
    let mut text_matrix = Affine::IDENTITY;

    for op in ops {
        match op {
            Operator::Save => gstate.save(),
            Operator::Restore => {
                if !gstate.restore() {
                    diagnostics.unbalanced_restores += 1;
                }
            }
            Operator::ConcatMatrix(m) => {
                let delta = Affine::new(*m);
                if !affine_is_finite(&delta) {
                    diagnostics.non_finite_operators += 1;
                    continue;
                }
                let ctm = gstate.current().ctm * delta;
                gstate.current_mut().ctm = ctm;
            }
            Operator::SetLineWidth(w) => {
                if w.is_finite() && *w >= 0.0 {
                    gstate.current_mut().line_width = *w;
                } else {
                    diagnostics.non_finite_operators += 1;
                }
            }
            Operator::SetStrokeColor(c) => gstate.current_mut().stroke_color = *c,
            Operator::SetFillColor(c) => gstate.current_mut().fill_color = *c,
            Operator::SetStrokeAlpha(a) => gstate.current_mut().stroke_alpha = a.clamp(0.0, 1.0),
            Operator::SetFillAlpha(a) => gstate.current_mut().fill_alpha = a.clamp(0.0, 1.0),
            Operator::ConstructPath { paint, data } => {
                let (decoded, truncated) = decode_path_data(data);
                if truncated {
                    diagnostics.truncated_paths += 1;
                }
                let gs = gstate.current();
                let subpaths = build_subpaths(&decoded, &gs.ctm, options.curve_flatness, options.max_curve_depth);

                if paint.strokes() {
                    let half_width = stroke_half_width(gs.line_width, &gs.ctm);
                    let luma = gs.stroke_color.to_luma();
                    let alpha = gs.stroke_alpha;
                    let raw_count: u64 = subpaths.iter().map(|sp| sp.segments.len() as u64).sum();
                    diagnostics.source_segment_count += raw_count;
                    let merged = stroke_segments(&subpaths, paint.closes_implicitly(), options.enable_segment_merge);
                    diagnostics.merged_segment_count += merged.len() as u64;
                    for (p0, p1) in merged {
                        primitives.strokes.push(EmittedStroke { p0, p1, half_width, luma, alpha });
                    }
                }
                if paint.fills() {
                    let segments = fill_segments(&subpaths);
                    if !segments.is_empty() {
                        primitives.fills.push(EmittedFillPath {
                            segments,
                            color: gs.fill_color.to_rgb(),
                            alpha: gs.fill_alpha,
                            even_odd: paint.even_odd(),
                        });
                    }
                }
            }
            Operator::BeginText => {
                in_text = true;
                text_matrix = Affine::IDENTITY;
            }
            Operator::SetTextMatrix(m) => {
                let candidate = Affine::new(*m);
                if affine_is_finite(&candidate) {
                    text_matrix = candidate;
                } else {
                    diagnostics.non_finite_operators += 1;
                }
            }
            Operator::DefineGlyph { id, segments } => {
                if seen_glyph_ids.insert(*id) {
                    let (decoded, truncated) = decode_path_data(segments);
                    if truncated {
                        diagnostics.truncated_paths += 1;
                    }
                    let local = build_subpaths(&decoded, &Affine::IDENTITY, options.curve_flatness, options.max_curve_depth);
                    primitives.glyphs.push(EmittedGlyph { id: *id, segments: fill_segments(&local) });
                }
            }
            Operator::ShowGlyphs { glyph_ids, advances } => {
                if !in_text {
                    diagnostics.unknown_opcodes += 1;
                    continue;
                }
                let gs = gstate.current();
                for (i, glyph_id) in glyph_ids.iter().enumerate() {
                    let instance_transform = gs.ctm * text_matrix;
                    primitives.text_instances.push(EmittedTextInstance {
                        glyph_id: *glyph_id,
                        transform: instance_transform,
                        color: gs.fill_color.to_rgb(),
                        alpha: gs.fill_alpha,
                    });
                    let advance = advances.get(i).copied().unwrap_or(0.0);
                    text_matrix *= Affine::translate((advance, 0.0));
                }
            }
            Operator::EndText => in_text = false,
            Operator::DrawRaster { width, height, rgba8, matrix } => {
                let expected_len = (*width as usize) * (*height as usize) * 4;
                if rgba8.len() != expected_len {
                    diagnostics.non_finite_operators += 1;
                    continue;
                }
                let candidate = Affine::new(*matrix);
                if !affine_is_finite(&candidate) {
                    diagnostics.non_finite_operators += 1;
                    continue;
                }
                let mut premultiplied = Vec::with_capacity(rgba8.len());
                for px in rgba8.chunks_exact(4) {
                    let (r, g, b, a) = premultiply(
                        f64::from(px[0]) / 255.0,
                        f64::from(px[1]) / 255.0,
                        f64::from(px[2]) / 255.0,
                        f64::from(px[3]) / 255.0,
                    );
                    premultiplied.push((r * 255.0).round() as u8);
                    premultiplied.push((g * 255.0).round() as u8);
                    premultiplied.push((b * 255.0).round() as u8);
                    premultiplied.push((a * 255.0).round() as u8);
                }
                let transform = gstate.current().ctm * candidate;
                primitives.rasters.push(EmittedRaster {
                    width: *width,
                    height: *height,
                    rgba8_premultiplied: premultiplied,
                    transform,
                });
            }
            Operator::Unknown(name) => {
                log::debug!("skipping unknown operator '{name}'");
                diagnostics.unknown_opcodes += 1;
            }
        }
    }

    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorInput;
    use crate::interp::operator::PaintOp;

    fn line_path(paint: PaintOp, data: Vec<f64>) -> Operator {
        Operator::ConstructPath { paint, data }
    }

    #[test]
    fn test_simple_stroke_rectangle() {
        let data = vec![
            0.0, 0.0, 0.0, // MoveTo(0,0)
            1.0, 10.0, 0.0, // LineTo
            1.0, 10.0, 10.0, // LineTo
            1.0, 0.0, 10.0, // LineTo
            4.0, // Close
        ];
        let ops = vec![
            Operator::SetLineWidth(2.0),
            Operator::SetStrokeColor(ColorInput::Gray(0.0)),
            line_path(PaintOp::CloseStroke, data),
        ];
        let options = BuildOptions::default().with_segment_merge(false);
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::new(0.0, 0.0, 10.0, 10.0), &options, &mut diag);
        assert_eq!(prims.strokes.len(), 4);
        assert_eq!(diag.truncated_paths, 0);
    }

    #[test]
    fn test_fill_path_produces_one_primitive() {
        let data = vec![0.0, 0.0, 0.0, 1.0, 5.0, 0.0, 1.0, 5.0, 5.0, 4.0];
        let ops = vec![
            Operator::SetFillColor(ColorInput::Rgb(1.0, 0.0, 0.0)),
            line_path(PaintOp::Fill, data),
        ];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::new(0.0, 0.0, 5.0, 5.0), &options, &mut diag);
        assert_eq!(prims.fills.len(), 1);
        assert_eq!(prims.fills[0].color, (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_malformed_path_is_tallied_not_fatal() {
        let ops = vec![line_path(PaintOp::Stroke, vec![0.0, 0.0, 0.0, 99.0])];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::ZERO, &options, &mut diag);
        assert_eq!(diag.truncated_paths, 1);
        assert!(prims.strokes.is_empty());
    }

    #[test]
    fn test_unbalanced_restore_is_tallied() {
        let ops = vec![Operator::Restore, Operator::Restore];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        interpret_page(&ops, Rect::ZERO, &options, &mut diag);
        assert_eq!(diag.unbalanced_restores, 2);
    }

    #[test]
    fn test_save_restore_isolates_line_width() {
        let data = vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        let ops = vec![
            Operator::SetLineWidth(5.0),
            Operator::Save,
            Operator::SetLineWidth(1.0),
            Operator::Restore,
            line_path(PaintOp::Stroke, data),
        ];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::ZERO, &options, &mut diag);
        assert!((prims.strokes[0].half_width - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_line_width_uses_fallback() {
        assert!((stroke_half_width(0.0, &Affine::IDENTITY) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_glyph_dedup_by_id() {
        let ops = vec![
            Operator::DefineGlyph { id: 1, segments: vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 4.0] },
            Operator::DefineGlyph { id: 1, segments: vec![0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 4.0] },
        ];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::ZERO, &options, &mut diag);
        assert_eq!(prims.glyphs.len(), 1);
    }

    #[test]
    fn test_show_glyphs_advances_text_matrix() {
        let ops = vec![
            Operator::BeginText,
            Operator::ShowGlyphs { glyph_ids: vec![1, 2], advances: vec![10.0, 10.0] },
            Operator::EndText,
        ];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::ZERO, &options, &mut diag);
        assert_eq!(prims.text_instances.len(), 2);
        let t0 = prims.text_instances[0].transform.as_coeffs();
        let t1 = prims.text_instances[1].transform.as_coeffs();
        assert!((t1[4] - t0[4] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_show_glyphs_outside_text_object_is_tallied() {
        let ops = vec![Operator::ShowGlyphs { glyph_ids: vec![1], advances: vec![0.0] }];
        let options = BuildOptions::default();
        let mut diag = BuildDiagnostics::default();
        let prims = interpret_page(&ops, Rect::ZERO, &options, &mut diag);
        assert!(prims.text_instances.is_empty());
        assert_eq!(diag.unknown_opcodes, 1);
    }
}
