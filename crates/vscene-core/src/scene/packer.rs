//! Reduces a set of composed, culled [`PagePrimitives`] into the packed
//! [`VectorScene`] texel arrays (§4.6). Glyphs are deduplicated by id across pages,
//! referenced from text instances by array index rather than id, per §9's
//! "cyclic-reference avoidance via index slices, never pointers".

use std::collections::HashMap;

use kurbo::Rect;

use crate::geom::BOUNDS_MARGIN;

use super::primitives::PagePrimitives;
use super::vector_scene::{pack_alpha_and_flags, FillArrays, GlyphArrays, RasterLayer, SceneCounts, StrokeArrays, TextArrays, Texel, VectorScene};

/// Derives a stroke's cached bound from its endpoints and half-width, the same rule
/// [`pack_strokes`] uses and the one an archive reader falls back to when a scene's
/// bounds texture wasn't written (§9 "derived textures").
#[must_use]
pub fn derive_stroke_bound(endpoint: [f32; 4], half_width: f32) -> [f32; 4] {
    let margin = half_width + BOUNDS_MARGIN as f32;
    let (x0, x1) = if endpoint[0] <= endpoint[2] { (endpoint[0], endpoint[2]) } else { (endpoint[2], endpoint[0]) };
    let (y0, y1) = if endpoint[1] <= endpoint[3] { (endpoint[1], endpoint[3]) } else { (endpoint[3], endpoint[1]) };
    [x0 - margin, y0 - margin, x1 + margin, y1 + margin]
}

fn pack_strokes(pages: &[PagePrimitives]) -> (StrokeArrays, f32) {
    let mut arrays = StrokeArrays::default();
    let mut max_half_width = 0.0f32;
    for page in pages {
        for s in &page.strokes {
            arrays.endpoints.push([s.p0.x as f32, s.p0.y as f32, s.p1.x as f32, s.p1.y as f32]);
            arrays.styles.push([s.half_width as f32, s.luma as f32, s.luma as f32, s.luma as f32]);
            arrays.meta.push([0.0, 0.0, 0.0, pack_alpha_and_flags(s.alpha as f32, 0)]);
            let endpoint = [s.p0.x as f32, s.p0.y as f32, s.p1.x as f32, s.p1.y as f32];
            arrays.bounds.push(derive_stroke_bound(endpoint, s.half_width as f32));
            max_half_width = max_half_width.max(s.half_width as f32);
        }
    }
    (arrays, max_half_width)
}

fn pack_fills(pages: &[PagePrimitives]) -> FillArrays {
    let mut arrays = FillArrays::default();
    for page in pages {
        for fill in &page.fills {
            let start = arrays.segments.len() as f32;
            let count = fill.segments.len() as f32;
            arrays.color.push([fill.color.0 as f32, fill.color.1 as f32, fill.color.2 as f32, fill.alpha as f32]);
            arrays.meta.push([start, count, 0.0, if fill.even_odd { 1.0 } else { 0.0 }]);
            for (p0, p1) in &fill.segments {
                arrays.segments.push([p0.x as f32, p0.y as f32, p1.x as f32, p1.y as f32]);
            }
        }
    }
    arrays
}

fn pack_glyphs_and_text(pages: &[PagePrimitives]) -> (GlyphArrays, TextArrays) {
    let mut glyphs = GlyphArrays::default();
    let mut text = TextArrays::default();
    let mut id_to_index: HashMap<u32, u32> = HashMap::new();

    for page in pages {
        for g in &page.glyphs {
            if id_to_index.contains_key(&g.id) {
                continue;
            }
            let index = glyphs.ids.len() as u32;
            id_to_index.insert(g.id, index);
            let start = glyphs.segments.len() as f32;
            let count = g.segments.len() as f32;
            glyphs.ids.push(g.id);
            glyphs.meta.push([start, count, 0.0, 0.0]);
            for (p0, p1) in &g.segments {
                glyphs.segments.push([p0.x as f32, p0.y as f32, p1.x as f32, p1.y as f32]);
            }
        }
    }

    for page in pages {
        for instance in &page.text_instances {
            let Some(&glyph_index) = id_to_index.get(&instance.glyph_id) else {
                log::warn!("text instance references undefined glyph id {}", instance.glyph_id);
                continue;
            };
            let c = instance.transform.as_coeffs();
            text.transform_ab.push([c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32]);
            text.transform_meta.push([c[4] as f32, c[5] as f32, glyph_index as f32, instance.alpha as f32]);
            text.color.push([instance.color.0 as f32, instance.color.1 as f32, instance.color.2 as f32, 0.0]);
        }
    }

    (glyphs, text)
}

fn pack_rasters(pages: &[PagePrimitives]) -> Vec<RasterLayer> {
    pages
        .iter()
        .flat_map(|p| p.rasters.iter())
        .map(|r| RasterLayer {
            width: r.width,
            height: r.height,
            rgba8_premultiplied: r.rgba8_premultiplied.clone(),
            transform: r.transform.as_coeffs(),
        })
        .collect()
}

/// Unions a set of rects without seeding the fold with an origin-anchored rect
/// that would spuriously pull unrelated geometry toward `(0, 0)`. Empty input
/// yields `Rect::ZERO`.
fn union_rects(rects: impl Iterator<Item = Rect>) -> Rect {
    let mut iter = rects;
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(first, |acc, r| acc.union(r))
}

fn union_bound_texels(bounds: &[Texel]) -> Rect {
    union_rects(bounds.iter().map(|b| Rect::new(f64::from(b[0]), f64::from(b[1]), f64::from(b[2]), f64::from(b[3]))))
}

/// Packs a set of already-composed, already-culled pages into the final scene.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn pack_scene(
    pages: Vec<PagePrimitives>,
    page_rects: Vec<Rect>,
    pages_per_row: u32,
    source_segment_count: u64,
    merged_segment_count: u64,
    discarded_transparent: u64,
    discarded_degenerate: u64,
    discarded_duplicate: u64,
    discarded_contained: u64,
) -> VectorScene {
    let (strokes, max_half_width) = pack_strokes(&pages);
    let fills = pack_fills(&pages);
    let (glyphs, text) = pack_glyphs_and_text(&pages);
    let rasters = pack_rasters(&pages);

    let bounds = union_bound_texels(&strokes.bounds);
    let page_bounds = union_rects(page_rects.iter().copied());

    let counts = SceneCounts {
        stroke_count: strokes.len() as u32,
        fill_path_count: fills.meta.len() as u32,
        fill_segment_count: fills.segments.len() as u32,
        glyph_count: glyphs.ids.len() as u32,
        glyph_segment_count: glyphs.segments.len() as u32,
        text_instance_count: text.transform_ab.len() as u32,
        raster_layer_count: rasters.len() as u32,
        page_count: page_rects.len() as u32,
        source_segment_count,
        merged_segment_count,
        discarded_transparent,
        discarded_degenerate,
        discarded_duplicate,
        discarded_contained,
    };

    VectorScene { strokes, fills, glyphs, text, rasters, counts, bounds, page_bounds, page_rects, pages_per_row: pages_per_row.max(1), max_half_width }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives::EmittedStroke;
    use kurbo::Point;

    #[test]
    fn test_pack_single_stroke() {
        let page = PagePrimitives {
            strokes: vec![EmittedStroke { p0: Point::new(0.0, 0.0), p1: Point::new(10.0, 0.0), half_width: 1.0, luma: 0.2, alpha: 1.0 }],
            page_bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            ..PagePrimitives::default()
        };
        let scene = pack_scene(vec![page], vec![Rect::new(0.0, 0.0, 10.0, 10.0)], 1, 1, 1, 0, 0, 0, 0);
        assert_eq!(scene.counts.stroke_count, 1);
        assert_eq!(scene.strokes.endpoints[0], [0.0, 0.0, 10.0, 0.0]);
        assert!((scene.strokes.styles[0][0] - 1.0).abs() < 1e-6);
        assert_eq!(scene.strokes.styles[0], [1.0, 0.2, 0.2, 0.2]);
        assert_eq!(scene.page_bounds, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(scene.pages_per_row, 1);
    }

    #[test]
    fn test_pack_empty_scene() {
        let scene = pack_scene(Vec::new(), Vec::new(), 1, 0, 0, 0, 0, 0, 0);
        assert_eq!(scene.counts.stroke_count, 0);
        assert_eq!(scene.bounds, Rect::ZERO);
        assert_eq!(scene.page_bounds, Rect::ZERO);
    }

    #[test]
    fn test_bounds_is_union_of_stroke_bounds_not_page_rects() {
        let page = PagePrimitives {
            strokes: vec![EmittedStroke { p0: Point::new(20.0, 20.0), p1: Point::new(30.0, 20.0), half_width: 1.0, luma: 0.0, alpha: 1.0 }],
            page_bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            ..PagePrimitives::default()
        };
        // A page rect union seeded at the origin would pull bounds toward (0, 0); the
        // real primitive bounds sit well away from it.
        let scene = pack_scene(vec![page], vec![Rect::new(0.0, 0.0, 100.0, 100.0)], 1, 1, 1, 0, 0, 0, 0);
        assert!(scene.bounds.x0 > 10.0, "bounds.x0 = {}", scene.bounds.x0);
        assert_eq!(scene.page_bounds, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_bounds_margin_includes_half_width() {
        let page = PagePrimitives {
            strokes: vec![EmittedStroke { p0: Point::new(0.0, 0.0), p1: Point::new(10.0, 0.0), half_width: 2.0, luma: 0.0, alpha: 1.0 }],
            page_bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            ..PagePrimitives::default()
        };
        let scene = pack_scene(vec![page], vec![Rect::new(0.0, 0.0, 10.0, 10.0)], 1, 1, 1, 0, 0, 0, 0);
        let b = scene.strokes.bounds[0];
        assert!((b[1] - (-2.35)).abs() < 1e-4);
    }
}
