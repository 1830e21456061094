//! Page composition (§4.5): places each page's primitives into one shared scene
//! space on a row-major grid, separated by a fixed gap, so the packer and grid index
//! downstream only ever see one coordinate space.

use kurbo::{Affine, Rect, Vec2};

use super::primitives::PagePrimitives;

/// Computes the grid column count used when the caller doesn't pin one: a
/// square-ish layout, `ceil(sqrt(page_count))` columns.
#[must_use]
pub fn default_pages_per_row(page_count: usize) -> u32 {
    if page_count == 0 {
        return 1;
    }
    (page_count as f64).sqrt().ceil() as u32
}

fn translate_primitives(mut page: PagePrimitives, offset: Vec2) -> PagePrimitives {
    let t = Affine::translate(offset);
    for stroke in &mut page.strokes {
        stroke.p0 = t * stroke.p0;
        stroke.p1 = t * stroke.p1;
    }
    for fill in &mut page.fills {
        for seg in &mut fill.segments {
            seg.0 = t * seg.0;
            seg.1 = t * seg.1;
        }
    }
    for instance in &mut page.text_instances {
        instance.transform = t * instance.transform;
    }
    for raster in &mut page.rasters {
        raster.transform = t * raster.transform;
    }
    page.page_bounds = t.transform_rect_bbox(page.page_bounds);
    page
}

/// Places each page on a row-major grid. Row height is the tallest page in that row;
/// within a row, pages are placed left to right by their own width plus `gap`.
///
/// Returns the translated pages (glyphs are page-local already and untouched by
/// composition) and each page's placed bound, in the same order as the input.
#[must_use]
pub fn compose_pages(pages: Vec<PagePrimitives>, pages_per_row: u32, gap: f64) -> (Vec<PagePrimitives>, Vec<Rect>) {
    let cols = pages_per_row.max(1) as usize;
    let mut composed = Vec::with_capacity(pages.len());
    let mut page_rects = Vec::with_capacity(pages.len());

    let mut row_y = 0.0;
    let mut row_height = 0.0f64;
    let mut col_x = 0.0;

    for (i, page) in pages.into_iter().enumerate() {
        if i > 0 && i % cols == 0 {
            row_y += row_height + gap;
            row_height = 0.0;
            col_x = 0.0;
        }
        let b = page.page_bounds;
        let offset = Vec2::new(col_x - b.x0, row_y - b.y0);
        let placed = translate_primitives(page, offset);
        let placed_rect = placed.page_bounds;
        row_height = row_height.max(placed_rect.height());
        col_x += placed_rect.width() + gap;
        page_rects.push(placed_rect);
        composed.push(placed);
    }

    (composed, page_rects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives::EmittedStroke;
    use kurbo::Point;

    fn page(w: f64, h: f64) -> PagePrimitives {
        PagePrimitives {
            strokes: vec![EmittedStroke { p0: Point::new(0.0, 0.0), p1: Point::new(w, 0.0), half_width: 1.0, luma: 0.0, alpha: 1.0 }],
            page_bounds: Rect::new(0.0, 0.0, w, h),
            ..PagePrimitives::default()
        }
    }

    #[test]
    fn test_default_pages_per_row() {
        assert_eq!(default_pages_per_row(1), 1);
        assert_eq!(default_pages_per_row(4), 2);
        assert_eq!(default_pages_per_row(5), 3);
        assert_eq!(default_pages_per_row(0), 1);
    }

    #[test]
    fn test_single_row_layout_places_second_page_after_first() {
        let pages = vec![page(10.0, 10.0), page(20.0, 5.0)];
        let (composed, rects) = compose_pages(pages, 2, 2.0);
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(rects[1].x0, 12.0);
        assert_eq!(composed[1].strokes[0].p0.x, 12.0);
    }

    #[test]
    fn test_wraps_to_next_row() {
        let pages = vec![page(10.0, 10.0), page(10.0, 20.0), page(10.0, 10.0)];
        let (_, rects) = compose_pages(pages, 2, 2.0);
        assert_eq!(rects[2].y0, 22.0); // row0 height = 20, + gap 2
    }

    #[test]
    fn test_no_pages_does_not_panic() {
        let (composed, rects) = compose_pages(Vec::new(), 2, 2.0);
        assert!(composed.is_empty());
        assert!(rects.is_empty());
    }
}
