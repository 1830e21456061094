//! Per-frame visible-set computation (§4.7): queries the spatial grid for the
//! expanded view rect, deduplicating candidates with an epoch-tagged mark array so
//! repeated grid cells don't yield repeated stroke indices, in amortized O(1) per
//! candidate rather than a per-frame `HashSet`.

use kurbo::Rect;

use crate::grid::SpatialGrid;
use crate::scene::vector_scene::Texel;

/// Fraction of grid cells that must be populated, with no interaction in flight,
/// before the builder skips culling entirely and returns every stroke (§4.7).
const ALL_SEGMENTS_OCCUPANCY_THRESHOLD: f64 = 0.92;

fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Computes the visible stroke-index set for one frame, reusing its mark buffer
/// across frames via an incrementing epoch token.
#[derive(Debug)]
pub struct VisibleSetBuilder {
    marks: Vec<u32>,
    epoch: u32,
}

impl VisibleSetBuilder {
    #[must_use]
    pub fn new(stroke_count: usize) -> Self {
        Self { marks: vec![0; stroke_count], epoch: 0 }
    }

    /// Resizes the mark buffer, e.g. after a scene rebuild changes the stroke count.
    pub fn resize(&mut self, stroke_count: usize) {
        self.marks.clear();
        self.marks.resize(stroke_count, 0);
        self.epoch = 0;
    }

    /// Returns the stroke indices visible for a view centered at `(cx, cy)` with
    /// half-extents `(hw, hh)`, margin-expanded by `margin + max_half_width`.
    ///
    /// `interaction_active` disables the "all segments" fast path: while panning or
    /// zooming the view rect changes every frame, so the full-scene shortcut would
    /// thrash rather than help.
    pub fn compute(
        &mut self,
        grid: &SpatialGrid,
        bounds: &[Texel],
        cx: f64,
        cy: f64,
        hw: f64,
        hh: f64,
        margin: f64,
        max_half_width: f64,
        interaction_active: bool,
    ) -> Vec<u32> {
        if !interaction_active && grid.occupancy() >= ALL_SEGMENTS_OCCUPANCY_THRESHOLD {
            return (0..bounds.len() as u32).collect();
        }

        match self.epoch.checked_add(1) {
            Some(next) => self.epoch = next,
            None => {
                // u32 wraparound would collide with the initial unmarked value (0) and
                // admit every stroke as already-seen; zero the marks and restart at 1.
                self.marks.fill(0);
                self.epoch = 1;
            }
        }
        if self.marks.len() != bounds.len() {
            self.resize(bounds.len());
            self.epoch = 1;
        }

        let total_margin = margin + max_half_width;
        let view = Rect::new(cx - hw - total_margin, cy - hh - total_margin, cx + hw + total_margin, cy + hh + total_margin);

        let mut out = Vec::with_capacity(bounds.len().min(4096));

        let clamp_cx = |x: f64| (((x - grid.bounds.x0) / grid.cell_w).floor().max(0.0) as u32).min(grid.gw.saturating_sub(1));
        let clamp_cy = |y: f64| (((y - grid.bounds.y0) / grid.cell_h).floor().max(0.0) as u32).min(grid.gh.saturating_sub(1));
        let cx0 = clamp_cx(view.x0);
        let cx1 = clamp_cx(view.x1);
        let cy0 = clamp_cy(view.y0);
        let cy1 = clamp_cy(view.y1);

        for cy_idx in cy0..=cy1 {
            for cx_idx in cx0..=cx1 {
                let cell = (cy_idx * grid.gw + cx_idx) as usize;
                for &idx in &grid.indices[grid.offsets[cell] as usize..grid.offsets[cell + 1] as usize] {
                    if self.marks[idx as usize] == self.epoch {
                        continue;
                    }
                    self.marks[idx as usize] = self.epoch;
                    let b = bounds[idx as usize];
                    let r = Rect::new(f64::from(b[0]), f64::from(b[1]), f64::from(b[2]), f64::from(b[3]));
                    if rects_overlap(r, view) {
                        out.push(idx);
                    }
                }
            }
        }
        out
    }
}
