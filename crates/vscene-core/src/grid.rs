//! Uniform spatial grid index (§4.6): a CSR (compressed sparse row) structure
//! mapping grid cells to the stroke indices whose bound overlaps them, built with a
//! two-pass count-then-fill to avoid per-cell `Vec` allocation.

use kurbo::Rect;

use crate::scene::vector_scene::Texel;

const MIN_TARGET_CELLS: u32 = 30_000;
const MAX_TARGET_CELLS: u32 = 220_000;
const MIN_GRID_DIM: u32 = 64;
const MAX_GRID_DIM: u32 = 1024;
const STROKES_PER_TARGET_CELL: f64 = 8.0;

/// A uniform grid over scene bounds; `offsets[c]..offsets[c+1]` slices `indices` for
/// the stroke indices overlapping cell `c` (row-major, `c = cy * gw + cx`).
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialGrid {
    pub gw: u32,
    pub gh: u32,
    pub bounds: Rect,
    pub cell_w: f64,
    pub cell_h: f64,
    pub offsets: Vec<u32>,
    pub indices: Vec<u32>,
    pub max_cell_population: u32,
}

fn target_cell_count(stroke_count: usize) -> u32 {
    let raw = (stroke_count as f64 / STROKES_PER_TARGET_CELL).round();
    (raw as u32).clamp(MIN_TARGET_CELLS, MAX_TARGET_CELLS)
}

fn grid_dims(target_cells: u32, aspect: f64) -> (u32, u32) {
    let gw = ((target_cells as f64 * aspect).sqrt().round() as u32).clamp(MIN_GRID_DIM, MAX_GRID_DIM);
    let gh = ((target_cells as f64 / aspect).sqrt().round() as u32).clamp(MIN_GRID_DIM, MAX_GRID_DIM);
    (gw, gh)
}

fn cell_range(b: &Texel, bounds: Rect, gw: u32, gh: u32, cell_w: f64, cell_h: f64) -> (u32, u32, u32, u32) {
    let to_cx = |x: f64| (((x - bounds.x0) / cell_w).floor().max(0.0) as u32).min(gw.saturating_sub(1));
    let to_cy = |y: f64| (((y - bounds.y0) / cell_h).floor().max(0.0) as u32).min(gh.saturating_sub(1));
    let cx0 = to_cx(f64::from(b[0]));
    let cy0 = to_cy(f64::from(b[1]));
    let cx1 = to_cx(f64::from(b[2]));
    let cy1 = to_cy(f64::from(b[3]));
    (cx0.min(cx1), cy0.min(cy1), cx0.max(cx1), cy0.max(cy1))
}

impl SpatialGrid {
    /// Builds the grid over `stroke_bounds` (the packed `bounds` array, one rect per
    /// stroke) within `scene_bounds`.
    #[must_use]
    pub fn build(stroke_bounds: &[Texel], scene_bounds: Rect) -> Self {
        let target_cells = target_cell_count(stroke_bounds.len());
        let width = scene_bounds.width().max(1e-6);
        let height = scene_bounds.height().max(1e-6);
        let aspect = width / height;
        let (gw, gh) = grid_dims(target_cells, aspect);
        let cell_w = width / f64::from(gw);
        let cell_h = height / f64::from(gh);

        let cell_count = (gw as usize) * (gh as usize);
        let ranges: Vec<_> = stroke_bounds.iter().map(|b| cell_range(b, scene_bounds, gw, gh, cell_w, cell_h)).collect();

        let mut counts = vec![0u32; cell_count];
        for &(cx0, cy0, cx1, cy1) in &ranges {
            for cy in cy0..=cy1 {
                for cx in cx0..=cx1 {
                    counts[(cy * gw + cx) as usize] += 1;
                }
            }
        }

        let mut offsets = vec![0u32; cell_count + 1];
        for i in 0..cell_count {
            offsets[i + 1] = offsets[i] + counts[i];
        }

        let mut cursor = offsets.clone();
        let mut indices = vec![0u32; offsets[cell_count] as usize];
        for (i, &(cx0, cy0, cx1, cy1)) in ranges.iter().enumerate() {
            for cy in cy0..=cy1 {
                for cx in cx0..=cx1 {
                    let cell = (cy * gw + cx) as usize;
                    indices[cursor[cell] as usize] = i as u32;
                    cursor[cell] += 1;
                }
            }
        }

        let max_cell_population = counts.into_iter().max().unwrap_or(0);
        Self { gw, gh, bounds: scene_bounds, cell_w, cell_h, offsets, indices, max_cell_population }
    }

    /// Stroke indices overlapping the cell containing scene-space point `(x, y)`, or
    /// an empty slice if the point lies outside `bounds`.
    #[must_use]
    pub fn cell_at(&self, x: f64, y: f64) -> &[u32] {
        if !self.bounds.contains(kurbo::Point::new(x, y)) {
            return &[];
        }
        let cx = (((x - self.bounds.x0) / self.cell_w) as u32).min(self.gw - 1);
        let cy = (((y - self.bounds.y0) / self.cell_h) as u32).min(self.gh - 1);
        let cell = (cy * self.gw + cx) as usize;
        &self.indices[self.offsets[cell] as usize..self.offsets[cell + 1] as usize]
    }

    /// Fraction of grid cells populated by at least one stroke bound; used by the
    /// visible-set builder's "all segments" fast path (§4.7).
    #[must_use]
    pub fn occupancy(&self) -> f64 {
        let cell_count = (self.gw as usize) * (self.gh as usize);
        if cell_count == 0 {
            return 0.0;
        }
        let populated = (0..cell_count).filter(|&c| self.offsets[c] != self.offsets[c + 1]).count();
        populated as f64 / cell_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(x0: f32, y0: f32, x1: f32, y1: f32) -> Texel {
        [x0, y0, x1, y1]
    }

    #[test]
    fn test_target_cell_count_clamps() {
        assert_eq!(target_cell_count(0), MIN_TARGET_CELLS);
        assert_eq!(target_cell_count(100_000_000), MAX_TARGET_CELLS);
    }

    #[test]
    fn test_grid_dims_clamped() {
        let (gw, gh) = grid_dims(30_000, 1.0);
        assert!((MIN_GRID_DIM..=MAX_GRID_DIM).contains(&gw));
        assert!((MIN_GRID_DIM..=MAX_GRID_DIM).contains(&gh));
    }

    #[test]
    fn test_build_single_stroke_found_at_its_location() {
        let bounds = vec![bound(0.0, 0.0, 10.0, 10.0)];
        let scene_bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let grid = SpatialGrid::build(&bounds, scene_bounds);
        assert_eq!(grid.cell_at(5.0, 5.0), &[0]);
    }

    #[test]
    fn test_query_outside_bounds_is_empty() {
        let bounds = vec![bound(0.0, 0.0, 10.0, 10.0)];
        let grid = SpatialGrid::build(&bounds, Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert!(grid.cell_at(-5.0, -5.0).is_empty());
    }

    #[test]
    fn test_large_bound_spans_multiple_cells() {
        let bounds = vec![bound(0.0, 0.0, 999.0, 999.0)];
        let grid = SpatialGrid::build(&bounds, Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(grid.cell_at(1.0, 1.0), &[0]);
        assert_eq!(grid.cell_at(998.0, 998.0), &[0]);
    }

    #[test]
    fn test_csr_offsets_monotonic() {
        let bounds: Vec<Texel> = (0..20).map(|i| bound(i as f32, i as f32, i as f32 + 1.0, i as f32 + 1.0)).collect();
        let grid = SpatialGrid::build(&bounds, Rect::new(0.0, 0.0, 100.0, 100.0));
        for w in grid.offsets.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn test_occupancy_full_single_cell_grid_bound() {
        let bounds: Vec<Texel> = (0..500).map(|i| bound(i as f32, i as f32, i as f32 + 1.0, i as f32 + 1.0)).collect();
        let grid = SpatialGrid::build(&bounds, Rect::new(0.0, 0.0, 500.0, 500.0));
        assert!(grid.occupancy() > 0.0);
        assert!(grid.occupancy() <= 1.0);
    }

    #[test]
    fn test_scenario_grid_population_10k_strokes_in_100x100() {
        use rand::{Rng, SeedableRng};

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let stroke_count = 10_000;
        let bounds: Vec<Texel> = (0..stroke_count)
            .map(|_| {
                let x0: f32 = rng.gen_range(0.0..99.0);
                let y0: f32 = rng.gen_range(0.0..99.0);
                bound(x0, y0, x0 + 1.0, y0 + 1.0)
            })
            .collect();
        let grid = SpatialGrid::build(&bounds, Rect::new(0.0, 0.0, 100.0, 100.0));

        assert!((64..=1024).contains(&grid.gw));
        assert!((64..=1024).contains(&grid.gh));
        assert!(grid.indices.len() as u32 >= stroke_count as u32);
        assert!(grid.max_cell_population <= stroke_count as u32);
    }
}
