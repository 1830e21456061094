//! Drives one build end to end: interpret each page, cull its strokes, compose all
//! pages into one scene space, then pack (§2's pipeline). An owning value with no
//! shared mutable state (§5): independent builders can run on independent threads.

use kurbo::Rect;
use rayon::prelude::*;

use crate::config::BuildOptions;
use crate::cull::cull_strokes;
use crate::error::{BuildDiagnostics, BuildOutcome, SceneError};
use crate::interp::interpreter::interpret_page;
use crate::provider::OperatorSource;

use super::compose::{compose_pages, default_pages_per_row};
use super::packer::pack_scene;
use super::primitives::PagePrimitives;

/// Owns the configuration for a single build. Cheap to construct; build as many as
/// you need, including concurrently, since each carries its own diagnostics.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    options: BuildOptions,
}

impl SceneBuilder {
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Runs the full pipeline against `source`. `cancel` is polled before the
    /// per-page work starts and again before composition (§5, §7): returning `true`
    /// stops the build and yields `BuildOutcome::Cancelled` rather than an error.
    /// Pages are independent of one another (§5) and are interpreted and culled in
    /// parallel via `rayon`; only the final composition step is sequential, since
    /// page placement order matters.
    pub fn build<S: OperatorSource + Sync>(&self, source: &S, cancel: impl Fn() -> bool) -> Result<(BuildOutcome, BuildDiagnostics), SceneError> {
        let total_pages = source.page_count().map_err(|e| SceneError::InvalidSource(e.to_string()))?;
        let page_count = match self.options.max_pages {
            Some(max) => total_pages.min(max),
            None => total_pages,
        };

        if cancel() {
            log::debug!("build cancelled before any page");
            return Ok((BuildOutcome::Cancelled, BuildDiagnostics::default()));
        }

        let per_page: Vec<Result<(PagePrimitives, BuildDiagnostics), SceneError>> = (0..page_count)
            .into_par_iter()
            .map(|index| {
                let (x0, y0, x1, y1) =
                    source.page_bounds(index).map_err(|e| SceneError::InvalidSource(e.to_string()))?;
                let ops = source.page_operators(index).map_err(|e| SceneError::InvalidSource(e.to_string()))?;

                let mut page_diagnostics = BuildDiagnostics::default();
                let mut page_primitives = interpret_page(&ops, Rect::new(x0, y0, x1, y1), &self.options, &mut page_diagnostics);
                page_primitives.strokes =
                    cull_strokes(page_primitives.strokes, self.options.enable_invisible_cull, &mut page_diagnostics);
                Ok((page_primitives, page_diagnostics))
            })
            .collect();

        let mut pages = Vec::with_capacity(page_count);
        let mut diagnostics = BuildDiagnostics::default();
        for result in per_page {
            let (page_primitives, page_diagnostics) = result?;
            diagnostics = diagnostics.merge(page_diagnostics);
            pages.push(page_primitives);
        }

        if cancel() {
            log::debug!("build cancelled after interpreting {page_count} pages");
            return Ok((BuildOutcome::Cancelled, diagnostics));
        }

        let pages_per_row = self.options.pages_per_row.unwrap_or_else(|| default_pages_per_row(pages.len()));
        let (composed, page_rects) = compose_pages(pages, pages_per_row, self.options.page_gap);
        let scene = pack_scene(
            composed,
            page_rects,
            pages_per_row,
            diagnostics.source_segment_count,
            diagnostics.merged_segment_count,
            diagnostics.discarded_transparent,
            diagnostics.discarded_degenerate,
            diagnostics.discarded_duplicate,
            diagnostics.discarded_contained,
        );

        log::info!(
            "built scene: {} pages, {} strokes ({} discarded by culling)",
            scene.counts.page_count,
            scene.counts.stroke_count,
            diagnostics.discarded_transparent + diagnostics.discarded_degenerate + diagnostics.discarded_duplicate + diagnostics.discarded_contained
        );

        Ok((BuildOutcome::Scene(scene), diagnostics))
    }
}
