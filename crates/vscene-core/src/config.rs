//! The configuration surface named in §6, collected into one `BuildOptions` value
//! with a builder-style `with_*` API, matching the `ExtractionConfig` /
//! `ViewerOptions` shape used by the PDF-graphics-extraction and viewer crates in
//! the retrieval pack rather than scattering free function parameters.

use crate::flatten::{DEFAULT_FLATNESS, DEFAULT_MAX_DEPTH};

/// Runtime knobs for a single [`crate::scene::builder::SceneBuilder`] run.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildOptions {
    /// Perpendicular-deviation tolerance used by the curve flattener (§4.2).
    pub curve_flatness: f64,
    /// Maximum recursion depth for curve subdivision (§4.2).
    pub max_curve_depth: u32,
    /// Collinear-join the segment merger performs on straight-segment runs (§4.3).
    pub enable_segment_merge: bool,
    /// The four-stage visibility culler (§4.4).
    pub enable_invisible_cull: bool,
    /// Caps the number of pages ingested; `None` means no cap.
    pub max_pages: Option<usize>,
    /// Page grid width used by the composition step (§4.5); `None` lets the packer
    /// pick `ceil(sqrt(page_count))`.
    pub pages_per_row: Option<u32>,
    /// Gap, in scene units, between composed pages (§4.5).
    pub page_gap: f64,
    /// Target cell population used to size the spatial grid (§4.6).
    pub grid_target_cell_count: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            curve_flatness: DEFAULT_FLATNESS,
            max_curve_depth: DEFAULT_MAX_DEPTH,
            enable_segment_merge: true,
            enable_invisible_cull: true,
            max_pages: None,
            pages_per_row: None,
            page_gap: 32.0,
            grid_target_cell_count: 0,
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn with_curve_flatness(mut self, flatness: f64) -> Self {
        self.curve_flatness = flatness;
        self
    }

    #[must_use]
    pub fn with_max_curve_depth(mut self, depth: u32) -> Self {
        self.max_curve_depth = depth;
        self
    }

    #[must_use]
    pub fn with_segment_merge(mut self, enable: bool) -> Self {
        self.enable_segment_merge = enable;
        self
    }

    #[must_use]
    pub fn with_invisible_cull(mut self, enable: bool) -> Self {
        self.enable_invisible_cull = enable;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    #[must_use]
    pub fn with_pages_per_row(mut self, pages_per_row: u32) -> Self {
        self.pages_per_row = Some(pages_per_row);
        self
    }

    #[must_use]
    pub fn with_page_gap(mut self, gap: f64) -> Self {
        self.page_gap = gap;
        self
    }
}
