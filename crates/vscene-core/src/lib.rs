//! `vscene-core` turns a page-description operator stream, the kind a PDF content
//! stream or a CAD export would produce, into a compact, GPU-ready [`VectorScene`]:
//! curves flattened to tolerance, collinear runs merged, invisible geometry culled,
//! everything packed into flat 4-float texel arrays plus a spatial grid index for
//! fast per-frame visibility queries.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod archive;
pub mod color;
pub mod config;
pub mod cull;
pub mod error;
pub mod flatten;
pub mod geom;
pub mod grid;
pub mod interp;
pub mod provider;
pub mod scene;
pub mod visible;

pub use color::ColorInput;
pub use config::BuildOptions;
pub use error::{BuildDiagnostics, BuildOutcome, SceneError};
pub use grid::SpatialGrid;
pub use interp::{Operator, PaintOp, PathSegmentOp};
pub use provider::{InMemorySource, OperatorSource};
pub use scene::{SceneBuilder, VectorScene, VectorSceneStats};
pub use visible::VisibleSetBuilder;
