//! The error taxonomy (§7): hard failures propagate as [`SceneError`]; operator
//! anomalies never do, they're tallied on [`BuildDiagnostics`] and logged once.
//! Cancellation is a third, distinguished outcome (§7 "cancellation is not a
//! failure"), modeled as [`BuildOutcome`] rather than folded into `SceneError`,
//! mirroring `InkscapeExtPreprocessorError`'s `#[from]`-based variant shape in the
//! teacher crate.

use thiserror::Error;

use crate::scene::vector_scene::VectorScene;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid operator source: {0}")]
    InvalidSource(String),

    #[error("resource bound exceeded: {resource} limit is {limit}, requested {requested}")]
    ResourceBoundExceeded { resource: &'static str, limit: u64, requested: u64 },

    #[error("texture payload for '{name}' is truncated: expected {expected} bytes, found {found}")]
    TruncatedTexture { name: String, expected: usize, found: usize },

    #[error("archive manifest is malformed: {0}")]
    MalformedManifest(String),

    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The distinguished result of a build: either a completed scene or an explicit
/// cancellation, checked between pages and operator chunks (§5, §7).
#[derive(Debug)]
pub enum BuildOutcome {
    Scene(VectorScene),
    Cancelled,
}

impl BuildOutcome {
    #[must_use]
    pub fn into_scene(self) -> Option<VectorScene> {
        match self {
            BuildOutcome::Scene(s) => Some(s),
            BuildOutcome::Cancelled => None,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BuildOutcome::Cancelled)
    }
}

/// Counters for operator-stream anomalies that are logged and skipped rather than
/// propagated (§7): malformed paths, unbalanced `restore`, unknown opcodes, and
/// segments discarded by each culling stage (§4.4).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildDiagnostics {
    pub truncated_paths: u64,
    pub unbalanced_restores: u64,
    pub unknown_opcodes: u64,
    pub non_finite_operators: u64,
    pub discarded_transparent: u64,
    pub discarded_degenerate: u64,
    pub discarded_duplicate: u64,
    pub discarded_contained: u64,
    /// Raw flattened stroke segments, before the merger folds collinear runs (§4.3).
    pub source_segment_count: u64,
    /// Stroke segments remaining after merge, before culling.
    pub merged_segment_count: u64,
}

impl BuildDiagnostics {
    #[must_use]
    pub fn merge(mut self, other: BuildDiagnostics) -> Self {
        self.truncated_paths += other.truncated_paths;
        self.unbalanced_restores += other.unbalanced_restores;
        self.unknown_opcodes += other.unknown_opcodes;
        self.non_finite_operators += other.non_finite_operators;
        self.discarded_transparent += other.discarded_transparent;
        self.discarded_degenerate += other.discarded_degenerate;
        self.discarded_duplicate += other.discarded_duplicate;
        self.discarded_contained += other.discarded_contained;
        self.source_segment_count += other.source_segment_count;
        self.merged_segment_count += other.merged_segment_count;
        self
    }
}
