use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vscene_core::archive::write_archive;
use vscene_core::{BuildOptions, SceneBuilder};

use super::load_source;
use crate::error::CliError;

pub fn run(script: &Path, out: &PathBuf) -> Result<()> {
    let source = load_source(script)?;
    let builder = SceneBuilder::new(BuildOptions::default());
    let (outcome, diagnostics) = builder.build(&source, || false).context("building scene")?;
    let Some(scene) = outcome.into_scene() else {
        return Err(CliError::BuildCancelled.into());
    };

    std::fs::create_dir_all(out).with_context(|| format!("creating archive directory '{}'", out.display()))?;
    let source_name = script.file_name().and_then(|n| n.to_str()).map(str::to_string);
    write_archive(out, &scene, source_name).context("writing archive")?;

    log::info!(
        "wrote archive to {}: {} pages, {} strokes, {} truncated paths, {} unknown opcodes",
        out.display(),
        scene.counts.page_count,
        scene.counts.stroke_count,
        diagnostics.truncated_paths,
        diagnostics.unknown_opcodes,
    );
    Ok(())
}
