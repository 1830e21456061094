use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vscene_core::archive::{read_archive, write_archive};
use vscene_core::{BuildOptions, SceneBuilder};

use super::load_source;
use crate::error::CliError;

pub fn run(script: &Path, archive_dir: &PathBuf) -> Result<()> {
    let source = load_source(script)?;
    let builder = SceneBuilder::new(BuildOptions::default());
    let (outcome, _diagnostics) = builder.build(&source, || false).context("building scene")?;
    let Some(scene) = outcome.into_scene() else {
        return Err(CliError::BuildCancelled.into());
    };

    std::fs::create_dir_all(archive_dir).with_context(|| format!("creating archive directory '{}'", archive_dir.display()))?;
    write_archive(archive_dir, &scene, None).context("writing archive")?;
    let read_back = read_archive(archive_dir).context("reading archive back")?;

    if read_back.counts == scene.counts {
        println!("roundtrip ok: counts match ({} strokes, {} pages)", scene.counts.stroke_count, scene.counts.page_count);
        Ok(())
    } else {
        Err(CliError::RoundtripMismatch { original: scene.counts, read_back: read_back.counts }.into())
    }
}
