use std::path::Path;

use anyhow::{Context, Result};
use vscene_core::{BuildOptions, SceneBuilder, VectorSceneStats};

use super::load_source;
use crate::error::CliError;

pub fn run(script: &Path) -> Result<()> {
    let source = load_source(script)?;
    let builder = SceneBuilder::new(BuildOptions::default());
    let (outcome, diagnostics) = builder.build(&source, || false).context("building scene")?;
    let Some(scene) = outcome.into_scene() else {
        return Err(CliError::BuildCancelled.into());
    };

    println!("{}", VectorSceneStats::from_scene(&scene, diagnostics));
    Ok(())
}
