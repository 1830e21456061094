pub mod build;
pub mod inspect;
pub mod roundtrip;

use std::path::Path;

use anyhow::{Context, Result};
use vscene_core::InMemorySource;

use crate::script::parse_script;

/// Reads and parses a script file into an in-memory operator source.
pub fn load_source(script_path: &Path) -> Result<InMemorySource> {
    let text = std::fs::read_to_string(script_path).with_context(|| format!("reading script '{}'", script_path.display()))?;
    let pages = parse_script(&text).with_context(|| format!("parsing script '{}'", script_path.display()))?;

    let mut source = InMemorySource::new();
    for page in pages {
        source.push_page(page.bounds, page.operators);
    }
    Ok(source)
}
