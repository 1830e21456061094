//! Command-level error variants that deserve a name instead of an ad hoc
//! `anyhow::bail!` string.

#[derive(thiserror::Error, Debug, Clone)]
pub enum CliError {
    #[error("build was cancelled")]
    BuildCancelled,

    #[error("archive roundtrip produced different counts: original {original:?}, read back {read_back:?}")]
    RoundtripMismatch {
        original: vscene_core::scene::vector_scene::SceneCounts,
        read_back: vscene_core::scene::vector_scene::SceneCounts,
    },
}
