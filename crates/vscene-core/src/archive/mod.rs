//! The scene archive: a manifest plus raw binary payload files (§4.8).

pub mod codec;
pub mod manifest;

pub use codec::{read_archive, write_archive};
pub use manifest::{Manifest, CURRENT_FORMAT_VERSION};
