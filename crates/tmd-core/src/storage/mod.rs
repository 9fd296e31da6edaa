//! Disk side of a download.
//!
//! Bodies are written to a private `.part` file in the destination's directory
//! and renamed into place only after the whole body arrived, so the destination
//! never holds a partial file and the existence check stays meaningful.

mod writer;

use std::io;
use std::path::Path;

pub use writer::StagedFile;

/// Suffix of in-progress temp files.
pub const TEMP_SUFFIX: &str = ".part";

/// True for temp files left by [`StagedFile`].
pub fn is_temp_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// Create the save directory (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}
