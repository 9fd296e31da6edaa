//! Scoped writer for one destination file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::TEMP_SUFFIX;

/// Exclusive temp file `.<file name>.<random>.part` next to the destination.
///
/// Every writer gets its own file, so tasks sharing a destination never write
/// into the same inode; the last `commit` wins. Dropping it without `commit`
/// deletes the temp file, which covers every early return and unwinding path.
#[derive(Debug)]
pub struct StagedFile {
    file: Option<NamedTempFile>,
    final_path: PathBuf,
}

impl StagedFile {
    /// Create a fresh temp file in `final_path`'s directory.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let dir = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix(&format!(".{name}."))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        Ok(Self {
            file: Some(file),
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// Flush, sync, and rename the temp file onto the destination.
    /// An existing destination is replaced.
    pub fn commit(mut self) -> io::Result<()> {
        let Some(mut file) = self.file.take() else {
            return Err(io::Error::new(io::ErrorKind::Other, "staged file already closed"));
        };
        file.flush()?;
        file.as_file().sync_all()?;
        // On failure the returned temp file drops here and is removed.
        file.persist(&self.final_path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(f) => f.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "staged file already closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), "could not remove partial file: {}", e);
            }
        }
    }
}
