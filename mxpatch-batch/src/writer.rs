//! Atomic file writes for artifacts mxpatch produces itself.
//!
//! 1. Ensure the parent directory exists.
//! 2. Write to `<path>.mxpatch.tmp`.
//! 3. Rename to the final path (atomic on POSIX).
//!
//! A crash or cancellation leaves either the old file or the new one at
//! `path`, never a partial write.

use std::path::{Path, PathBuf};

use crate::error::{io_err, BatchError};

/// Atomically replace `path` with `content`.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> Result<(), BatchError> {
    let tmp = PathBuf::from(format!("{}.mxpatch.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), BatchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!(path = %path.display(), "wrote");
    Ok(())
}

/// Delete `path`, treating an already-missing file as success.
pub(crate) fn remove_file(path: &Path) -> Result<(), BatchError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}
