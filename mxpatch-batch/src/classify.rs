//! Emptiness classification of diff artifacts.

use std::path::Path;

use crate::error::{io_err, BatchError};

/// A diff encodes no change when its closing marker element is absent.
pub fn is_empty_diff(content: &str, marker: &str) -> bool {
    !content.contains(marker)
}

/// [`is_empty_diff`] over a file's whole content.
pub fn is_empty_diff_file(path: &Path, marker: &str) -> Result<bool, BatchError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(is_empty_diff(&String::from_utf8_lossy(&bytes), marker))
}
