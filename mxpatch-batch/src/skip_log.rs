//! Skip log: resources whose diff came out empty during a cleanup run.
//!
//! One file per run, `<log_dir>/skipped-<YYYYMMDD-HHMMSS>.log`, one resource
//! name per line.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::BatchError;
use crate::writer::atomic_write;

pub fn skip_log_path(log_dir: &Path, at: DateTime<Local>) -> PathBuf {
    log_dir.join(format!("skipped-{}.log", at.format("%Y%m%d-%H%M%S")))
}

/// Write `names` to a fresh skip log and return its path.
pub fn write_skip_log(
    log_dir: &Path,
    names: &[String],
    at: DateTime<Local>,
) -> Result<PathBuf, BatchError> {
    let path = skip_log_path(log_dir, at);
    let mut content = String::new();
    for name in names {
        content.push_str(name);
        content.push('\n');
    }
    atomic_write(&path, content.as_bytes())?;
    tracing::info!(path = %path.display(), skipped = names.len(), "skip log written");
    Ok(path)
}
