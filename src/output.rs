//! Output management module
//!
//! Resolves the output location and writes the finished table to disk.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{FilterError, Result};

/// Buffer size for file writing (1MB)
const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// Join the output directory and file name
pub fn output_path(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(file_name)
}

/// Ensure output directory exists
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        log::debug!("Creating output directory {:?}", path);
        std::fs::create_dir_all(path).map_err(|e| FilterError::io(path, e))?;
    }
    Ok(())
}

/// Write `bytes` to `path`, replacing any previous content
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomically(path, |writer| writer.write_all(bytes))?;

    log::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

/// Fill a temporary file next to `path`, then rename it into place
///
/// `path` only changes once `fill` and the flush have both succeeded. On error the
/// temporary file is removed and any previous file at `path` is left untouched.
fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(|e| FilterError::io(dir, e))?;

    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, temp);
    fill(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| FilterError::io(path, e))?;

    let temp = writer
        .into_inner()
        .map_err(|e| FilterError::io(path, e.into_error()))?;

    temp.persist(path)
        .map_err(|e| FilterError::io(path, e.error))?;

    Ok(())
}
