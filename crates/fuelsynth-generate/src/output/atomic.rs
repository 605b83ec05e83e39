use std::io;
use std::path::{Path, PathBuf};

use crate::errors::GenerationError;

/// Run `write` against a sibling `.tmp` path and rename it over `path` once
/// it succeeds. The temp file is removed when `write` fails.
pub fn write_atomic<T, F>(path: &Path, write: F) -> Result<T, GenerationError>
where
    F: FnOnce(&Path) -> Result<T, GenerationError>,
{
    let tmp_path = temp_path(path)?;
    let outcome = write(&tmp_path).and_then(|value| {
        std::fs::rename(&tmp_path, path)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            sync_dir(parent)?;
        }
        Ok(value)
    });

    if outcome.is_err() && tmp_path.exists() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    outcome
}

fn temp_path(path: &Path) -> Result<PathBuf, GenerationError> {
    let file_name = path.file_name().ok_or_else(|| {
        GenerationError::Config(format!("invalid output path {}", path.display()))
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = std::fs::OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
