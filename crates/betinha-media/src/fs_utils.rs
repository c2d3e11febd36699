//! Filesystem helpers for output and scratch files.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::error::MediaResult;

/// Make sure `path` can be written before any tool is started.
///
/// Creates missing parent directories, then creates (or truncates) the file
/// itself as an empty placeholder. Invalid paths and permission problems
/// surface here instead of minutes later inside FFmpeg.
pub async fn ensure_output_path(path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::File::create(path).await?;
    Ok(())
}

/// Remove a leftover file, treating "already gone" as success.
pub async fn remove_stale_file(path: impl AsRef<Path>) -> MediaResult<bool> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => {
            tracing::debug!("Removed stale file: {}", path.as_ref().display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
