//! Session-scoped scratch files
//!
//! Files live under `<repo_root>/.erk/scratch/sessions/<session_id>/` so that
//! concurrent sessions in one repository never share a path.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scratch directory for a session
pub fn session_dir(repo_root: &Path, session_id: &str) -> Result<PathBuf> {
    if session_id.is_empty()
        || session_id.contains(['/', '\\'])
        || session_id == "."
        || session_id == ".."
    {
        return Err(Error::Internal(format!("invalid session id: {session_id:?}")));
    }
    Ok(repo_root
        .join(".erk")
        .join("scratch")
        .join("sessions")
        .join(session_id))
}

/// Write a named scratch file for a session and return its path
pub async fn write_scratch_file(
    repo_root: &Path,
    session_id: &str,
    name: &str,
    contents: &str,
) -> Result<PathBuf> {
    let dir = session_dir(repo_root, session_id)?;
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(name);
    tokio::fs::write(&path, contents).await?;
    debug!("wrote scratch file {}", path.display());
    Ok(path)
}

/// Remove a session's scratch directory, if present
pub async fn cleanup_session(repo_root: &Path, session_id: &str) -> Result<()> {
    let dir = session_dir(repo_root, session_id)?;
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
