//! Session storage location.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Get the session file path.
///
/// The directory is created on first save, not here.
pub fn session_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "peel").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("session.json"))
}
