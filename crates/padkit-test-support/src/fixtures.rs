//! Filesystem fixtures for settings-file tests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Create a temporary directory and a settings-file path inside it.
///
/// The file itself is not created; backends treat the missing file as a
/// first run. Keep the returned [`TempDir`] alive for the duration of the
/// test.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created.
pub fn temp_settings_file() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new().context("failed to create temporary settings directory")?;
    let path = dir.path().join("padkit-settings.json");
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_inside_the_temp_dir() {
        let (dir, path) = temp_settings_file().unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(!path.exists());
    }
}
