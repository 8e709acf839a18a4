//! Persistence boundary for the configuration store.
//!
//! The store treats the backend as opaque: encoding and failure semantics
//! are the collaborator's concern, and its errors propagate unchanged.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::model::PadProfile;

/// Opaque persistent settings collaborator.
///
/// Implementations must be safe to call from any thread; the store
/// serializes `reload`/`save` traffic under its own IO lock.
pub trait SettingsBackend: Send + Sync {
    /// Read the persisted profile.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's own failure when the persisted state
    /// cannot be produced.
    fn reload(&self) -> Result<PadProfile>;

    /// Persist the given profile.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's own failure when the profile cannot be
    /// written.
    fn save(&self, profile: &PadProfile) -> Result<()>;
}

impl<T> SettingsBackend for Arc<T>
where
    T: SettingsBackend + ?Sized,
{
    fn reload(&self) -> Result<PadProfile> {
        (**self).reload()
    }

    fn save(&self, profile: &PadProfile) -> Result<()> {
        (**self).save(profile)
    }
}

/// File-backed settings collaborator storing the profile as pretty-printed
/// JSON.
///
/// A missing file reloads as the default profile (first-run behaviour);
/// writes go through a sibling temp file and a rename so a crash mid-write
/// cannot leave a half-written settings document behind.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend over the given settings file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for JsonFileBackend {
    fn reload(&self) -> Result<PadProfile> {
        if !self.path.exists() {
            return Ok(PadProfile::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read settings file '{}'", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", self.path.display()))
    }

    fn save(&self, profile: &PadProfile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory '{}'", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(profile).context("failed to encode settings")?;
        let staged = self.path.with_extension("json.tmp");
        fs::write(&staged, json.as_bytes())
            .with_context(|| format!("failed to stage settings file '{}'", staged.display()))?;
        fs::rename(&staged, &self.path)
            .with_context(|| format!("failed to replace settings file '{}'", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UpdateRate;

    #[test]
    fn missing_file_reloads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("padkit-settings.json"));
        let profile = backend.reload().unwrap();
        assert_eq!(profile, PadProfile::default());
    }

    #[test]
    fn profile_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("padkit-settings.json"));

        let profile = PadProfile {
            flip_ry: true,
            dead_zone_left: 24,
            update_rate: UpdateRate::Fastest,
            pcsx2_root_path: Some(PathBuf::from("/opt/pcsx2")),
            ..PadProfile::default()
        };
        backend.save(&profile).unwrap();

        assert_eq!(backend.reload().unwrap(), profile);
        assert!(!backend.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_surfaces_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padkit-settings.json");
        fs::write(&path, b"{ not json").unwrap();

        let backend = JsonFileBackend::new(path);
        let err = backend.reload().unwrap_err();
        assert!(err.to_string().contains("failed to parse settings file"));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested/config/settings.json"));
        backend.save(&PadProfile::default()).unwrap();
        assert_eq!(backend.reload().unwrap(), PadProfile::default());
    }
}
