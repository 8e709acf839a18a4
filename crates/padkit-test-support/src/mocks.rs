//! Fake settings backends for store-level tests.

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use padkit_config::{PadProfile, SettingsBackend};

/// In-memory [`SettingsBackend`] that records save/reload traffic.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    stored: Option<PadProfile>,
    reloads: usize,
    saves: usize,
}

impl MemoryBackend {
    /// Backend whose next reload yields the given profile.
    #[must_use]
    pub fn with_profile(profile: PadProfile) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                stored: Some(profile),
                reloads: 0,
                saves: 0,
            }),
        }
    }

    /// Profile captured by the most recent save, if any.
    ///
    /// # Panics
    ///
    /// Panics if the backing mutex has been poisoned.
    #[must_use]
    pub fn saved(&self) -> Option<PadProfile> {
        self.state.lock().expect("memory backend poisoned").stored.clone()
    }

    /// Number of reload calls observed.
    ///
    /// # Panics
    ///
    /// Panics if the backing mutex has been poisoned.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.state.lock().expect("memory backend poisoned").reloads
    }

    /// Number of save calls observed.
    ///
    /// # Panics
    ///
    /// Panics if the backing mutex has been poisoned.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state.lock().expect("memory backend poisoned").saves
    }
}

impl SettingsBackend for MemoryBackend {
    fn reload(&self) -> Result<PadProfile> {
        let mut state = self.state.lock().expect("memory backend poisoned");
        state.reloads += 1;
        Ok(state.stored.clone().unwrap_or_default())
    }

    fn save(&self, profile: &PadProfile) -> Result<()> {
        let mut state = self.state.lock().expect("memory backend poisoned");
        state.saves += 1;
        state.stored = Some(profile.clone());
        Ok(())
    }
}

/// Backend that fails every operation with a fixed message, for exercising
/// failure propagation.
pub struct FailingBackend {
    message: &'static str,
}

impl FailingBackend {
    /// Backend whose every operation fails with `message`.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl SettingsBackend for FailingBackend {
    fn reload(&self) -> Result<PadProfile> {
        Err(anyhow!(self.message))
    }

    fn save(&self, _profile: &PadProfile) -> Result<()> {
        Err(anyhow!(self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_counts_traffic() {
        let backend = MemoryBackend::default();
        assert_eq!(backend.reload().unwrap(), PadProfile::default());
        backend
            .save(&PadProfile {
                flip_lx: true,
                ..PadProfile::default()
            })
            .unwrap();

        assert_eq!(backend.reload_count(), 1);
        assert_eq!(backend.save_count(), 1);
        assert!(backend.saved().is_some_and(|profile| profile.flip_lx));
    }

    #[test]
    fn failing_backend_fails_both_operations() {
        let backend = FailingBackend::new("disk on fire");
        assert!(backend.reload().is_err());
        assert!(backend.save(&PadProfile::default()).is_err());
    }
}
