//! The configuration store: canonical record ownership, snapshot/merge
//! traffic, and change notifications.
//!
//! # Design
//! - One canonical [`PadProfile`] behind a reader/writer lock; `request` is a
//!   clone under the read lock, `submit` merges the whole writable-field
//!   table under the write lock, so a reader sees wholly-old or wholly-new
//!   state and never a torn mix.
//! - Backend IO runs under its own lock, independent of snapshot traffic, so
//!   a `load` and a `save` cannot interleave on the collaborator.
//! - Change events are published synchronously inside the merge critical
//!   section; consumers that only poll via `request` never pay for them.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::PadProfile;
use crate::persist::SettingsBackend;
use crate::schema::WRITABLE_FIELDS;

/// Buffer size for the change-notification channel.
const DEFAULT_CHANGE_CAPACITY: usize = 256;

/// A single observed field transition, emitted from inside the merge
/// critical section of the submit or load that caused it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldChange {
    /// Schema name of the field that changed.
    pub field: &'static str,
    /// Value before the merge.
    pub old: Value,
    /// Value after the merge.
    pub new: Value,
    /// Emission timestamp.
    pub at: DateTime<Utc>,
}

/// Process-wide configuration store.
///
/// The store owns the canonical [`PadProfile`]; consumers never hold a
/// mutable reference to it. They take isolated snapshots with [`request`],
/// edit them locally, and merge them back with [`submit`]. The handle is
/// cheap to clone and is meant to be constructed once by the composition
/// root and passed to every consumer explicitly.
///
/// [`request`]: ConfigStore::request
/// [`submit`]: ConfigStore::submit
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    profile: RwLock<PadProfile>,
    backend: Box<dyn SettingsBackend>,
    io_lock: Mutex<()>,
    changes: broadcast::Sender<FieldChange>,
}

impl ConfigStore {
    /// Construct a store over the given persistence backend, starting from
    /// the default profile. Call [`load`](Self::load) to pick up persisted
    /// values.
    #[must_use]
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self::with_profile(backend, PadProfile::default())
    }

    /// Construct a store with an explicit initial profile.
    #[must_use]
    pub fn with_profile(backend: impl SettingsBackend + 'static, profile: PadProfile) -> Self {
        let (changes, _) = broadcast::channel(DEFAULT_CHANGE_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                profile: RwLock::new(profile),
                backend: Box::new(backend),
                io_lock: Mutex::new(()),
                changes,
            }),
        }
    }

    /// Take an isolated snapshot of the canonical profile.
    ///
    /// The snapshot is a fully independent value copy: mutating it is never
    /// visible through the store or any other snapshot. Concurrent `request`
    /// calls do not block each other; an in-flight [`submit`](Self::submit)
    /// is excluded for the duration of its whole merge loop.
    ///
    /// Reads stay infallible even if a writer panicked mid-merge: the
    /// poisoned guard still holds a fully merged or fully pre-merge record.
    #[must_use]
    pub fn request(&self) -> PadProfile {
        match self.inner.profile.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Merge a candidate snapshot into the canonical profile.
    ///
    /// Every writable field is copied from the candidate in schema order,
    /// last writer wins, unconditionally: there is no conflict detection, no
    /// dirty-field tracking, and no rejection path. A candidate that is
    /// stale on fields the caller never touched still overwrites them.
    /// Derived properties and constants are not part of the schema and are
    /// therefore never written.
    ///
    /// Returns the transitions that actually changed a value, in schema
    /// order. The same transitions are published to
    /// [`subscribe`](Self::subscribe) receivers before the lock is released.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Poisoned`] only when a previous writer
    /// panicked while holding the lock.
    pub fn submit(&self, candidate: &PadProfile) -> ConfigResult<Vec<FieldChange>> {
        let changes = self.merge(candidate, "config.submit")?;
        debug!(changed = changes.len(), "configuration submitted");
        Ok(changes)
    }

    /// Refresh the canonical profile from the persistence backend.
    ///
    /// The backend call runs under the store's IO lock, serialized against
    /// [`save`](Self::save); the in-memory overwrite then runs as one merge
    /// critical section, so a concurrent `request` observes wholly-old or
    /// wholly-new values.
    ///
    /// # Errors
    ///
    /// Propagates the backend's own failure wrapped with an operation tag;
    /// the store adds no retry or recovery.
    pub fn load(&self) -> ConfigResult<()> {
        let _io = self
            .inner
            .io_lock
            .lock()
            .map_err(|_| ConfigError::Poisoned {
                operation: "config.load",
            })?;
        let persisted = self
            .inner
            .backend
            .reload()
            .map_err(|source| ConfigError::Backend {
                operation: "config.load",
                source,
            })?;
        let changes = self.merge(&persisted, "config.load")?;
        info!(changed = changes.len(), "configuration loaded");
        Ok(())
    }

    /// Persist the canonical profile's current tunable values.
    ///
    /// # Errors
    ///
    /// Propagates the backend's own failure wrapped with an operation tag.
    pub fn save(&self) -> ConfigResult<()> {
        let snapshot = self.request();
        let _io = self
            .inner
            .io_lock
            .lock()
            .map_err(|_| ConfigError::Poisoned {
                operation: "config.save",
            })?;
        self.inner
            .backend
            .save(&snapshot)
            .map_err(|source| ConfigError::Backend {
                operation: "config.save",
                source,
            })?;
        info!("configuration saved");
        Ok(())
    }

    /// Subscribe to field-change notifications.
    ///
    /// Events are emitted synchronously from inside the merge critical
    /// section of the submit or load that caused them, one per field whose
    /// value actually changed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.inner.changes.subscribe()
    }

    /// Copy every writable field of `candidate` into the canonical profile
    /// and publish the observed transitions, all under the write lock.
    fn merge(
        &self,
        candidate: &PadProfile,
        operation: &'static str,
    ) -> ConfigResult<Vec<FieldChange>> {
        let mut canonical = self
            .inner
            .profile
            .write()
            .map_err(|_| ConfigError::Poisoned { operation })?;

        let mut changes = Vec::new();
        for def in WRITABLE_FIELDS {
            let old = (def.get)(&canonical);
            let new = (def.get)(candidate);
            (def.apply)(candidate, &mut canonical);
            if old != new {
                changes.push(FieldChange {
                    field: def.name,
                    old,
                    new,
                    at: Utc::now(),
                });
            }
        }

        for change in &changes {
            // Receivers may lag or be absent; the merge never fails for it.
            let _ = self.inner.changes.send(change.clone());
        }

        Ok(changes)
    }
}
