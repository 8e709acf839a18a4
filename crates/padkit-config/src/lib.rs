#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! In-memory configuration broker for the padkit driver service.
//!
//! One authoritative [`PadProfile`] lives behind a [`ConfigStore`];
//! consumers take isolated snapshots with [`ConfigStore::request`], edit
//! them locally, and merge them back with [`ConfigStore::submit`].
//!
//! Layout: `model.rs` (profile record and typed field values), `schema.rs`
//! (static writable-field table driving the merge), `store.rs` (snapshot and
//! merge engine plus change notifications), `persist.rs` (settings backend
//! boundary), `error.rs`.

pub mod error;
pub mod model;
pub mod persist;
pub mod schema;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    IDLE_TIMEOUT_MULTIPLIER, LATENCY_MULTIPLIER, LightBarColor, PadProfile, ProcessPriority,
    UpdateRate, install_dir,
};
pub use persist::{JsonFileBackend, SettingsBackend};
pub use schema::{FieldDef, WRITABLE_FIELDS};
pub use store::{ConfigStore, FieldChange};
