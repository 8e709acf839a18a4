//! Error types for configuration-store operations.

use thiserror::Error;

/// Primary error type for configuration-store operations.
///
/// There is deliberately no variant for merge conflicts or out-of-range
/// update-rate writes: a submit is never rejected, and an undefined wire
/// value leaves the stored rate unchanged.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying settings backend operation failed.
    ///
    /// The backend's own error is carried unchanged; the store adds only an
    /// operation identifier and performs no retry or recovery.
    #[error("settings backend operation failed")]
    Backend {
        /// Operation identifier.
        operation: &'static str,
        /// Source backend error.
        #[source]
        source: anyhow::Error,
    },
    /// A lock guarding store state was poisoned by a panicked writer.
    #[error("configuration store lock poisoned")]
    Poisoned {
        /// Operation identifier.
        operation: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
