use std::ffi::OsString;
use std::path::PathBuf;

use padkit_config::{ConfigStore, JsonFileBackend, install_dir};
use padkit_telemetry::{GlobalContextGuard, LoggingConfig, init_logging};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Environment variable overriding the settings file location.
const SETTINGS_ENV: &str = "PADKIT_SETTINGS";
/// Default settings file name inside the installation directory.
const SETTINGS_FILE: &str = "padkit-settings.json";

/// Dependencies required to bootstrap the padkit service.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    store: ConfigStore,
    settings_path: PathBuf,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary
    /// entrypoint. The configuration store is built exactly once, here, and
    /// handed to every consumer explicitly.
    pub(crate) fn from_env() -> Self {
        let settings_path = settings_path_from(std::env::var_os(SETTINGS_ENV));
        let store = ConfigStore::new(JsonFileBackend::new(settings_path.clone()));
        Self {
            logging: LoggingConfig::default(),
            store,
            settings_path,
        }
    }
}

fn settings_path_from(overridden: Option<OsString>) -> PathBuf {
    overridden.map_or_else(|| install_dir().join(SETTINGS_FILE), PathBuf::from)
}

/// Entry point for the padkit service boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or service startup fails.
pub async fn run_app() -> AppResult<()> {
    run_app_with(BootstrapDependencies::from_env()).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("service");

    info!("padkit service bootstrap starting");

    let BootstrapDependencies {
        logging: _,
        store,
        settings_path,
    } = dependencies;

    store
        .load()
        .map_err(|err| AppError::config("config.load", err))?;
    info!(path = %settings_path.display(), "configuration loaded");

    let mut changes = store.subscribe();
    let change_logger = tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            info!(
                field = change.field,
                old = %change.old,
                new = %change.new,
                "setting changed"
            );
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::io("signal.ctrl_c", err))?;
    info!("shutdown requested");

    store
        .save()
        .map_err(|err| AppError::config("config.save", err))?;
    change_logger.abort();
    info!("padkit service stopped");
    Ok(())
}
