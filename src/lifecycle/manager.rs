//! Startup and reload orchestration.
//!
//! # Responsibilities
//! - Load and back up the settings and language documents
//! - Upgrade both with missing keys, persisting the result
//! - Register the always-on listeners once startup succeeded
//! - Bring optional listeners in line with the settings after every load
//!
//! # Design Decisions
//! - Startup failures are fatal: the plugin stays disabled, nothing registered
//! - Reload failures are not: the previous documents and listeners stay active
//! - New documents are loaded aside and only swapped in once both loaded

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::document::DocumentError;
use crate::config::loader::{
    language_path, load_and_backup, migrate_and_persist, PluginConfig, DEFAULT_LANGUAGE, DEFAULT_SETTINGS,
    SETTINGS_FILE,
};
use crate::config::manifest::{LANGUAGE_MANIFEST, SETTINGS_MANIFEST};
use crate::lifecycle::activation::{ActivationFlags, ListenerActivation, SyncReport, UpdateCheckOptions};
use crate::listeners::{EventBus, ListenerId, PlayerInteractListener, PlayerLeashListener};
use crate::observability::metrics;

/// Error type for lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to load {document} file: {source}")]
    Load {
        document: &'static str,
        #[source]
        source: DocumentError,
    },

    #[error("plugin is not enabled")]
    NotEnabled,
}

/// Whether the plugin is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Disabled,
    Enabled,
}

/// Runtime options of the plugin.
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Directory holding the settings and language files.
    pub data_dir: PathBuf,
    pub update: UpdateCheckOptions,
}

impl LifecycleOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            update: UpdateCheckOptions::default(),
        }
    }
}

/// Outcome of a successful load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub settings_migrated: bool,
    pub lang_migrated: bool,
    pub listeners: SyncReport,
}

/// Owns the loaded configuration and every listener registration it implies.
pub struct LifecycleManager {
    options: LifecycleOptions,
    state: PluginState,
    config: Option<PluginConfig>,
    activation: ListenerActivation,
    always_on: Vec<ListenerId>,
    /// Pet information display toggle, flipped by `/petm enable|disable`.
    display_enabled: Arc<AtomicBool>,
}

impl LifecycleManager {
    pub fn new(options: LifecycleOptions, runtime: Option<Handle>) -> Self {
        let activation = ListenerActivation::new(runtime, options.update.clone());
        Self {
            options,
            state: PluginState::Disabled,
            config: None,
            activation,
            always_on: Vec::new(),
            display_enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// First load at plugin start.
    ///
    /// Any load failure leaves the plugin disabled without a single listener
    /// registered. An already enabled plugin is shut down first.
    pub fn initialize(&mut self, bus: &mut EventBus) -> Result<ReconcileReport, LifecycleError> {
        if self.state == PluginState::Enabled {
            tracing::warn!("Plugin already enabled, restarting");
            self.shutdown(bus);
        }
        tracing::info!(data_dir = %self.options.data_dir.display(), "Backing up and loading configuration files...");

        let (config, mut report) = match self.load_documents(true) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Error while loading configuration, disabling plugin");
                tracing::error!("Verify your syntax with a TOML validator, using the error above to locate the problem");
                self.shutdown(bus);
                self.config = None;
                metrics::record_reconcile("fatal");
                return Err(e);
            }
        };

        tracing::info!("Registering listeners...");
        let interact = bus.register(Box::new(PlayerInteractListener::new(self.display_enabled.clone())));
        let leash = bus.register(Box::new(PlayerLeashListener::new()));
        self.always_on = vec![interact, leash];

        report.listeners = self.apply(bus, config);
        self.state = PluginState::Enabled;
        metrics::record_reconcile("success");
        Ok(report)
    }

    /// Reload both documents and re-sync listeners.
    ///
    /// On failure the configuration and listeners in place are kept.
    pub fn reconcile(&mut self, bus: &mut EventBus, attempt_migration: bool) -> Result<ReconcileReport, LifecycleError> {
        if self.state != PluginState::Enabled {
            return Err(LifecycleError::NotEnabled);
        }

        tracing::info!("Backing up and reloading configuration files...");
        let (config, mut report) = match self.load_documents(attempt_migration) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload configuration. Keeping current configuration.");
                metrics::record_reconcile("failed");
                return Err(e);
            }
        };

        report.listeners = self.apply(bus, config);
        metrics::record_reconcile("success");
        Ok(report)
    }

    /// Deregister everything and mark the plugin disabled.
    pub fn shutdown(&mut self, bus: &mut EventBus) {
        self.activation.deactivate_all(bus);
        for id in self.always_on.drain(..) {
            bus.unregister(id);
        }
        self.state = PluginState::Disabled;
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    /// Configuration currently in effect, `None` before a successful start.
    pub fn config(&self) -> Option<&PluginConfig> {
        self.config.as_ref()
    }

    pub fn activation(&self) -> &ListenerActivation {
        &self.activation
    }

    pub fn display_toggle(&self) -> &Arc<AtomicBool> {
        &self.display_enabled
    }

    pub fn options(&self) -> &LifecycleOptions {
        &self.options
    }

    fn load_documents(&self, attempt_migration: bool) -> Result<(PluginConfig, ReconcileReport), LifecycleError> {
        let data_dir = &self.options.data_dir;

        let mut settings = load_and_backup(&data_dir.join(SETTINGS_FILE), DEFAULT_SETTINGS)
            .map_err(|source| LifecycleError::Load { document: "settings", source })?;
        let mut lang = load_and_backup(&language_path(data_dir, &settings), DEFAULT_LANGUAGE)
            .map_err(|source| LifecycleError::Load { document: "language", source })?;

        let mut report = ReconcileReport::default();
        if attempt_migration {
            report.settings_migrated = migrate_and_persist(&mut settings, SETTINGS_MANIFEST);
            report.lang_migrated = migrate_and_persist(&mut lang, LANGUAGE_MANIFEST);
            if report.settings_migrated {
                metrics::record_migration("settings");
            }
            if report.lang_migrated {
                metrics::record_migration("language");
            }
        }

        let config = PluginConfig::new(settings, lang);
        let obsolete = config.obsolete_language_keys();
        if !obsolete.is_empty() {
            tracing::warn!(
                keys = ?obsolete,
                "Your language file contains outdated entries! It is highly recommended to delete it and let it regenerate so that all messages appear correctly."
            );
        }
        Ok((config, report))
    }

    /// Swap in `config`, sync optional listeners and refresh the always-on ones.
    fn apply(&mut self, bus: &mut EventBus, config: PluginConfig) -> SyncReport {
        let flags = ActivationFlags::from_settings(&config.settings);
        let report = self.activation.sync(&flags, bus, &config);
        for id in &self.always_on {
            bus.refresh(*id, &config);
        }
        self.config = Some(config);
        report
    }
}
