//! Loading, backing up and upgrading the plugin documents.

use std::path::{Path, PathBuf};

use crate::config::document::{ConfigDocument, DocumentError};
use crate::config::manifest::{keys, SchemaEntry, DEFAULT_LANGUAGE_FILE, OBSOLETE_LANGUAGE_KEYS};
use crate::config::migrate;
use crate::messages::Messages;

/// Name of the settings file inside the data directory.
pub const SETTINGS_FILE: &str = "config.toml";

/// Content written when the settings file does not exist.
pub const DEFAULT_SETTINGS: &str = include_str!("../../resources/config.toml");

/// Content written when the selected language file does not exist.
pub const DEFAULT_LANGUAGE: &str = include_str!("../../resources/lang.toml");

/// The two documents the plugin runs on, plus the messages resolved from the
/// language file.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub settings: ConfigDocument,
    pub lang: ConfigDocument,
    messages: Messages,
}

impl PluginConfig {
    pub fn new(settings: ConfigDocument, lang: ConfigDocument) -> Self {
        let messages = Messages::from_document(&lang);
        Self { settings, lang, messages }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Keys of the language file that only older plugin versions wrote.
    pub fn obsolete_language_keys(&self) -> Vec<&'static str> {
        OBSOLETE_LANGUAGE_KEYS
            .iter()
            .copied()
            .filter(|key| self.lang.contains(key))
            .collect()
    }
}

/// Path of the language file selected by `settings`.
pub fn language_path(data_dir: &Path, settings: &ConfigDocument) -> PathBuf {
    data_dir.join(settings.get_string(keys::LANGUAGE_FILE_NAME, DEFAULT_LANGUAGE_FILE))
}

/// Load a document and write a backup of what was read.
///
/// Only the load can fail; a failed backup is logged.
pub fn load_and_backup(path: &Path, defaults: &str) -> Result<ConfigDocument, DocumentError> {
    let document = ConfigDocument::load(path, Some(defaults))?;

    if let Err(e) = document.backup() {
        tracing::error!(path = %path.display(), error = %e, "Error while backing up configuration file");
    }
    Ok(document)
}

/// Add missing manifest keys, then save and reload the document.
///
/// Returns whether keys were added. Save or reload failures are logged and
/// leave the migrated in-memory document in use.
pub fn migrate_and_persist(document: &mut ConfigDocument, manifest: &[SchemaEntry]) -> bool {
    if !migrate::reconcile(document, manifest) {
        return false;
    }

    let reloaded = document.save().and_then(|_| document.reload());
    match reloaded {
        Ok(fresh) => {
            tracing::info!(path = %document.path().display(), "Added missing entries from newer plugin version");
            *document = fresh;
        }
        Err(e) => {
            tracing::error!(path = %document.path().display(), error = %e, "Error while saving changes to the file");
        }
    }
    true
}
