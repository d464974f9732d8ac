//! Localized message lookup.

use std::collections::HashMap;

use crate::config::document::{ConfigDocument, Value};
use crate::config::manifest::{messages, LANGUAGE_MANIFEST};

/// Resolved message templates from the language file.
///
/// Lookups fall back to the built-in default and then to the message id, so a
/// stale language file degrades to readable output instead of failing.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Messages {
    pub fn from_document(lang: &ConfigDocument) -> Self {
        let mut templates = HashMap::new();
        for key in lang.keys() {
            if let Some(Value::String(text)) = lang.get(key) {
                templates.insert(key.to_string(), text.clone());
            }
        }
        Self { templates }
    }

    /// Raw template for `key`, prefix not substituted.
    fn template(&self, key: &str) -> String {
        if let Some(text) = self.templates.get(key) {
            return text.clone();
        }
        LANGUAGE_MANIFEST
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| match Value::from(entry.default) {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| key.to_string())
    }

    /// Message `key` with `<prefix>` substituted.
    pub fn get(&self, key: &str) -> String {
        let prefix = self.template(messages::PREFIX);
        self.template(key).replace("<prefix>", &prefix)
    }

    /// Message `key` with `<prefix>` and each `<name>` placeholder substituted.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.get(key), |text, (name, value)| {
            text.replace(&format!("<{}>", name), value)
        })
    }
}
