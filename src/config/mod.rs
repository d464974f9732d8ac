//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.toml / lang file (flat TOML)
//!     → document.rs (parse, keep comments and layout)
//!     → loader.rs (seed defaults, backup)
//!     → migrate.rs (append keys listed in manifest.rs)
//!     → loader.rs (save + fresh load when keys were added)
//!     → PluginConfig handed to the lifecycle manager
//!
//! On reload command or watcher event:
//!     the same sequence runs again; on failure the previous
//!     PluginConfig stays in place
//! ```
//!
//! # Design Decisions
//! - Documents are only ever extended, never rewritten, by upgrades
//! - Typed accessors with defaults; a missing key never fails a read
//! - Backups are best effort

pub mod document;
pub mod loader;
pub mod manifest;
pub mod migrate;
pub mod watcher;

pub use document::{ConfigDocument, DocumentError, Value};
pub use loader::PluginConfig;
pub use manifest::{SchemaEntry, LANGUAGE_MANIFEST, SETTINGS_MANIFEST};
