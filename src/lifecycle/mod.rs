//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Enable (manager.rs):
//!     Load + back up documents → Migrate → Register always-on listeners
//!         → activation.rs sync (optional listeners per settings flags)
//!
//! Reload (manager.rs):
//!     Load aside → Migrate (optional) → Swap config → activation.rs sync
//!     On failure: keep previous config and registrations
//!
//! Disable:
//!     Deregister optional listeners (cancelling their tasks) → always-on ones
//! ```
//!
//! # Design Decisions
//! - Single owner: all registration changes go through one LifecycleManager
//! - Sync is idempotent; it only acts on kinds whose state differs from the flag
//! - Startup failure is fatal, reload failure is not

pub mod activation;
pub mod manager;

pub use activation::{ActivationFlags, ListenerActivation, OptionalListener, SyncReport, UpdateCheckOptions};
pub use manager::{LifecycleError, LifecycleManager, LifecycleOptions, PluginState, ReconcileReport};
