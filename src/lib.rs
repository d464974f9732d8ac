//! PetMaster: pet ownership, protection and information display for a
//! multiplayer game server.
//!
//! The host drives [`PetMaster`] through its lifecycle hooks, forwards game
//! events and `/petm` commands, and applies the returned [`Dispatch`].

pub mod commands;
pub mod config;
pub mod lifecycle;
pub mod listeners;
pub mod messages;
pub mod observability;
pub mod plugin;
pub mod update;

pub use commands::{CommandSender, PetCommand, PetCommands};
pub use config::PluginConfig;
pub use lifecycle::{LifecycleError, LifecycleManager, LifecycleOptions, PluginState};
pub use listeners::{Dispatch, EventBus, GameEvent};
pub use plugin::PetMaster;
