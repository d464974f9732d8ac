//! Host-facing entry point.

use std::sync::atomic::Ordering;
use std::time::Instant;

use tokio::runtime::Handle;

use crate::commands::{self, CommandSender, PetCommands, Subcommand, ROOT_LABEL};
use crate::config::manifest::messages;
use crate::lifecycle::{LifecycleError, LifecycleManager, LifecycleOptions, PluginState, ReconcileReport};
use crate::listeners::{Dispatch, EventBus, GameEvent};
use crate::messages::Messages;

/// The plugin as seen by its host: lifecycle hooks, commands and events.
pub struct PetMaster {
    manager: LifecycleManager,
    bus: EventBus,
    pet_commands: Box<dyn PetCommands>,
}

impl PetMaster {
    pub fn new(options: LifecycleOptions, runtime: Option<Handle>, pet_commands: Box<dyn PetCommands>) -> Self {
        Self {
            manager: LifecycleManager::new(options, runtime),
            bus: EventBus::new(),
            pet_commands,
        }
    }

    pub fn on_enable(&mut self) -> Result<(), LifecycleError> {
        let started = Instant::now();
        self.manager.initialize(&mut self.bus)?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            listeners = self.bus.len(),
            "Plugin enabled"
        );
        Ok(())
    }

    pub fn on_disable(&mut self) {
        self.manager.shutdown(&mut self.bus);
        tracing::info!("PetMaster has been disabled.");
    }

    /// Reload both documents, see [`LifecycleManager::reconcile`].
    pub fn reload(&mut self, attempt_migration: bool) -> Result<ReconcileReport, LifecycleError> {
        self.manager.reconcile(&mut self.bus, attempt_migration)
    }

    /// Handle a command. Returns `None` when the label is not ours or the
    /// plugin is disabled, otherwise the lines to send back to the sender.
    pub fn on_command(&mut self, sender: &CommandSender, label: &str, args: &[&str]) -> Option<Vec<String>> {
        if !label.eq_ignore_ascii_case(ROOT_LABEL) || self.manager.state() != PluginState::Enabled {
            return None;
        }

        let subcommand = match Subcommand::parse(args) {
            Ok(subcommand) => subcommand,
            Err(e) => {
                tracing::debug!(error = %e, "Misused command");
                return Some(vec![self.messages().get(messages::MISUSED_COMMAND)]);
            }
        };

        if matches!(subcommand, Subcommand::Pet(_)) && sender.as_player().is_none() {
            return Some(vec![self.messages().get(messages::MISUSED_COMMAND)]);
        }
        if let Some(permission) = subcommand.permission() {
            if !sender.has_permission(&permission) {
                return Some(vec![self.messages().get(messages::NO_PERMISSIONS)]);
            }
        }

        let reply = match subcommand {
            Subcommand::Help => commands::help(&self.messages()),
            Subcommand::Info => commands::info(&self.messages()),
            Subcommand::Reload => {
                // Messages are taken after the reload so a fixed language file applies at once.
                let key = match self.reload(true) {
                    Ok(_) => messages::CONFIGURATION_RELOADED,
                    Err(_) => messages::CONFIGURATION_RELOAD_FAILED,
                };
                vec![self.messages().get(key)]
            }
            Subcommand::Enable => {
                self.manager.display_toggle().store(true, Ordering::Relaxed);
                vec![self.messages().get(messages::PETMASTER_ENABLED)]
            }
            Subcommand::Disable => {
                self.manager.display_toggle().store(false, Ordering::Relaxed);
                vec![self.messages().get(messages::PETMASTER_DISABLED)]
            }
            Subcommand::Pet(command) => {
                let (Some(player), Some(config)) = (sender.as_player(), self.manager.config()) else {
                    return Some(vec![self.messages().get(messages::MISUSED_COMMAND)]);
                };
                self.pet_commands.execute(command, player, &args[1..], config)
            }
        };
        Some(reply)
    }

    /// Deliver a game event to every registered listener.
    pub fn dispatch(&mut self, event: &GameEvent) -> Dispatch {
        self.bus.dispatch(event)
    }

    pub fn state(&self) -> PluginState {
        self.manager.state()
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn messages(&self) -> Messages {
        self.manager
            .config()
            .map(|config| config.messages().clone())
            .unwrap_or_default()
    }
}
