//! Ownership display and ride protection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::loader::PluginConfig;
use crate::config::manifest::{keys, messages};
use crate::listeners::{Channel, Dispatch, GameEvent, Listener, Pet, PetKind, Player};
use crate::messages::Messages;

/// Shows who owns a pet when a player right-clicks it, and keeps other
/// players off mounts they do not own when `disableRiding` is set.
pub struct PlayerInteractListener {
    /// Cleared by `/petm disable`.
    display_enabled: Arc<AtomicBool>,
    displayed: HashSet<PetKind>,
    action_bar: bool,
    display_to_owner: bool,
    show_health: bool,
    disable_riding: bool,
    messages: Messages,
}

impl PlayerInteractListener {
    pub fn new(display_enabled: Arc<AtomicBool>) -> Self {
        Self {
            display_enabled,
            displayed: HashSet::new(),
            action_bar: false,
            display_to_owner: false,
            show_health: true,
            disable_riding: false,
            messages: Messages::default(),
        }
    }

    fn show_owner(&self, player: &Player, pet: &Pet, out: &mut Dispatch) {
        if !self.display_enabled.load(Ordering::Relaxed) || !self.displayed.contains(&pet.kind) {
            return;
        }
        let Some(owner) = &pet.owner else {
            return;
        };
        if owner.id == player.id && !self.display_to_owner {
            return;
        }

        let owner_text = self.messages.format(messages::PET_OWNER, &[("owner", &owner.name)]);
        out.send(player.id, Channel::Hologram, owner_text.clone());

        let mut text = owner_text;
        if self.show_health {
            let health = format!("{:.0}", pet.health);
            let max_health = format!("{:.0}", pet.max_health);
            text.push(' ');
            text.push_str(&self.messages.format(
                messages::PET_HEALTH,
                &[("health", &health), ("max-health", &max_health)],
            ));
        }
        let channel = if self.action_bar { Channel::ActionBar } else { Channel::Chat };
        out.send(player.id, channel, text);
    }
}

impl Listener for PlayerInteractListener {
    fn name(&self) -> &'static str {
        "player-interact"
    }

    fn extract_parameters(&mut self, config: &PluginConfig) {
        let settings = &config.settings;
        self.displayed = [
            (PetKind::Dog, keys::DISPLAY_DOG),
            (PetKind::Cat, keys::DISPLAY_CAT),
            (PetKind::Horse, keys::DISPLAY_HORSE),
            (PetKind::Llama, keys::DISPLAY_LLAMA),
            (PetKind::Parrot, keys::DISPLAY_PARROT),
        ]
        .into_iter()
        .filter(|(_, key)| settings.get_bool(key, true))
        .map(|(kind, _)| kind)
        .collect();
        self.action_bar = settings.get_bool(keys::ACTION_BAR_MESSAGE, false);
        self.display_to_owner = settings.get_bool(keys::DISPLAY_TO_OWNER, false);
        self.show_health = settings.get_bool(keys::SHOW_HEALTH, true);
        self.disable_riding = settings.get_bool(keys::DISABLE_RIDING, false);
        self.messages = config.messages().clone();
    }

    fn handle(&mut self, event: &GameEvent, out: &mut Dispatch) {
        match event {
            GameEvent::Interact { player, pet } => self.show_owner(player, pet, out),
            GameEvent::Mount { player, pet } if self.disable_riding && pet.owned_by_other(player) => {
                out.cancel();
                out.send(player.id, Channel::Chat, self.messages.get(messages::NOT_OWNER_RIDE));
            }
            _ => {}
        }
    }
}
