//! Leash protection.

use crate::config::loader::PluginConfig;
use crate::config::manifest::{keys, messages};
use crate::listeners::{Channel, Dispatch, GameEvent, Listener};

/// Cancels leashing of someone else's pet when `disableLeash` is set.
#[derive(Default)]
pub struct PlayerLeashListener {
    disable_leash: bool,
    denied: String,
}

impl PlayerLeashListener {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Listener for PlayerLeashListener {
    fn name(&self) -> &'static str {
        "player-leash"
    }

    fn extract_parameters(&mut self, config: &PluginConfig) {
        self.disable_leash = config.settings.get_bool(keys::DISABLE_LEASH, false);
        self.denied = config.messages().get(messages::NOT_OWNER_LEASH);
    }

    fn handle(&mut self, event: &GameEvent, out: &mut Dispatch) {
        if let GameEvent::Leash { player, pet } = event {
            if self.disable_leash && pet.owned_by_other(player) {
                out.cancel();
                out.send(player.id, Channel::Chat, self.denied.clone());
            }
        }
    }
}
