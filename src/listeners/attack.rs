//! Pet protection against player damage.

use crate::config::loader::PluginConfig;
use crate::config::manifest::{keys, messages};
use crate::listeners::{Channel, Dispatch, GameEvent, Listener};

/// Cancels damage dealt by players to pets they do not own.
///
/// Only registered while `disablePlayerDamage` is on. A pet that is angry at
/// its attacker can still be fought back when `enableAngryMobPlayerDamage` is
/// set.
#[derive(Default)]
pub struct PlayerAttackListener {
    angry_mob_damage: bool,
    protected: String,
}

impl PlayerAttackListener {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Listener for PlayerAttackListener {
    fn name(&self) -> &'static str {
        "player-attack"
    }

    fn extract_parameters(&mut self, config: &PluginConfig) {
        self.angry_mob_damage = config.settings.get_bool(keys::ENABLE_ANGRY_MOB_PLAYER_DAMAGE, true);
        self.protected = config.messages().get(messages::PET_PROTECTED);
    }

    fn handle(&mut self, event: &GameEvent, out: &mut Dispatch) {
        let GameEvent::DamageByPlayer { attacker, pet } = event else {
            return;
        };
        if !pet.owned_by_other(attacker) {
            return;
        }
        if self.angry_mob_damage && pet.angry_at == Some(attacker.id) {
            return;
        }
        out.cancel();
        out.send(attacker.id, Channel::Chat, self.protected.clone());
    }
}
