//! Versioned manifests of expected document keys.
//!
//! Each manifest lists the keys the current plugin version relies on, with the
//! default written when the key is missing and the comment placed above it.
//! Order matters: newly written keys are appended in manifest order.
//!
//! Upgrades from plugin versions older than [`MIN_SUPPORTED_VERSION`] are not
//! supported; files that old should be deleted and regenerated.

use crate::config::document::Value;

/// Oldest plugin version whose files can be upgraded in place.
pub const MIN_SUPPORTED_VERSION: &str = "1.2";

/// Default value of a manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl From<DefaultValue> for Value {
    fn from(d: DefaultValue) -> Self {
        match d {
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::Integer(i),
            DefaultValue::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// One expected key.
#[derive(Debug, Clone, Copy)]
pub struct SchemaEntry {
    pub key: &'static str,
    pub default: DefaultValue,
    pub description: &'static str,
}

const fn entry(key: &'static str, default: DefaultValue, description: &'static str) -> SchemaEntry {
    SchemaEntry { key, default, description }
}

/// Setting keys read by the plugin.
pub mod keys {
    pub const LANGUAGE_FILE_NAME: &str = "languageFileName";
    pub const CHECK_FOR_UPDATE: &str = "checkForUpdate";
    pub const CHANGE_OWNER_PRICE: &str = "changeOwnerPrice";
    pub const DISPLAY_DOG: &str = "displayDog";
    pub const DISPLAY_CAT: &str = "displayCat";
    pub const DISPLAY_HORSE: &str = "displayHorse";
    pub const DISPLAY_LLAMA: &str = "displayLlama";
    pub const DISPLAY_PARROT: &str = "displayParrot";
    pub const ACTION_BAR_MESSAGE: &str = "actionBarMessage";
    pub const DISPLAY_TO_OWNER: &str = "displayToOwner";
    pub const FREE_PET_PRICE: &str = "freePetPrice";
    pub const SHOW_HEALTH: &str = "showHealth";
    pub const DISABLE_PLAYER_DAMAGE: &str = "disablePlayerDamage";
    pub const ENABLE_ANGRY_MOB_PLAYER_DAMAGE: &str = "enableAngryMobPlayerDamage";
    pub const DISABLE_LEASH: &str = "disableLeash";
    pub const DISABLE_RIDING: &str = "disableRiding";
}

/// Default language file name.
pub const DEFAULT_LANGUAGE_FILE: &str = "lang.toml";

pub const SETTINGS_MANIFEST: &[SchemaEntry] = &[
    entry(keys::LANGUAGE_FILE_NAME, DefaultValue::Str(DEFAULT_LANGUAGE_FILE), "Name of the language file."),
    entry(
        keys::CHECK_FOR_UPDATE,
        DefaultValue::Bool(true),
        "Check for update on plugin launch and notify when an OP joins the game.",
    ),
    entry(keys::CHANGE_OWNER_PRICE, DefaultValue::Int(0), "Price of the /petm setowner command (requires Vault)."),
    entry(keys::DISPLAY_DOG, DefaultValue::Bool(true), "Take dogs into account."),
    entry(keys::DISPLAY_CAT, DefaultValue::Bool(true), "Take cats into account."),
    entry(keys::DISPLAY_HORSE, DefaultValue::Bool(true), "Take horses into account."),
    entry(keys::DISPLAY_LLAMA, DefaultValue::Bool(true), "Take llamas into account."),
    entry(keys::DISPLAY_PARROT, DefaultValue::Bool(true), "Take parrots into account."),
    entry(
        keys::ACTION_BAR_MESSAGE,
        DefaultValue::Bool(false),
        "Enable or disable action bar messages when right-clicking on a pet.",
    ),
    entry(
        keys::DISPLAY_TO_OWNER,
        DefaultValue::Bool(false),
        "Enable or disable showing ownership information for a player's own pets.",
    ),
    entry(keys::FREE_PET_PRICE, DefaultValue::Int(0), "Price of the /petm free command (requires Vault)."),
    entry(
        keys::SHOW_HEALTH,
        DefaultValue::Bool(true),
        "Show health next to owner in chat and action bar messages (not holograms).",
    ),
    entry(keys::DISABLE_PLAYER_DAMAGE, DefaultValue::Bool(false), "Protect pets to avoid being hurt by other player."),
    entry(
        keys::ENABLE_ANGRY_MOB_PLAYER_DAMAGE,
        DefaultValue::Bool(true),
        "Allows players to defend themselves against angry tamed mobs (e.g. dogs) even if disablePlayerDamage is true.",
    ),
    entry(keys::DISABLE_LEASH, DefaultValue::Bool(false), "Prevent others from using leash on pet."),
    entry(keys::DISABLE_RIDING, DefaultValue::Bool(false), "Prevent others from mounting pet (horse/donkey)."),
];

/// Message ids emitted by the plugin.
pub mod messages {
    pub const HELP_HEADER: &str = "petmaster-help-header";
    pub const PREFIX: &str = "petmaster-prefix";
    pub const MISUSED_COMMAND: &str = "misused-command";
    pub const NO_PERMISSIONS: &str = "no-permissions";
    pub const CONFIGURATION_RELOADED: &str = "configuration-successfully-reloaded";
    pub const CONFIGURATION_RELOAD_FAILED: &str = "configuration-reload-failed";
    pub const PETMASTER_DISABLED: &str = "petmaster-disabled";
    pub const PETMASTER_ENABLED: &str = "petmaster-enabled";
    pub const HELP_INFO: &str = "petmaster-help-info";
    pub const HELP_RELOAD: &str = "petmaster-help-reload";
    pub const HELP_ENABLE_DISABLE: &str = "petmaster-help-enable-disable";
    pub const HELP_SETOWNER: &str = "petmaster-help-setowner";
    pub const HELP_FREE: &str = "petmaster-help-free";
    pub const HELP_SETCOLOR: &str = "petmaster-help-setcolor";
    pub const HELP_SHAREPET: &str = "petmaster-help-sharepet";
    pub const HELP_GODPET: &str = "petmaster-help-godpet";
    pub const HELP_PETSKILL: &str = "petmaster-help-petskill";

    /// Help lines in display order.
    pub const HELP: &[&str] = &[
        HELP_INFO,
        HELP_RELOAD,
        HELP_ENABLE_DISABLE,
        HELP_SETOWNER,
        HELP_FREE,
        HELP_SETCOLOR,
        HELP_SHAREPET,
        HELP_GODPET,
        HELP_PETSKILL,
    ];

    pub const INFO_VERSION: &str = "petmaster-command-info-version";
    pub const INFO_AUTHOR: &str = "petmaster-command-info-author";
    pub const INFO_DESCRIPTION: &str = "petmaster-command-info-description";
    pub const PET_OWNER: &str = "petmaster-action-bar";
    pub const PET_HEALTH: &str = "petmaster-health";
    pub const NOT_OWNER_RIDE: &str = "not-owner-ride";
    pub const NOT_OWNER_LEASH: &str = "not-owner-leash";
    pub const PET_PROTECTED: &str = "pet-protected";
    pub const UPDATE_AVAILABLE: &str = "update-available";
}

pub const LANGUAGE_MANIFEST: &[SchemaEntry] = &[
    entry(
        messages::HELP_HEADER,
        DefaultValue::Str("<prefix> <gold>------------------ ♞<bold>PetMaster</bold>♞  ------------------"),
        "",
    ),
    entry(messages::PREFIX, DefaultValue::Str("<gray>[<gold>♞<gray>] "), ""),
    entry(messages::MISUSED_COMMAND, DefaultValue::Str("<prefix><red>Misused command. Please type <gold>/petm<red>."), ""),
    entry(messages::NO_PERMISSIONS, DefaultValue::Str("<prefix><red>You do not have the permission to do this."), ""),
    entry(
        messages::CONFIGURATION_RELOADED,
        DefaultValue::Str("<prefix><green>Configuration successfully reloaded."),
        "",
    ),
    entry(
        messages::CONFIGURATION_RELOAD_FAILED,
        DefaultValue::Str("<prefix><red>Errors while reloading configuration. Please view logs for more details."),
        "",
    ),
    entry(messages::PETMASTER_DISABLED, DefaultValue::Str("<prefix><gray>PetMaster disabled until <gold>/petm enable<gray>."), ""),
    entry(messages::PETMASTER_ENABLED, DefaultValue::Str("<prefix><gray>PetMaster enabled."), ""),
    entry(messages::HELP_INFO, DefaultValue::Str("<gold>/petm info <gray>Display various information about the plugin."), ""),
    entry(messages::HELP_RELOAD, DefaultValue::Str("<gold>/petm reload <gray>Reload the plugin's configuration."), ""),
    entry(
        messages::HELP_ENABLE_DISABLE,
        DefaultValue::Str("<gold>/petm enable|disable <gray>Toggle pet information display."),
        "",
    ),
    entry(messages::HELP_SETOWNER, DefaultValue::Str("<gold>/petm setowner <player> <gray>Give your pet to someone else."), ""),
    entry(messages::HELP_FREE, DefaultValue::Str("<gold>/petm free <gray>Free one of your pets."), ""),
    entry(messages::HELP_SETCOLOR, DefaultValue::Str("<gold>/petm setcolor <color> <gray>Change the color of your pet's collar."), ""),
    entry(messages::HELP_SHAREPET, DefaultValue::Str("<gold>/petm sharepet <gray>Share your pet with other players."), ""),
    entry(messages::HELP_GODPET, DefaultValue::Str("<gold>/petm godpet <gray>Make your pet invincible."), ""),
    entry(messages::HELP_PETSKILL, DefaultValue::Str("<gold>/petm petskill <gray>Use your pet's skill."), ""),
    entry(messages::INFO_VERSION, DefaultValue::Str("<prefix><gold>Version: <gray><version>"), ""),
    entry(messages::INFO_AUTHOR, DefaultValue::Str("<prefix><gold>Author: <gray>DarkPyves"), ""),
    entry(
        messages::INFO_DESCRIPTION,
        DefaultValue::Str("<prefix><gold>Description: <gray>Manage pets and display useful information via holograms, action bar or chat messages!"),
        "",
    ),
    entry(messages::PET_OWNER, DefaultValue::Str("<gold>Owner: <gray><owner>"), ""),
    entry(messages::PET_HEALTH, DefaultValue::Str("<gold>Health: <gray><health>/<max-health>"), ""),
    entry(messages::NOT_OWNER_RIDE, DefaultValue::Str("<prefix><red>You cannot ride a pet that isn't yours."), ""),
    entry(messages::NOT_OWNER_LEASH, DefaultValue::Str("<prefix><red>You cannot leash a pet that isn't yours."), ""),
    entry(messages::PET_PROTECTED, DefaultValue::Str("<prefix><red>This pet is protected, you cannot hurt it."), ""),
    entry(
        messages::UPDATE_AVAILABLE,
        DefaultValue::Str("<prefix><gold>A new version of PetMaster is available: <gray><version>"),
        "",
    ),
];

/// Language keys whose presence marks a file generated by an older version.
pub const OBSOLETE_LANGUAGE_KEYS: &[&str] = &["petmaster-command-info-hover"];
