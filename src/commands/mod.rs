//! The `/petm` command surface.
//!
//! Administrative subcommands (help, info, reload, enable, disable) are
//! answered here. Subcommands acting on a player's own pets are parsed here
//! and handed to a [`PetCommands`] implementation supplied by the host.

use std::fmt;
use std::str::FromStr;

use crate::config::loader::PluginConfig;
use crate::config::manifest::messages;
use crate::listeners::{Player, ADMIN_PERMISSION};
use crate::messages::Messages;

/// Root command label.
pub const ROOT_LABEL: &str = "petm";

/// Who issued a command.
#[derive(Debug, Clone)]
pub enum CommandSender {
    Console,
    Player(Player),
}

impl CommandSender {
    /// The console holds every permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        match self {
            CommandSender::Console => true,
            CommandSender::Player(player) => player.has_permission(permission),
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            CommandSender::Console => None,
            CommandSender::Player(player) => Some(player),
        }
    }
}

/// Subcommands that need a player sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetCommand {
    SetOwner,
    Free,
    SetColor,
    SharePet,
    GodPet,
    PetSkill,
}

impl PetCommand {
    pub fn name(self) -> &'static str {
        match self {
            PetCommand::SetOwner => "setowner",
            PetCommand::Free => "free",
            PetCommand::SetColor => "setcolor",
            PetCommand::SharePet => "sharepet",
            PetCommand::GodPet => "godpet",
            PetCommand::PetSkill => "petskill",
        }
    }

    /// Permission node a player needs to run the command.
    pub fn permission(self) -> String {
        format!("petmaster.{}", self.name())
    }
}

impl fmt::Display for PetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed `/petm` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Help,
    Info,
    Reload,
    Enable,
    Disable,
    Pet(PetCommand),
}

/// Error returned for an unrecognised subcommand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subcommand: {0}")]
pub struct UnknownSubcommand(pub String);

impl FromStr for Subcommand {
    type Err = UnknownSubcommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.to_ascii_lowercase().as_str() {
            "help" => Subcommand::Help,
            "info" => Subcommand::Info,
            "reload" => Subcommand::Reload,
            "enable" => Subcommand::Enable,
            "disable" => Subcommand::Disable,
            "setowner" => Subcommand::Pet(PetCommand::SetOwner),
            "free" => Subcommand::Pet(PetCommand::Free),
            "setcolor" => Subcommand::Pet(PetCommand::SetColor),
            "sharepet" => Subcommand::Pet(PetCommand::SharePet),
            "godpet" => Subcommand::Pet(PetCommand::GodPet),
            "petskill" => Subcommand::Pet(PetCommand::PetSkill),
            _ => return Err(UnknownSubcommand(s.to_string())),
        };
        Ok(command)
    }
}

impl Subcommand {
    /// Parse the arguments following the root label; no arguments means help.
    pub fn parse(args: &[&str]) -> Result<Self, UnknownSubcommand> {
        match args.first() {
            None => Ok(Subcommand::Help),
            Some(first) => first.parse(),
        }
    }

    /// Permission required to run the subcommand, if any.
    pub fn permission(self) -> Option<String> {
        match self {
            Subcommand::Help | Subcommand::Info => None,
            Subcommand::Reload | Subcommand::Enable | Subcommand::Disable => Some(ADMIN_PERMISSION.to_string()),
            Subcommand::Pet(command) => Some(command.permission()),
        }
    }
}

/// Executes the player-only subcommands.
///
/// Implementations return the lines to send back to the player.
pub trait PetCommands {
    fn execute(&mut self, command: PetCommand, player: &Player, args: &[&str], config: &PluginConfig) -> Vec<String>;
}

/// A `PetCommands` for hosts without pet interaction; every call is logged
/// and answered with nothing.
#[derive(Debug, Default)]
pub struct NoPetCommands;

impl PetCommands for NoPetCommands {
    fn execute(&mut self, command: PetCommand, player: &Player, _args: &[&str], _config: &PluginConfig) -> Vec<String> {
        tracing::debug!(command = %command, player = %player.name, "Pet command ignored by host");
        Vec::new()
    }
}

/// Header followed by one line per subcommand.
pub fn help(messages: &Messages) -> Vec<String> {
    std::iter::once(messages::HELP_HEADER)
        .chain(messages::HELP.iter().copied())
        .map(|key| messages.get(key))
        .collect()
}

pub fn info(messages: &Messages) -> Vec<String> {
    vec![
        messages.get(messages::HELP_HEADER),
        messages.format(messages::INFO_VERSION, &[("version", env!("CARGO_PKG_VERSION"))]),
        messages.get(messages::INFO_AUTHOR),
        messages.get(messages::INFO_DESCRIPTION),
    ]
}
