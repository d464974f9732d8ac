mod common;

use common::{backups, data_dir, plugin, read, write, RecordingCommands};
use pet_master::commands::CommandSender;
use pet_master::config::loader::DEFAULT_LANGUAGE;
use pet_master::config::manifest::{messages, LANGUAGE_MANIFEST, SETTINGS_MANIFEST};
use pet_master::lifecycle::OptionalListener;
use pet_master::listeners::{GameEvent, Pet, PetKind, Player, ADMIN_PERMISSION};
use pet_master::{EventBus, LifecycleManager, LifecycleOptions, PetMaster, PluginState};

const NO_UPDATES: &str = "checkForUpdate = false\n";

fn reply(plugin: &PetMaster, key: &str) -> Vec<String> {
    vec![plugin.manager().config().unwrap().messages().get(key)]
}

#[test]
fn test_invalid_settings_keep_plugin_disabled() {
    let dir = data_dir("checkForUpdate = \n");
    let mut plugin = plugin(dir.path());

    assert!(plugin.on_enable().is_err());
    assert_eq!(plugin.state(), PluginState::Disabled);
    assert!(plugin.bus().is_empty());
    assert!(plugin.on_command(&CommandSender::Console, "petm", &["info"]).is_none());
}

#[test]
fn test_invalid_language_file_keeps_plugin_disabled() {
    let dir = data_dir(NO_UPDATES);
    write(dir.path(), "lang.toml", "petmaster-prefix = \"unterminated\n");
    let mut plugin = plugin(dir.path());

    assert!(plugin.on_enable().is_err());
    assert_eq!(plugin.state(), PluginState::Disabled);
    assert!(plugin.bus().is_empty());
}

#[test]
fn test_failed_reload_keeps_previous_configuration() {
    let dir = data_dir("disablePlayerDamage = true\ncheckForUpdate = false\n");
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();
    assert_eq!(plugin.bus().len(), 3);

    write(dir.path(), "config.toml", "disablePlayerDamage = = false\n");
    let answer = plugin.on_command(&CommandSender::Console, "petm", &["reload"]).unwrap();
    assert_eq!(answer, reply(&plugin, messages::CONFIGURATION_RELOAD_FAILED));

    assert_eq!(plugin.state(), PluginState::Enabled);
    let config = plugin.manager().config().unwrap();
    assert!(config.settings.get_bool("disablePlayerDamage", false));
    assert_eq!(plugin.bus().len(), 3);

    let owner = Player::new("Alex");
    let attack = GameEvent::DamageByPlayer {
        attacker: Player::new("Steve"),
        pet: Pet::new(PetKind::Cat, Some(&owner)),
    };
    assert!(plugin.dispatch(&attack).cancelled);
}

#[test]
fn test_reload_flips_optional_listeners() {
    let dir = data_dir(NO_UPDATES);
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();
    assert_eq!(plugin.bus().len(), 2);

    write(dir.path(), "config.toml", "disablePlayerDamage = true\ncheckForUpdate = false\n");
    let report = plugin.reload(false).unwrap();
    assert_eq!(report.listeners.registered, vec![OptionalListener::PetProtection]);
    assert_eq!(plugin.bus().len(), 3);

    for _ in 0..3 {
        assert!(plugin.reload(false).unwrap().listeners.is_noop());
        assert_eq!(plugin.bus().len(), 3);
    }

    write(dir.path(), "config.toml", "disablePlayerDamage = false\ncheckForUpdate = false\n");
    let report = plugin.reload(false).unwrap();
    assert_eq!(report.listeners.unregistered, vec![OptionalListener::PetProtection]);
    assert_eq!(plugin.bus().len(), 2);
    assert!(!plugin.manager().activation().has_pending_task());

    let owner = Player::new("Alex");
    let attack = GameEvent::DamageByPlayer {
        attacker: Player::new("Steve"),
        pet: Pet::new(PetKind::Dog, Some(&owner)),
    };
    assert!(!plugin.dispatch(&attack).cancelled);
}

#[test]
fn test_upgrade_writes_missing_keys_once() {
    let dir = data_dir("# tuned by hand\ncheckForUpdate = false\ncustomKey = 3\n");
    let mut bus = EventBus::new();
    let mut manager = LifecycleManager::new(LifecycleOptions::new(dir.path()), None);

    let report = manager.initialize(&mut bus).unwrap();
    assert!(report.settings_migrated);
    assert!(!report.lang_migrated);

    let upgraded = read(dir.path(), "config.toml");
    assert!(upgraded.starts_with("# tuned by hand\ncheckForUpdate = false\ncustomKey = 3\n"));
    let settings = &manager.config().unwrap().settings;
    for entry in SETTINGS_MANIFEST {
        assert!(settings.contains(entry.key), "missing {}", entry.key);
    }
    assert!(!settings.get_bool("checkForUpdate", true));
    assert_eq!(settings.get_int("customKey", 0), 3);
    assert!(upgraded.find("languageFileName").unwrap() < upgraded.find("disableRiding").unwrap());

    let report = manager.reconcile(&mut bus, true).unwrap();
    assert!(!report.settings_migrated);
    assert_eq!(read(dir.path(), "config.toml"), upgraded);
}

#[test]
fn test_language_upgrade_keeps_custom_texts() {
    let dir = data_dir(NO_UPDATES);
    write(dir.path(), "lang.toml", "petmaster-prefix = \"[PM] \"\n");
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    let config = plugin.manager().config().unwrap();
    for entry in LANGUAGE_MANIFEST {
        assert!(config.lang.contains(entry.key), "missing {}", entry.key);
    }
    assert!(config.messages().get(messages::NO_PERMISSIONS).starts_with("[PM] "));
    assert!(read(dir.path(), "lang.toml").starts_with("petmaster-prefix = \"[PM] \"\n"));
}

#[test]
fn test_stale_language_file_is_only_reported() {
    let dir = data_dir(NO_UPDATES);
    write(
        dir.path(),
        "lang.toml",
        &format!("{DEFAULT_LANGUAGE}\npetmaster-command-info-hover = \"old\"\n"),
    );
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    let config = plugin.manager().config().unwrap();
    assert_eq!(config.obsolete_language_keys(), vec!["petmaster-command-info-hover"]);
    assert!(config.lang.contains("petmaster-command-info-hover"));
    assert_eq!(plugin.state(), PluginState::Enabled);
}

#[test]
fn test_language_file_name_is_honoured() {
    let dir = data_dir("languageFileName = \"lang_fr.toml\"\ncheckForUpdate = false\n");
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    assert!(dir.path().join("lang_fr.toml").exists());
    assert!(!dir.path().join("lang.toml").exists());
}

#[test]
fn test_every_load_backs_up_both_files() {
    let dir = data_dir(NO_UPDATES);
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    assert!(backups(dir.path(), "config.toml") >= 1);
    assert!(backups(dir.path(), "lang.toml") >= 1);
}

#[test]
fn test_disable_releases_all_listeners() {
    let dir = data_dir("disablePlayerDamage = true\ncheckForUpdate = false\n");
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    plugin.on_disable();
    assert!(plugin.bus().is_empty());
    assert_eq!(plugin.manager().activation().registered_count(), 0);
    assert_eq!(plugin.state(), PluginState::Disabled);
}

#[test]
fn test_command_permissions_and_senders() {
    let dir = data_dir(NO_UPDATES);
    let recorder = RecordingCommands::default();
    let mut plugin = PetMaster::new(LifecycleOptions::new(dir.path()), None, Box::new(recorder.clone()));
    plugin.on_enable().unwrap();

    let console = CommandSender::Console;
    assert!(plugin.on_command(&console, "tp", &["Steve"]).is_none());
    assert_eq!(
        plugin.on_command(&console, "petm", &["fly"]).unwrap(),
        reply(&plugin, messages::MISUSED_COMMAND)
    );
    assert_eq!(
        plugin.on_command(&console, "petm", &["free"]).unwrap(),
        reply(&plugin, messages::MISUSED_COMMAND)
    );
    assert_eq!(
        plugin.on_command(&console, "PETM", &["reload"]).unwrap(),
        reply(&plugin, messages::CONFIGURATION_RELOADED)
    );

    let steve = CommandSender::Player(Player::new("Steve"));
    assert_eq!(
        plugin.on_command(&steve, "petm", &["reload"]).unwrap(),
        reply(&plugin, messages::NO_PERMISSIONS)
    );
    assert_eq!(
        plugin.on_command(&steve, "petm", &["free"]).unwrap(),
        reply(&plugin, messages::NO_PERMISSIONS)
    );
    let help = plugin.on_command(&steve, "petm", &[]).unwrap();
    assert_eq!(help.len(), 1 + messages::HELP.len());

    let alex = CommandSender::Player(Player::new("Alex").with_permission("petmaster.godpet"));
    assert_eq!(plugin.on_command(&alex, "petm", &["godpet", "on"]).unwrap(), vec!["godpet done"]);
    let calls = recorder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "Alex");
    assert_eq!(calls[0].2, vec!["on".to_string()]);
}

#[test]
fn test_display_toggle_commands() {
    let dir = data_dir(NO_UPDATES);
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    let owner = Player::new("Alex");
    let interact = GameEvent::Interact {
        player: Player::new("Steve"),
        pet: Pet::new(PetKind::Horse, Some(&owner)),
    };
    assert_eq!(plugin.dispatch(&interact).messages.len(), 2);

    let admin = CommandSender::Player(Player::new("Op").with_permission(ADMIN_PERMISSION));
    assert_eq!(
        plugin.on_command(&admin, "petm", &["disable"]).unwrap(),
        reply(&plugin, messages::PETMASTER_DISABLED)
    );
    assert!(plugin.dispatch(&interact).messages.is_empty());

    plugin.on_command(&admin, "petm", &["enable"]).unwrap();
    assert_eq!(plugin.dispatch(&interact).messages.len(), 2);
}

#[test]
fn test_repeated_enable_keeps_one_set_of_listeners() {
    let dir = data_dir(NO_UPDATES);
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();
    plugin.on_enable().unwrap();
    assert_eq!(plugin.bus().len(), 2);

    write(dir.path(), "config.toml", "checkForUpdate = \n");
    assert!(plugin.on_enable().is_err());
    assert_eq!(plugin.state(), PluginState::Disabled);
    assert!(plugin.bus().is_empty());
}

#[test]
fn test_crlf_settings_survive_upgrade() {
    let dir = data_dir("checkForUpdate = false\r\ncustomKey = 3\r\n");
    let mut plugin = plugin(dir.path());
    plugin.on_enable().unwrap();

    let on_disk = read(dir.path(), "config.toml");
    assert!(on_disk.starts_with("checkForUpdate = false\r\ncustomKey = 3\r\n"));
    assert!(!on_disk.replace("\r\n", "").contains('\n'));
}
