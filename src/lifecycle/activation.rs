//! Flag-driven registration of optional listeners.
//!
//! Each optional listener kind is either absent from `active` (Unregistered)
//! or present with the handle of its single live instance (Registered).
//! `sync` is the only place that moves a kind between the two states.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use url::Url;

use crate::config::document::ConfigDocument;
use crate::config::loader::PluginConfig;
use crate::config::manifest::keys;
use crate::listeners::{EventBus, ListenerId, PlayerAttackListener};
use crate::observability::metrics;
use crate::update::checker::{DEFAULT_CHECK_INTERVAL, DEFAULT_UPDATE_URL};
use crate::update::{UpdateNotifier, UpdateSlot, UpdateTask};

/// Listener kinds whose registration follows a boolean setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionalListener {
    /// `disablePlayerDamage`: protects pets from other players.
    PetProtection,
    /// `checkForUpdate`: background update check plus join notice.
    UpdateCheck,
}

impl OptionalListener {
    pub const ALL: [OptionalListener; 2] = [OptionalListener::PetProtection, OptionalListener::UpdateCheck];

    /// Setting key holding the flag.
    pub fn flag(self) -> &'static str {
        match self {
            OptionalListener::PetProtection => keys::DISABLE_PLAYER_DAMAGE,
            OptionalListener::UpdateCheck => keys::CHECK_FOR_UPDATE,
        }
    }

    /// Flag value assumed when the setting is missing.
    pub fn default_enabled(self) -> bool {
        match self {
            OptionalListener::PetProtection => false,
            OptionalListener::UpdateCheck => true,
        }
    }
}

impl fmt::Display for OptionalListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

/// Desired state of every optional listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationFlags(BTreeMap<OptionalListener, bool>);

impl ActivationFlags {
    /// Read every flag from the settings document.
    pub fn from_settings(settings: &ConfigDocument) -> Self {
        Self(
            OptionalListener::ALL
                .into_iter()
                .map(|kind| (kind, settings.get_bool(kind.flag(), kind.default_enabled())))
                .collect(),
        )
    }

    pub fn get(&self, kind: OptionalListener) -> bool {
        self.0.get(&kind).copied().unwrap_or(false)
    }

    pub fn set(&mut self, kind: OptionalListener, enabled: bool) {
        self.0.insert(kind, enabled);
    }
}

/// Where and how often the update check runs.
#[derive(Debug, Clone)]
pub struct UpdateCheckOptions {
    pub url: Url,
    pub interval: Duration,
}

impl Default for UpdateCheckOptions {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_UPDATE_URL).expect("DEFAULT_UPDATE_URL is a valid URL"),
            interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

/// Transitions applied by one `sync` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub registered: Vec<OptionalListener>,
    pub unregistered: Vec<OptionalListener>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.registered.is_empty() && self.unregistered.is_empty()
    }
}

/// A registered optional listener.
#[derive(Debug)]
struct ActiveListener {
    id: ListenerId,
    /// Background work owned by the listener, cancelled on deregistration.
    task: Option<UpdateTask>,
}

/// Owns the optional listeners and keeps them in line with the settings.
pub struct ListenerActivation {
    active: BTreeMap<OptionalListener, ActiveListener>,
    runtime: Option<Handle>,
    update: UpdateCheckOptions,
}

impl ListenerActivation {
    /// `runtime` runs the update check; without it the notifier is registered
    /// but no check is scheduled.
    pub fn new(runtime: Option<Handle>, update: UpdateCheckOptions) -> Self {
        Self {
            active: BTreeMap::new(),
            runtime,
            update,
        }
    }

    /// Register or deregister each optional listener to match `flags`.
    ///
    /// Kinds already in the requested state are left alone, so calling this
    /// repeatedly with the same flags changes nothing.
    pub fn sync(&mut self, flags: &ActivationFlags, bus: &mut EventBus, config: &PluginConfig) -> SyncReport {
        let mut report = SyncReport::default();

        for kind in OptionalListener::ALL {
            let wanted = flags.get(kind);
            match (wanted, self.active.contains_key(&kind)) {
                (true, false) => {
                    let active = self.activate(kind, bus, config);
                    self.active.insert(kind, active);
                    report.registered.push(kind);
                }
                (false, true) => {
                    if let Some(active) = self.active.remove(&kind) {
                        Self::deactivate(kind, active, bus);
                    }
                    report.unregistered.push(kind);
                }
                _ => {}
            }
        }

        if !report.is_noop() {
            tracing::info!(
                registered = ?report.registered,
                unregistered = ?report.unregistered,
                "Optional listeners updated"
            );
        }
        metrics::record_optional_listeners(self.active.len());
        report
    }

    /// Deregister every optional listener and cancel their tasks.
    pub fn deactivate_all(&mut self, bus: &mut EventBus) {
        for (kind, active) in std::mem::take(&mut self.active) {
            Self::deactivate(kind, active, bus);
        }
        metrics::record_optional_listeners(0);
    }

    pub fn is_registered(&self, kind: OptionalListener) -> bool {
        self.active.contains_key(&kind)
    }

    /// Handle of the live instance of `kind`, if registered.
    pub fn listener_id(&self, kind: OptionalListener) -> Option<ListenerId> {
        self.active.get(&kind).map(|active| active.id)
    }

    pub fn registered_count(&self) -> usize {
        self.active.len()
    }

    /// True while any background task is scheduled.
    pub fn has_pending_task(&self) -> bool {
        self.active.values().any(|active| active.task.is_some())
    }

    /// Result slot of the running update check.
    pub fn update_slot(&self) -> Option<&UpdateSlot> {
        self.active
            .get(&OptionalListener::UpdateCheck)
            .and_then(|active| active.task.as_ref())
            .map(UpdateTask::slot)
    }

    fn activate(&self, kind: OptionalListener, bus: &mut EventBus, config: &PluginConfig) -> ActiveListener {
        match kind {
            OptionalListener::PetProtection => {
                let id = bus.register(Box::new(PlayerAttackListener::new()));
                bus.refresh(id, config);
                ActiveListener { id, task: None }
            }
            OptionalListener::UpdateCheck => {
                let slot = UpdateSlot::open();
                let task = match &self.runtime {
                    Some(runtime) => Some(UpdateTask::spawn(
                        runtime,
                        self.update.url.clone(),
                        self.update.interval,
                        slot.clone(),
                    )),
                    None => {
                        tracing::warn!("No async runtime available, update check not scheduled");
                        None
                    }
                };
                let id = bus.register(Box::new(UpdateNotifier::new(slot)));
                bus.refresh(id, config);
                ActiveListener { id, task }
            }
        }
    }

    fn deactivate(kind: OptionalListener, active: ActiveListener, bus: &mut EventBus) {
        if let Some(task) = active.task {
            task.cancel();
        }
        if !bus.unregister(active.id) {
            tracing::warn!(listener = %kind, id = %active.id, "Optional listener was already unregistered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> PluginConfig {
        PluginConfig::new(
            ConfigDocument::parse(Path::new("config.toml"), String::new()).unwrap(),
            ConfigDocument::parse(Path::new("lang.toml"), String::new()).unwrap(),
        )
    }

    fn flags(protection: bool, update: bool) -> ActivationFlags {
        let mut flags = ActivationFlags::from_settings(&config().settings);
        flags.set(OptionalListener::PetProtection, protection);
        flags.set(OptionalListener::UpdateCheck, update);
        flags
    }

    #[test]
    fn test_flags_default_from_settings() {
        let flags = ActivationFlags::from_settings(&config().settings);
        assert!(!flags.get(OptionalListener::PetProtection));
        assert!(flags.get(OptionalListener::UpdateCheck));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut bus = EventBus::new();
        let mut activation = ListenerActivation::new(None, UpdateCheckOptions::default());
        let config = config();

        let first = activation.sync(&flags(true, false), &mut bus, &config);
        assert_eq!(first.registered, vec![OptionalListener::PetProtection]);
        let id = activation.listener_id(OptionalListener::PetProtection);

        for _ in 0..3 {
            assert!(activation.sync(&flags(true, false), &mut bus, &config).is_noop());
            assert_eq!(bus.len(), 1);
        }
        assert_eq!(activation.listener_id(OptionalListener::PetProtection), id);
    }

    #[test]
    fn test_flip_leaves_nothing_behind() {
        let mut bus = EventBus::new();
        let mut activation = ListenerActivation::new(None, UpdateCheckOptions::default());
        let config = config();

        activation.sync(&flags(false, false), &mut bus, &config);
        activation.sync(&flags(true, true), &mut bus, &config);
        assert_eq!(activation.registered_count(), 2);
        assert_eq!(bus.len(), 2);

        let report = activation.sync(&flags(false, false), &mut bus, &config);
        assert_eq!(report.unregistered.len(), 2);
        assert_eq!(activation.registered_count(), 0);
        assert!(bus.is_empty());
        assert!(!activation.has_pending_task());
    }

    #[test]
    fn test_reregistration_creates_fresh_instance() {
        let mut bus = EventBus::new();
        let mut activation = ListenerActivation::new(None, UpdateCheckOptions::default());
        let config = config();

        activation.sync(&flags(true, false), &mut bus, &config);
        let first = activation.listener_id(OptionalListener::PetProtection).unwrap();
        activation.sync(&flags(false, false), &mut bus, &config);
        activation.sync(&flags(true, false), &mut bus, &config);
        let second = activation.listener_id(OptionalListener::PetProtection).unwrap();

        assert_ne!(first, second);
        assert!(!bus.is_registered(first));
        assert!(bus.is_registered(second));
    }

    #[tokio::test]
    async fn test_update_task_cancelled_on_flip() {
        let mut bus = EventBus::new();
        let options = UpdateCheckOptions {
            url: Url::parse("http://127.0.0.1:9/pom.xml").unwrap(),
            interval: Duration::from_secs(3600),
        };
        let mut activation = ListenerActivation::new(Some(Handle::current()), options);
        let config = config();

        activation.sync(&flags(false, true), &mut bus, &config);
        assert!(activation.has_pending_task());
        let slot = activation.update_slot().cloned().unwrap();

        activation.sync(&flags(false, false), &mut bus, &config);
        assert!(!activation.has_pending_task());
        assert!(!slot.is_open());
        assert!(bus.is_empty());
    }
}
