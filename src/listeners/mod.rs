//! Behavior units attached to the host's event dispatch.
//!
//! # Data Flow
//! ```text
//! host event (GameEvent)
//!     → EventBus::dispatch
//!     → every registered Listener, in registration order
//!     → Dispatch (cancellation flag + outgoing messages)
//!     → back to the host
//! ```
//!
//! # Design Decisions
//! - Listeners never read configuration while handling events; they cache what
//!   they need in `extract_parameters`, which runs on registration and reload
//! - The bus owns every listener; callers keep only the `ListenerId`
//! - Dispatch is synchronous on the caller's thread

pub mod attack;
pub mod interact;
pub mod leash;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use uuid::Uuid;

use crate::config::loader::PluginConfig;

pub use attack::PlayerAttackListener;
pub use interact::PlayerInteractListener;
pub use leash::PlayerLeashListener;

/// Permission granting administrative commands and update notices.
pub const ADMIN_PERMISSION: &str = "petmaster.admin";

/// An online player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub permissions: BTreeSet<String>,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.insert(permission.to_string());
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Tameable species the plugin knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetKind {
    Dog,
    Cat,
    Horse,
    Llama,
    Parrot,
}

/// Owner of a pet as recorded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
}

impl From<&Player> for Owner {
    fn from(player: &Player) -> Self {
        Self { id: player.id, name: player.name.clone() }
    }
}

/// A tameable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub id: Uuid,
    pub kind: PetKind,
    pub owner: Option<Owner>,
    pub health: f64,
    pub max_health: f64,
    /// Player the pet is currently hostile to.
    pub angry_at: Option<Uuid>,
}

impl Pet {
    pub fn new(kind: PetKind, owner: Option<&Player>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            owner: owner.map(Owner::from),
            health: 20.0,
            max_health: 20.0,
            angry_at: None,
        }
    }

    /// True when the pet has an owner other than `player`.
    pub fn owned_by_other(&self, player: &Player) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id != player.id)
    }
}

/// Events forwarded by the host.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// Right-click on an entity.
    Interact { player: Player, pet: Pet },
    /// Attempt to mount an entity.
    Mount { player: Player, pet: Pet },
    /// Attempt to attach a leash.
    Leash { player: Player, pet: Pet },
    /// A player deals damage to an entity.
    DamageByPlayer { attacker: Player, pet: Pet },
    PlayerJoin { player: Player },
}

/// Where a message is shown to its recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Chat,
    ActionBar,
    Hologram,
}

/// A message produced while handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub recipient: Uuid,
    pub channel: Channel,
    pub text: String,
}

/// Result of dispatching one event.
#[derive(Debug, Default, Clone)]
pub struct Dispatch {
    pub cancelled: bool,
    pub messages: Vec<Outgoing>,
}

impl Dispatch {
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn send(&mut self, recipient: Uuid, channel: Channel, text: String) {
        self.messages.push(Outgoing { recipient, channel, text });
    }
}

/// A behavior unit registered on the [`EventBus`].
pub trait Listener {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Re-read configuration values this listener depends on.
    fn extract_parameters(&mut self, config: &PluginConfig);

    fn handle(&mut self, event: &GameEvent, out: &mut Dispatch);
}

/// Registration handle returned by [`EventBus::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The host's event dispatch table.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Box<dyn Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener; it receives events until unregistered.
    pub fn register(&mut self, listener: Box<dyn Listener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        tracing::debug!(listener = listener.name(), id = %id, "Listener registered");
        self.listeners.insert(id, listener);
        id
    }

    /// Detach and drop a listener. Returns false if it was not registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        match self.listeners.remove(&id) {
            Some(listener) => {
                tracing::debug!(listener = listener.name(), id = %id, "Listener unregistered");
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Ask a registered listener to re-read its parameters.
    pub fn refresh(&mut self, id: ListenerId, config: &PluginConfig) -> bool {
        match self.listeners.get_mut(&id) {
            Some(listener) => {
                listener.extract_parameters(config);
                true
            }
            None => false,
        }
    }

    /// Deliver an event to every registered listener.
    pub fn dispatch(&mut self, event: &GameEvent) -> Dispatch {
        let mut out = Dispatch::default();
        for listener in self.listeners.values_mut() {
            listener.handle(event, &mut out);
        }
        out
    }
}
