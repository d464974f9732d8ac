//! Update check task and the join listener that reports its result.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time;
use url::Url;

use crate::config::loader::PluginConfig;
use crate::config::manifest::messages;
use crate::listeners::{Channel, Dispatch, GameEvent, Listener, ADMIN_PERMISSION};
use crate::messages::Messages;
use crate::update::version::{descriptor_version, is_newer};

/// Project descriptor holding the latest released version.
pub const DEFAULT_UPDATE_URL: &str = "https://raw.githubusercontent.com/PyvesB/PetMaster/master/pom.xml";

/// Delay between two checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for a single update check.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no version found in {0}")]
    MissingVersion(Url),
}

#[derive(Debug, Default)]
struct SlotState {
    open: bool,
    latest: Option<String>,
}

/// Shared result of the update check.
#[derive(Debug, Clone, Default)]
pub struct UpdateSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl UpdateSlot {
    /// A slot that accepts results.
    pub fn open() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotState { open: true, latest: None })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SlotState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a newer version. Returns false once the slot is closed.
    pub fn publish(&self, version: &str) -> bool {
        let mut state = self.state();
        if !state.open {
            return false;
        }
        state.latest = Some(version.to_string());
        true
    }

    /// Newer version found by the last successful check.
    pub fn latest(&self) -> Option<String> {
        self.state().latest.clone()
    }

    /// Stop accepting results.
    pub fn close(&self) {
        self.state().open = false;
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }
}

/// The recurring background check.
#[derive(Debug)]
pub struct UpdateTask {
    slot: UpdateSlot,
    handle: JoinHandle<()>,
}

impl UpdateTask {
    /// Start checking `url` now and then every `interval`.
    pub fn spawn(runtime: &Handle, url: Url, interval: Duration, slot: UpdateSlot) -> Self {
        let task_slot = slot.clone();
        let handle = runtime.spawn(async move {
            run(url, interval, task_slot).await;
        });
        Self { slot, handle }
    }

    pub fn slot(&self) -> &UpdateSlot {
        &self.slot
    }

    /// Stop the task. Nothing is published after this returns.
    pub fn cancel(self) {
        self.slot.close();
        self.handle.abort();
        tracing::debug!("Update check task cancelled");
    }
}

async fn run(url: Url, interval: Duration, slot: UpdateSlot) {
    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build update check client");
            return;
        }
    };

    tracing::info!(url = %url, interval_secs = interval.as_secs(), "Update checker starting");
    let mut ticker = time::interval(interval);

    loop {
        ticker.tick().await;
        if !slot.is_open() {
            break;
        }

        match fetch_latest(&client, &url).await {
            Ok(version) if is_newer(&version, env!("CARGO_PKG_VERSION")) => {
                if slot.publish(&version) {
                    tracing::warn!(
                        current = env!("CARGO_PKG_VERSION"),
                        latest = %version,
                        "A new version of PetMaster is available"
                    );
                }
            }
            Ok(version) => tracing::debug!(latest = %version, "PetMaster is up to date"),
            Err(e) => tracing::warn!(error = %e, "Update check failed"),
        }
    }
}

/// Fetch the descriptor at `url` and return the version it declares.
pub async fn fetch_latest(client: &reqwest::Client, url: &Url) -> Result<String, UpdateError> {
    let body = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    descriptor_version(&body)
        .map(str::to_string)
        .ok_or_else(|| UpdateError::MissingVersion(url.clone()))
}

/// Tells administrators about a pending update when they join.
pub struct UpdateNotifier {
    slot: UpdateSlot,
    messages: Messages,
}

impl UpdateNotifier {
    pub fn new(slot: UpdateSlot) -> Self {
        Self { slot, messages: Messages::default() }
    }
}

impl Listener for UpdateNotifier {
    fn name(&self) -> &'static str {
        "update-notifier"
    }

    fn extract_parameters(&mut self, config: &PluginConfig) {
        self.messages = config.messages().clone();
    }

    fn handle(&mut self, event: &GameEvent, out: &mut Dispatch) {
        let GameEvent::PlayerJoin { player } = event else {
            return;
        };
        if !player.has_permission(ADMIN_PERMISSION) {
            return;
        }
        if let Some(version) = self.slot.latest() {
            let text = self.messages.format(messages::UPDATE_AVAILABLE, &[("version", &version)]);
            out.send(player.id, Channel::Chat, text);
        }
    }
}
