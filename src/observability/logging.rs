//! Structured logging setup for the `pet-master` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "pet_master=info";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Calling this twice is harmless; the
/// second subscriber is dropped.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
