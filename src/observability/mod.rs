//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle + activation produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (reload outcomes, migrations, live optional listeners)
//! ```
//!
//! # Design Decisions
//! - The library only emits; the host installs subscriber and recorder
//! - Without an installed recorder every metric call is a no-op

pub mod logging;
pub mod metrics;
