//! Remote update check.
//!
//! # Data Flow
//! ```text
//! UpdateTask (tokio, recurring)
//!     → fetch project descriptor (reqwest)
//!     → compare with the running version
//!     → publish into UpdateSlot (only while the slot is active)
//!
//! UpdateNotifier (listener)
//!     → on join of a player with petmaster.admin
//!     → read UpdateSlot, send notice
//! ```
//!
//! # Design Decisions
//! - The task never touches configuration; its only output is the slot
//! - Cancelling closes the slot under its lock before aborting the task,
//!   so no result can be published once `cancel` returns

pub mod checker;
pub mod version;

pub use checker::{UpdateNotifier, UpdateSlot, UpdateTask};
