//! Metric names and recording helpers.
//!
//! # Metrics
//! - `petmaster_reconcile_total` (counter): configuration loads by `outcome`
//!   (`success`, `failed`, `fatal`)
//! - `petmaster_migrated_keys_total` (counter): loads that upgraded a `document`
//! - `petmaster_optional_listeners` (gauge): optional listeners currently registered

pub const RECONCILE_TOTAL: &str = "petmaster_reconcile_total";
pub const MIGRATIONS_TOTAL: &str = "petmaster_migrated_keys_total";
pub const OPTIONAL_LISTENERS: &str = "petmaster_optional_listeners";

pub fn record_reconcile(outcome: &'static str) {
    ::metrics::counter!(RECONCILE_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_migration(document: &'static str) {
    ::metrics::counter!(MIGRATIONS_TOTAL, "document" => document).increment(1);
}

pub fn record_optional_listeners(count: usize) {
    ::metrics::gauge!(OPTIONAL_LISTENERS).set(count as f64);
}
