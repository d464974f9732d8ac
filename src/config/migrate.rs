//! Additive schema migration.
//!
//! Brings a document written by an older plugin version up to the current
//! manifest by appending the keys it lacks. Present keys, their values and
//! their comments are never touched, and unknown keys are left in place.

use crate::config::document::ConfigDocument;
use crate::config::manifest::SchemaEntry;

/// Append every manifest entry missing from `document`, in manifest order.
///
/// Returns `true` when the document was changed; the caller is expected to
/// save and reload it so the in-memory view matches the file.
pub fn reconcile(document: &mut ConfigDocument, manifest: &[SchemaEntry]) -> bool {
    let mut changed = false;
    for entry in manifest {
        if document.contains(entry.key) {
            continue;
        }
        document.set(entry.key, entry.default, entry.description);
        tracing::debug!(key = entry.key, path = %document.path().display(), "Added missing key");
        changed = true;
    }
    changed
}
