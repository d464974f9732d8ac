//! Version extraction and comparison.

/// Project version declared in a Maven-style project descriptor.
///
/// The `<parent>` block is skipped, its version belongs to another project.
pub fn descriptor_version(body: &str) -> Option<&str> {
    let search_from = match body.find("</parent>") {
        Some(end) => end + "</parent>".len(),
        None => 0,
    };
    let rest = &body[search_from..];
    let start = rest.find("<version>")? + "<version>".len();
    let end = rest[start..].find("</version>")? + start;
    let version = rest[start..end].trim();
    (!version.is_empty()).then_some(version)
}

/// Numeric components of a dotted version; qualifiers such as `-SNAPSHOT`
/// are ignored.
fn components(version: &str) -> Vec<u64> {
    version
        .split(['-', '+'])
        .next()
        .unwrap_or_default()
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}

/// True when `remote` is strictly newer than `local`.
pub fn is_newer(remote: &str, local: &str) -> bool {
    let remote = components(remote);
    let local = components(local);
    let len = remote.len().max(local.len());
    for i in 0..len {
        let r = remote.get(i).copied().unwrap_or(0);
        let l = local.get(i).copied().unwrap_or(0);
        if r != l {
            return r > l;
        }
    }
    false
}
