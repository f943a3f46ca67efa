//! Address derivation and normalization for stored token records.
//!
//! Every record lives at one canonical address derived from the device id
//! and the normalized role. The raw device id is attached to each record as
//! a label, used only for bulk lookup and deletion, never for uniqueness.
//! All functions here are pure; there are no error conditions. An empty
//! device id or role is accepted and normalized like any other string.

/// Separator between the device id and the normalized role in an address.
/// Gateway device ids are opaque short identifiers and roles normalize to
/// lowercase words, so the separator is not expected in either component.
const ADDRESS_SEPARATOR: char = '/';

/// Canonicalize a role string: trim surrounding whitespace, lowercase.
///
/// Addressing is therefore case- and whitespace-insensitive: `"Admin"`,
/// `" admin "` and `"ADMIN"` all collide to the same record by design.
pub fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

/// Derive the canonical storage address for a (device id, role) pair.
pub fn token_address(device_id: &str, role: &str) -> String {
    format!("{device_id}{ADDRESS_SEPARATOR}{}", normalize_role(role))
}

/// The group label for a device: the raw device id, unmodified.
pub fn device_label(device_id: &str) -> &str {
    device_id
}

/// Canonicalize a scope list: trim each entry, drop any that become empty,
/// deduplicate, sort ascending.
///
/// Scopes are descriptive metadata, not security-enforced here; the
/// canonical form exists so semantically identical scope sets compare and
/// serialize identically.
pub fn normalize_scopes<S: AsRef<str>>(scopes: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = scopes
        .iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
