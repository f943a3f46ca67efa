//! The persisted token record.

use serde::{Deserialize, Serialize};

/// A gateway-issued token persisted for one (device id, role) pair.
///
/// Serialized to JSON for the secret-store payload. `scopes` is kept in
/// canonical form (trimmed, deduplicated, sorted ascending) so the same
/// logical record always serializes to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAuthEntry {
    /// Opaque credential issued by the gateway. Never logged.
    pub token: String,
    /// Normalized role this token authorizes ("admin", "viewer", ...).
    /// Always equals the normalized role used to derive the record address.
    pub role: String,
    /// Canonical scope list.
    pub scopes: Vec<String>,
    /// Milliseconds since the Unix epoch, stamped at write time.
    /// Informational only; never used for eviction or comparison.
    pub updated_at_ms: u64,
}

impl DeviceAuthEntry {
    /// Whether the entry carries a usable credential. A record that decodes
    /// with an empty token is treated as absent on load.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}
