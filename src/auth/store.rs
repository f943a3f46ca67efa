//! Token record lifecycle against the secret store.
//!
//! ## Replace semantics
//! A store is an explicit delete-then-add at the derived address: any
//! previous record is removed first, then the new one is inserted. Each
//! sub-operation is atomic in the backend, but the pair is not: a
//! concurrent reader can observe "absent" in the window between the two.
//! Callers needing stronger atomicity must serialize their own calls per
//! (device id, role) pair; no locking or retries happen here.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::entry::DeviceAuthEntry;
use crate::auth::keys::{device_label, normalize_role, normalize_scopes, token_address};
use crate::secrets::{Accessibility, SecretStore};

/// Per-device, per-role token store over a secure secret-store backend.
///
/// Stateless aside from the backend handle and the service namespace every
/// record lives under; all operations are synchronous, blocking calls.
pub struct DeviceAuthStore<S: SecretStore> {
    backend: S,
    /// Service namespace for all records written by this store.
    service: String,
}

impl<S: SecretStore> DeviceAuthStore<S> {
    /// Create a store writing into the given service namespace.
    pub fn new(backend: S, service: impl Into<String>) -> Self {
        Self {
            backend,
            service: service.into(),
        }
    }

    /// Persist a token for (device id, role), replacing any previous record
    /// at the same address.
    ///
    /// The role and scopes are canonicalized before addressing or
    /// persisting, and `updated_at_ms` is stamped from the wall clock.
    /// Returns the newly created entry, or `None` if encoding or the
    /// backend write failed (logged; prior state at the address is only
    /// preserved when the failure precedes the delete sub-step).
    ///
    /// An empty token is accepted and persisted here but treated as absent
    /// by [`load_token`](Self::load_token).
    pub fn store_token(
        &self,
        device_id: &str,
        role: &str,
        token: &str,
        scopes: &[&str],
    ) -> Option<DeviceAuthEntry> {
        let entry = DeviceAuthEntry {
            token: token.to_string(),
            role: normalize_role(role),
            scopes: normalize_scopes(scopes),
            updated_at_ms: epoch_millis(),
        };

        let payload = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(device = %redact(device_id), "Failed to encode token record: {e}");
                return None;
            }
        };

        let address = token_address(device_id, role);

        // Unconditional replace: remove whatever is at the address, then
        // insert. The delete is tolerant of "not found".
        if let Err(e) = self.backend.delete(&self.service, &address) {
            tracing::warn!(device = %redact(device_id), "Failed to replace token record: {e}");
            return None;
        }
        if let Err(e) = self.backend.put(
            &self.service,
            &address,
            device_label(device_id),
            &payload,
            Accessibility::WhenUnlockedThisDeviceOnly,
        ) {
            tracing::warn!(device = %redact(device_id), "Failed to store token record: {e}");
            return None;
        }

        tracing::debug!(device = %redact(device_id), role = %entry.role, "Stored gateway token");
        Some(entry)
    }

    /// Load the token stored for (device id, role), if any.
    ///
    /// Returns `None` when no record exists, when the stored payload cannot
    /// be decoded (a corrupted record is indistinguishable from a missing
    /// one), or when the decoded record carries an empty token. Stored
    /// state is never mutated.
    pub fn load_token(&self, device_id: &str, role: &str) -> Option<DeviceAuthEntry> {
        let address = token_address(device_id, role);

        let payload = match self.backend.find_one(&self.service, &address) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(device = %redact(device_id), "Failed to read token record: {e}");
                return None;
            }
        };

        let entry: DeviceAuthEntry = match serde_json::from_slice(&payload) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    device = %redact(device_id),
                    "Discarding undecodable token record: {e}"
                );
                return None;
            }
        };

        if !entry.has_token() {
            tracing::debug!(
                device = %redact(device_id),
                role = %entry.role,
                "Stored record has no token; treating as absent"
            );
            return None;
        }

        Some(entry)
    }

    /// Delete the record for (device id, role). No-op if absent; backend
    /// failures are logged and swallowed (best-effort).
    pub fn clear_token(&self, device_id: &str, role: &str) {
        let address = token_address(device_id, role);
        if let Err(e) = self.backend.delete(&self.service, &address) {
            tracing::warn!(device = %redact(device_id), "Failed to clear token record: {e}");
        }
    }

    /// Delete every record for this device, regardless of role, in one
    /// label-scoped request. No-op if none exist; failures are logged and
    /// swallowed.
    pub fn clear_all_tokens(&self, device_id: &str) {
        if let Err(e) = self
            .backend
            .delete_by_label(&self.service, device_label(device_id))
        {
            tracing::warn!(device = %redact(device_id), "Failed to clear device tokens: {e}");
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Truncate an identifier for logging. Tokens themselves are never logged.
fn redact(id: &str) -> String {
    match id.char_indices().nth(4) {
        Some((idx, _)) => format!("{}***", &id[..idx]),
        None => "***".to_string(),
    }
}
