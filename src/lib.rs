//! PairVault: per-device, per-role gateway token storage.
//!
//! After a device completes pairing with the gateway it receives a
//! short-lived token scoped to a role ("admin", "viewer", ...). PairVault
//! persists those tokens in a secure secret store, keyed by the
//! (device id, role) pair, and retrieves or clears them on demand.
//!
//! ## Design
//! - One canonical address per (device id, normalized role). Writing to an
//!   occupied address replaces the previous record, so a repeated store is
//!   idempotent.
//! - The raw device id doubles as a label on every record, so every token
//!   for a device can be cleared in a single request without enumerating
//!   roles.
//! - Corrupt or degenerate stored records are treated as absent. Callers
//!   see "re-authentication required", never a decode error.
//! - Backends implement the typed [`secrets::SecretStore`] capability
//!   interface; an in-memory backend and an encrypted SQLite backend ship
//!   in-tree.

pub mod auth;
pub mod secrets;

pub use auth::{DeviceAuthEntry, DeviceAuthStore};
pub use secrets::{
    Accessibility, MemorySecretStore, SecretStore, SecretStoreError, SqliteSecretStore,
};
