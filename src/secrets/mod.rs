//! Secure secret-store backends.
//!
//! The token store talks to an opaque key/value secret store through the
//! [`SecretStore`] trait: explicit typed parameters instead of a
//! backend-specific attribute bag. One logical record lives per
//! (service, address); the label groups records for bulk deletion and
//! carries no uniqueness.
//!
//! Two backends ship in-tree:
//! - [`MemorySecretStore`]: in-process map, for tests and ephemeral use
//! - [`SqliteSecretStore`]: durable SQLite file with payloads sealed by
//!   AES-256-GCM before they touch disk

pub mod memory;
pub mod sqlite;

pub use memory::MemorySecretStore;
pub use sqlite::SqliteSecretStore;

use thiserror::Error;

/// Access-control policy attached to a stored secret.
///
/// The token store always writes [`WhenUnlockedThisDeviceOnly`]; how a
/// backend enforces the policy is backend-specific, but it must persist the
/// attribute it was given.
///
/// [`WhenUnlockedThisDeviceOnly`]: Accessibility::WhenUnlockedThisDeviceOnly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    /// Available only while the device is unlocked; never exported or
    /// synced off this device.
    WhenUnlockedThisDeviceOnly,
    /// Available any time after the first unlock following boot.
    AfterFirstUnlock,
}

impl Accessibility {
    /// Stable identifier persisted alongside the record.
    pub fn as_str(self) -> &'static str {
        match self {
            Accessibility::WhenUnlockedThisDeviceOnly => "when-unlocked-this-device",
            Accessibility::AfterFirstUnlock => "after-first-unlock",
        }
    }
}

/// Errors from a secret-store backend.
///
/// "Not found" is never an error: [`SecretStore::find_one`] returns
/// `Ok(None)` and the delete operations succeed when nothing matches.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// The backend rejected or failed the operation.
    #[error("secret store backend error: {0}")]
    Backend(String),
    /// The stored payload could not be sealed, unsealed, or is malformed.
    #[error("secret payload error: {0}")]
    Payload(String),
}

/// Typed capability interface over a secure key/value secret store.
///
/// Backends are expected to make each individual operation atomic and to
/// serialize concurrent operations on the same (service, address).
pub trait SecretStore {
    /// Insert a record at an address, tagged with a group label and an
    /// access-control policy. The caller is expected to have deleted any
    /// previous record at the address; a backend may additionally make
    /// this an atomic upsert.
    fn put(
        &self,
        service: &str,
        address: &str,
        label: &str,
        payload: &[u8],
        accessibility: Accessibility,
    ) -> Result<(), SecretStoreError>;

    /// Delete the record at an address. Succeeds when none exists.
    fn delete(&self, service: &str, address: &str) -> Result<(), SecretStoreError>;

    /// Delete every record carrying the given label. Succeeds when none
    /// exist.
    fn delete_by_label(&self, service: &str, label: &str) -> Result<(), SecretStoreError>;

    /// Fetch the payload stored at an address, or `None`.
    fn find_one(&self, service: &str, address: &str)
        -> Result<Option<Vec<u8>>, SecretStoreError>;
}

impl<S: SecretStore + ?Sized> SecretStore for &S {
    fn put(
        &self,
        service: &str,
        address: &str,
        label: &str,
        payload: &[u8],
        accessibility: Accessibility,
    ) -> Result<(), SecretStoreError> {
        (**self).put(service, address, label, payload, accessibility)
    }

    fn delete(&self, service: &str, address: &str) -> Result<(), SecretStoreError> {
        (**self).delete(service, address)
    }

    fn delete_by_label(&self, service: &str, label: &str) -> Result<(), SecretStoreError> {
        (**self).delete_by_label(service, label)
    }

    fn find_one(
        &self,
        service: &str,
        address: &str,
    ) -> Result<Option<Vec<u8>>, SecretStoreError> {
        (**self).find_one(service, address)
    }
}

impl<S: SecretStore + ?Sized> SecretStore for std::sync::Arc<S> {
    fn put(
        &self,
        service: &str,
        address: &str,
        label: &str,
        payload: &[u8],
        accessibility: Accessibility,
    ) -> Result<(), SecretStoreError> {
        (**self).put(service, address, label, payload, accessibility)
    }

    fn delete(&self, service: &str, address: &str) -> Result<(), SecretStoreError> {
        (**self).delete(service, address)
    }

    fn delete_by_label(&self, service: &str, label: &str) -> Result<(), SecretStoreError> {
        (**self).delete_by_label(service, label)
    }

    fn find_one(
        &self,
        service: &str,
        address: &str,
    ) -> Result<Option<Vec<u8>>, SecretStoreError> {
        (**self).find_one(service, address)
    }
}
