//! In-memory secret store for tests and ephemeral processes.
//!
//! Holds records in a `parking_lot`-guarded map keyed by
//! (service, address). Nothing touches disk and nothing survives the
//! process, so the accessibility policy is recorded but not enforced.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{Accessibility, SecretStore, SecretStoreError};

struct StoredRecord {
    label: String,
    payload: Vec<u8>,
    #[allow(dead_code)]
    accessibility: Accessibility,
}

/// In-process secret store backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemorySecretStore {
    records: Mutex<HashMap<(String, String), StoredRecord>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, across all services.
    pub fn record_count(&self) -> usize {
        self.records.lock().len()
    }
}

impl SecretStore for MemorySecretStore {
    fn put(
        &self,
        service: &str,
        address: &str,
        label: &str,
        payload: &[u8],
        accessibility: Accessibility,
    ) -> Result<(), SecretStoreError> {
        self.records.lock().insert(
            (service.to_string(), address.to_string()),
            StoredRecord {
                label: label.to_string(),
                payload: payload.to_vec(),
                accessibility,
            },
        );
        Ok(())
    }

    fn delete(&self, service: &str, address: &str) -> Result<(), SecretStoreError> {
        self.records
            .lock()
            .remove(&(service.to_string(), address.to_string()));
        Ok(())
    }

    fn delete_by_label(&self, service: &str, label: &str) -> Result<(), SecretStoreError> {
        self.records
            .lock()
            .retain(|(svc, _), record| !(svc == service && record.label == label));
        Ok(())
    }

    fn find_one(
        &self,
        service: &str,
        address: &str,
    ) -> Result<Option<Vec<u8>>, SecretStoreError> {
        Ok(self
            .records
            .lock()
            .get(&(service.to_string(), address.to_string()))
            .map(|record| record.payload.clone()))
    }
}
