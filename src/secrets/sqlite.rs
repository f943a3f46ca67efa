//! SQLite-backed secret store with payloads sealed at rest.
//!
//! Records live in a single `secrets` table keyed by (service, address),
//! with the label indexed for bulk deletion. Payloads are encrypted with
//! AES-256-GCM before they touch disk; the database file never holds a
//! plaintext token. Sealed format: `[nonce (12 bytes)][ciphertext]`.
//!
//! Each statement is a single atomic SQLite operation; `INSERT OR REPLACE`
//! makes `put` an atomic upsert on top of the caller's explicit
//! delete-then-add sequence.

use std::path::Path;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use parking_lot::Mutex;

use super::{Accessibility, SecretStore, SecretStoreError};

/// AES-GCM nonce size.
const NONCE_SIZE: usize = 12;

/// Durable secret store over a single SQLite file.
pub struct SqliteSecretStore {
    conn: Mutex<rusqlite::Connection>,
    /// Sealing key (32 bytes, AES-256).
    key: [u8; 32],
}

impl SqliteSecretStore {
    /// Open (or create) the secret database at the given path.
    pub fn new(db_path: &Path, key: [u8; 32]) -> anyhow::Result<Self> {
        let conn = rusqlite::Connection::open(db_path)?;

        // WAL mode for concurrent reads + crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;

             CREATE TABLE IF NOT EXISTS secrets (
                service TEXT NOT NULL,
                address TEXT NOT NULL,
                label TEXT NOT NULL,
                payload BLOB NOT NULL,
                accessibility TEXT NOT NULL,
                PRIMARY KEY (service, address)
             );
             CREATE INDEX IF NOT EXISTS idx_secrets_label ON secrets(service, label);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            key,
        })
    }

    /// Seal a payload using AES-256-GCM.
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, SecretStoreError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| SecretStoreError::Payload(format!("cipher init failed: {e}")))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| SecretStoreError::Payload(format!("encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Unseal a payload using AES-256-GCM.
    fn unseal(&self, sealed: &[u8]) -> Result<Vec<u8>, SecretStoreError> {
        if sealed.len() < NONCE_SIZE {
            return Err(SecretStoreError::Payload(
                "sealed payload too short".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| SecretStoreError::Payload(format!("cipher init failed: {e}")))?;

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| SecretStoreError::Payload(format!("decryption failed: {e}")))
    }
}

impl SecretStore for SqliteSecretStore {
    fn put(
        &self,
        service: &str,
        address: &str,
        label: &str,
        payload: &[u8],
        accessibility: Accessibility,
    ) -> Result<(), SecretStoreError> {
        let sealed = self.seal(payload)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO secrets (service, address, label, payload, accessibility)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![service, address, label, sealed, accessibility.as_str()],
        )
        .map_err(|e| SecretStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, service: &str, address: &str) -> Result<(), SecretStoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM secrets WHERE service = ?1 AND address = ?2",
            rusqlite::params![service, address],
        )
        .map_err(|e| SecretStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn delete_by_label(&self, service: &str, label: &str) -> Result<(), SecretStoreError> {
        let conn = self.conn.lock();
        let removed = conn
            .execute(
                "DELETE FROM secrets WHERE service = ?1 AND label = ?2",
                rusqlite::params![service, label],
            )
            .map_err(|e| SecretStoreError::Backend(e.to_string()))?;
        if removed > 0 {
            tracing::debug!(removed, "Removed labeled secret records");
        }
        Ok(())
    }

    fn find_one(
        &self,
        service: &str,
        address: &str,
    ) -> Result<Option<Vec<u8>>, SecretStoreError> {
        let conn = self.conn.lock();
        let row: Result<Vec<u8>, _> = conn.query_row(
            "SELECT payload FROM secrets WHERE service = ?1 AND address = ?2",
            rusqlite::params![service, address],
            |row| row.get(0),
        );

        match row {
            Ok(sealed) => Ok(Some(self.unseal(&sealed)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SecretStoreError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DeviceAuthStore;
    use tempfile::TempDir;

    fn test_key() -> [u8; 32] {
        Aes256Gcm::generate_key(&mut OsRng).into()
    }

    fn open_store(dir: &TempDir, key: [u8; 32]) -> SqliteSecretStore {
        SqliteSecretStore::new(&dir.path().join("secrets.db"), key).unwrap()
    }

    #[test]
    fn put_then_find_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, test_key());

        store
            .put(
                "svc",
                "dev-1/admin",
                "dev-1",
                b"payload",
                Accessibility::WhenUnlockedThisDeviceOnly,
            )
            .unwrap();

        let found = store.find_one("svc", "dev-1/admin").unwrap();
        assert_eq!(found.as_deref(), Some(&b"payload"[..]));
    }

    #[test]
    fn records_survive_reopen_with_same_key() {
        let tmp = TempDir::new().unwrap();
        let key = test_key();

        let store = open_store(&tmp, key);
        store
            .put(
                "svc",
                "dev-1/admin",
                "dev-1",
                b"payload",
                Accessibility::WhenUnlockedThisDeviceOnly,
            )
            .unwrap();
        drop(store);

        let reopened = open_store(&tmp, key);
        let found = reopened.find_one("svc", "dev-1/admin").unwrap();
        assert_eq!(found.as_deref(), Some(&b"payload"[..]));
    }

    #[test]
    fn wrong_key_fails_to_unseal() {
        let tmp = TempDir::new().unwrap();

        let store = open_store(&tmp, test_key());
        store
            .put(
                "svc",
                "dev-1/admin",
                "dev-1",
                b"payload",
                Accessibility::WhenUnlockedThisDeviceOnly,
            )
            .unwrap();
        drop(store);

        let wrong = open_store(&tmp, test_key());
        assert!(wrong.find_one("svc", "dev-1/admin").is_err());
    }

    #[test]
    fn delete_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, test_key());

        store
            .put(
                "svc",
                "dev-1/admin",
                "dev-1",
                b"payload",
                Accessibility::WhenUnlockedThisDeviceOnly,
            )
            .unwrap();

        store.delete("svc", "dev-1/admin").unwrap();
        store.delete("svc", "dev-1/admin").unwrap();
        assert!(store.find_one("svc", "dev-1/admin").unwrap().is_none());
    }

    #[test]
    fn delete_by_label_leaves_other_labels() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp, test_key());

        for (address, label) in [
            ("dev-1/admin", "dev-1"),
            ("dev-1/viewer", "dev-1"),
            ("dev-2/admin", "dev-2"),
        ] {
            store
                .put(
                    "svc",
                    address,
                    label,
                    b"payload",
                    Accessibility::WhenUnlockedThisDeviceOnly,
                )
                .unwrap();
        }

        store.delete_by_label("svc", "dev-1").unwrap();

        assert!(store.find_one("svc", "dev-1/admin").unwrap().is_none());
        assert!(store.find_one("svc", "dev-1/viewer").unwrap().is_none());
        assert!(store.find_one("svc", "dev-2/admin").unwrap().is_some());
    }

    #[test]
    fn database_file_never_holds_plaintext() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("secrets.db");
        let token = b"super-secret-token-value";

        let store = SqliteSecretStore::new(&db_path, test_key()).unwrap();
        store
            .put(
                "svc",
                "dev-1/admin",
                "dev-1",
                token,
                Accessibility::WhenUnlockedThisDeviceOnly,
            )
            .unwrap();
        drop(store);

        for file in [
            db_path.clone(),
            db_path.with_extension("db-wal"),
            db_path.with_extension("db-shm"),
        ] {
            if !file.exists() {
                continue;
            }
            let bytes = std::fs::read(&file).unwrap();
            let leaked = bytes.windows(token.len()).any(|w| w == token);
            assert!(!leaked, "plaintext token found in {}", file.display());
        }
    }

    #[test]
    fn token_store_works_over_sqlite_backend() {
        let tmp = TempDir::new().unwrap();
        let backend = open_store(&tmp, test_key());
        let store = DeviceAuthStore::new(backend, "gateway-tokens");

        let entry = store
            .store_token("dev-123", "Admin", "tok-A", &["read", "write"])
            .unwrap();
        assert_eq!(entry.role, "admin");

        let loaded = store.load_token("dev-123", " ADMIN ").unwrap();
        assert_eq!(loaded, entry);

        store.clear_all_tokens("dev-123");
        assert!(store.load_token("dev-123", "admin").is_none());
    }
}
