// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Keyed storage for the serialized session credential.
//!
//! The session layer is the only reader and writer. Values are opaque strings
//! at this level; parsing (and detecting corruption) happens in
//! [`crate::session`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FileStorage, StorageError, StorageResult};

/// Named keys holding persisted session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Completed sign-in credential.
    Session,
    /// Handshake response awaiting completion.
    PendingSignIn,
}

impl SessionKey {
    /// Every key, in clearing order.
    pub const ALL: [SessionKey; 2] = [SessionKey::Session, SessionKey::PendingSignIn];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::Session => "session",
            SessionKey::PendingSignIn => "pending-sign-in",
        }
    }
}

/// Persisted session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a key. A missing key is `Ok(None)`.
    async fn read(&self, key: SessionKey) -> StorageResult<Option<String>>;

    /// Replace the value of a key.
    async fn write(&self, key: SessionKey, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn clear(&self, key: SessionKey) -> StorageResult<()>;
}

/// Session store backed by one file per key under `{root}/session/`.
pub struct FileSessionStore {
    storage: FileStorage,
}

impl FileSessionStore {
    pub fn new(storage: FileStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn read(&self, key: SessionKey) -> StorageResult<Option<String>> {
        let path = self.storage.paths().session_key(key.as_str());
        match self.storage.read_text(path) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: SessionKey, value: &str) -> StorageResult<()> {
        let path = self.storage.paths().session_key(key.as_str());
        self.storage.write_text(path, value)
    }

    async fn clear(&self, key: SessionKey) -> StorageResult<()> {
        let path = self.storage.paths().session_key(key.as_str());
        self.storage.delete(path)
    }
}

/// Process-local session store. Nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_entry(self, key: SessionKey, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, value.into());
        }
        self
    }

    pub fn contains(&self, key: SessionKey) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(&key))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.is_empty())
            .unwrap_or(true)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn read(&self, key: SessionKey) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        Ok(entries.get(&key).cloned())
    }

    async fn write(&self, key: SessionKey, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        entries.insert(key, value.to_string());
        Ok(())
    }

    async fn clear(&self, key: SessionKey) -> StorageResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        entries.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;

    fn file_store() -> (tempfile::TempDir, FileSessionStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut storage = FileStorage::new(StoragePaths::new(dir.path()));
        storage.initialize().expect("init");
        (dir, FileSessionStore::new(storage))
    }

    #[tokio::test]
    async fn file_store_reads_missing_key_as_none() {
        let (_dir, store) = file_store();
        assert_eq!(store.read(SessionKey::Session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_write_read_clear() {
        let (_dir, store) = file_store();
        store.write(SessionKey::PendingSignIn, "token").await.unwrap();

        assert_eq!(
            store.read(SessionKey::PendingSignIn).await.unwrap().as_deref(),
            Some("token")
        );
        assert!(store
            .storage()
            .exists(store.storage().paths().session_key("pending-sign-in")));

        store.clear(SessionKey::PendingSignIn).await.unwrap();
        assert_eq!(store.read(SessionKey::PendingSignIn).await.unwrap(), None);
        store.clear(SessionKey::PendingSignIn).await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_keys_are_independent() {
        let store = MemorySessionStore::new()
            .with_entry(SessionKey::Session, "a")
            .with_entry(SessionKey::PendingSignIn, "b");

        store.clear(SessionKey::Session).await.unwrap();

        assert!(!store.contains(SessionKey::Session));
        assert!(store.contains(SessionKey::PendingSignIn));
        assert!(!store.is_empty());
    }
}
