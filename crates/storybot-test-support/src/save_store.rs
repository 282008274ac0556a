//! Test save stores — mock `SaveStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use storybot_core::error::DomainError;
use storybot_core::repository::{SaveStore, StoredSave};
use storybot_core::save::{SaveDocument, UserId};

/// An in-memory save store that enforces versioned writes the way the
/// database store does and records every successful `put_save` call.
#[derive(Debug, Default)]
pub struct InMemorySaveStore {
    saves: Mutex<HashMap<UserId, StoredSave>>,
    writes: Mutex<Vec<(UserId, i64, SaveDocument)>>,
}

impl InMemorySaveStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `document` for `user_id` at version 1.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_save(user_id: UserId, document: SaveDocument) -> Self {
        let store = Self::new();
        store.saves.lock().unwrap().insert(
            user_id,
            StoredSave {
                user_id,
                version: 1,
                document,
            },
        );
        store
    }

    /// Returns a snapshot of every accepted write as
    /// `(user_id, expected_version, document)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(UserId, i64, SaveDocument)> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns the currently stored document of a user.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn document(&self, user_id: UserId) -> Option<SaveDocument> {
        self.saves
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|s| s.document.clone())
    }
}

#[async_trait]
impl SaveStore for InMemorySaveStore {
    async fn get_save(&self, user_id: UserId) -> Result<StoredSave, DomainError> {
        Ok(self
            .saves
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| StoredSave::empty(user_id)))
    }

    async fn put_save(
        &self,
        user_id: UserId,
        expected_version: i64,
        document: &SaveDocument,
    ) -> Result<(), DomainError> {
        let mut saves = self.saves.lock().unwrap();
        let actual = saves.get(&user_id).map_or(0, |s| s.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                user_id,
                expected: expected_version,
                actual,
            });
        }
        saves.insert(
            user_id,
            StoredSave {
                user_id,
                version: expected_version + 1,
                document: document.clone(),
            },
        );
        drop(saves);

        self.writes
            .lock()
            .unwrap()
            .push((user_id, expected_version, document.clone()));
        Ok(())
    }
}

/// A save store that returns an infrastructure error. Reads can be allowed
/// so that only the write fails.
#[derive(Debug)]
pub struct FailingSaveStore {
    fail_reads: bool,
}

impl FailingSaveStore {
    /// Every call fails.
    #[must_use]
    pub fn new() -> Self {
        Self { fail_reads: true }
    }

    /// Reads return an empty save; writes fail.
    #[must_use]
    pub fn on_write() -> Self {
        Self { fail_reads: false }
    }
}

impl Default for FailingSaveStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SaveStore for FailingSaveStore {
    async fn get_save(&self, user_id: UserId) -> Result<StoredSave, DomainError> {
        if self.fail_reads {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        Ok(StoredSave::empty(user_id))
    }

    async fn put_save(
        &self,
        _user_id: UserId,
        _expected_version: i64,
        _document: &SaveDocument,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
