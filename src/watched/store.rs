use std::sync::Arc;
use thiserror::Error;

use super::{WatchedCollection, WatchedItem};
use crate::storage::{DatabaseError, SlotStore};

/// Name of the durable slot holding the watched list.
pub const WATCHED_SLOT: &str = "watched";

#[derive(Debug, Error)]
pub enum WatchedStoreError {
    #[error(transparent)]
    Storage(#[from] DatabaseError),

    #[error("Failed to encode watched list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Loads and saves the watched list through a [`SlotStore`].
#[derive(Clone)]
pub struct WatchedStore {
    slots: Arc<dyn SlotStore>,
}

impl WatchedStore {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// Reads the slot once.
    ///
    /// Never fails: an absent slot, a stored `null`, unreadable storage, or
    /// malformed JSON all yield an empty collection.
    pub async fn load(&self) -> WatchedCollection {
        let raw = match self.slots.read_slot(WATCHED_SLOT).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No stored watched list, starting empty");
                return WatchedCollection::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read watched list, starting empty");
                return WatchedCollection::new();
            }
        };

        match serde_json::from_str::<Option<Vec<WatchedItem>>>(&raw) {
            Ok(Some(items)) => {
                tracing::info!(count = items.len(), "Loaded watched list");
                WatchedCollection::from_items(items)
            }
            Ok(None) => WatchedCollection::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored watched list is malformed, starting empty");
                WatchedCollection::new()
            }
        }
    }

    /// Serializes the whole collection and overwrites the slot.
    pub async fn save(&self, collection: &WatchedCollection) -> Result<(), WatchedStoreError> {
        let json = serde_json::to_string(collection.items())?;
        self.slots.write_slot(WATCHED_SLOT, &json).await?;
        tracing::debug!(count = collection.len(), revision = collection.revision(), "Saved watched list");
        Ok(())
    }

    /// Removes the stored list.
    pub async fn clear(&self) -> Result<(), WatchedStoreError> {
        self.slots.clear_slot(WATCHED_SLOT).await?;
        tracing::info!("Cleared stored watched list");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::storage::{DatabaseError, SlotStore};

    /// In-memory slots that count writes and can be told to fail.
    #[derive(Default)]
    pub(crate) struct MemorySlots {
        values: Mutex<HashMap<String, String>>,
        writes: AtomicUsize,
        fail: AtomicBool,
    }

    impl MemorySlots {
        pub(crate) fn with_value(key: &str, value: &str) -> Self {
            let slots = Self::default();
            slots
                .values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            slots
        }

        pub(crate) fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub(crate) fn value(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        pub(crate) fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), DatabaseError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(DatabaseError::Other(sqlx::Error::PoolTimedOut))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SlotStore for MemorySlots {
        async fn read_slot(&self, key: &str) -> Result<Option<String>, DatabaseError> {
            self.check()?;
            Ok(self.value(key))
        }

        async fn write_slot(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
            self.check()?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn clear_slot(&self, key: &str) -> Result<(), DatabaseError> {
            self.check()?;
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
