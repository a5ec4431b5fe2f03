use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use super::bundled::{BundledList, BundledListError};
use crate::{
    db::{KeyValueStore, StorageError},
    domain::SafetyList,
};

pub const WEBSITES_KEY: &str = "websites";
pub const LAST_UPDATE_KEY: &str = "lastUpdate";

#[derive(Debug, Error)]
pub enum ListStoreError {
    #[error("no safety list available (storage: {persisted}; bundled: {bundled})")]
    StorageUnavailable {
        persisted: String,
        #[source]
        bundled: BundledListError,
    },
}

/// Owns the active safe list and its persisted copy.
///
/// The active list is an immutable snapshot; refreshes swap the whole
/// `Arc`, so readers never observe a partially updated list.
pub struct ListStore {
    storage: Arc<dyn KeyValueStore>,
    bundled: BundledList,
    active: RwLock<Arc<SafetyList>>,
}

impl ListStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, bundled: BundledList) -> Self {
        Self {
            storage,
            bundled,
            active: RwLock::new(Arc::new(SafetyList::default())),
        }
    }

    pub fn current(&self) -> Arc<SafetyList> {
        self.active.read().clone()
    }

    pub fn replace(&self, list: SafetyList) -> Arc<SafetyList> {
        let list = Arc::new(list);
        *self.active.write() = list.clone();
        list
    }

    /// Restores the active list from storage, falling back to the bundled
    /// document. When both fail the active list is left untouched.
    pub async fn load(&self) -> Result<Arc<SafetyList>, ListStoreError> {
        let persisted = match self.read_persisted().await {
            Ok(Some(list)) => {
                tracing::info!(target: "lists", entries = list.len(), "websites loaded from storage");
                return Ok(self.replace(list));
            }
            Ok(None) => "nothing persisted".to_string(),
            Err(err) => {
                tracing::warn!(target: "lists", error = %err, "failed to read persisted websites");
                err.to_string()
            }
        };

        match self.bundled.read().await {
            Ok(list) => {
                tracing::info!(
                    target: "lists",
                    entries = list.len(),
                    source = %self.bundled.describe(),
                    "websites loaded from bundled list"
                );
                Ok(self.replace(list))
            }
            Err(bundled) => {
                tracing::error!(
                    target: "lists",
                    storage = %persisted,
                    error = %bundled,
                    "no safety list could be loaded"
                );
                Err(ListStoreError::StorageUnavailable { persisted, bundled })
            }
        }
    }

    /// Persists both keys in one write.
    pub async fn save(&self, list: &SafetyList, at: DateTime<Utc>) -> Result<(), StorageError> {
        let websites = serde_json::to_value(list).map_err(|source| StorageError::Encode {
            key: WEBSITES_KEY.to_string(),
            source,
        })?;
        self.storage
            .set(vec![
                (WEBSITES_KEY.to_string(), websites),
                (
                    LAST_UPDATE_KEY.to_string(),
                    Value::from(at.timestamp_millis()),
                ),
            ])
            .await
    }

    pub async fn is_stale(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        let last_update = match self.last_update().await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(target: "lists", error = %err, "failed to read lastUpdate");
                0
            }
        };
        is_stale_at(last_update, now, interval)
    }

    /// Milliseconds since the epoch of the last successful refresh, `0` if
    /// none was recorded.
    pub async fn last_update(&self) -> Result<i64, StorageError> {
        let values = self.storage.get(&[LAST_UPDATE_KEY]).await?;
        Ok(values
            .get(LAST_UPDATE_KEY)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(0))
    }

    async fn read_persisted(&self) -> Result<Option<SafetyList>, StorageError> {
        let mut values = self.storage.get(&[WEBSITES_KEY]).await?;
        match values.remove(WEBSITES_KEY) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: WEBSITES_KEY.to_string(),
                    source,
                }),
        }
    }
}

pub fn is_stale_at(last_update_ms: i64, now: DateTime<Utc>, interval: Duration) -> bool {
    let elapsed = now.timestamp_millis().saturating_sub(last_update_ms);
    let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    elapsed >= interval_ms
}
