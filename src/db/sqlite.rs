use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{query, query_as, sqlite::SqlitePool};

use super::{KeyValueStore, StorageError};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            let row: Option<(String,)> = query_as(r#"SELECT value FROM storage WHERE key = ?1"#)
                .bind(*key)
                .fetch_optional(&self.pool)
                .await?;
            if let Some((raw,)) = row {
                let value = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                })?;
                found.insert(key.to_string(), value);
            }
        }
        Ok(found)
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            query(
                r#"INSERT OR REPLACE INTO storage (key, value, updated_at)
                    VALUES (?1, ?2, CURRENT_TIMESTAMP)"#,
            )
            .bind(key)
            .bind(value.to_string())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::init_pool;

    #[tokio::test]
    async fn test_set_and_get_roundtrip_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("guardian.db");

        let store = SqliteStore::new(init_pool(&db_path).await.unwrap());
        store
            .set(vec![
                ("websites".to_string(), json!({ "safe": ["github.com"] })),
                ("lastUpdate".to_string(), json!(1_700_000_000_000_i64)),
            ])
            .await
            .unwrap();
        store.close().await;

        let reopened = SqliteStore::new(init_pool(&db_path).await.unwrap());
        let values = reopened.get(&["websites", "lastUpdate", "missing"]).await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["websites"], json!({ "safe": ["github.com"] }));
        assert_eq!(values["lastUpdate"], json!(1_700_000_000_000_i64));
        reopened.close().await;
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(init_pool(&dir.path().join("kv.db")).await.unwrap());

        store
            .set(vec![("lastUpdate".to_string(), json!(1))])
            .await
            .unwrap();
        store
            .set(vec![("lastUpdate".to_string(), json!(2))])
            .await
            .unwrap();

        let values = store.get(&["lastUpdate"]).await.unwrap();
        assert_eq!(values["lastUpdate"], json!(2));
        store.close().await;
    }
}
