use async_trait::async_trait;

use super::{newest_first, MockStorage};
use crate::models::{ApiKey, NewApiKey, SystemSetting, Timestamp};
use crate::storage::helpers::{normalize, now};
use crate::storage::{AdminStore, Result, StorageError};

#[async_trait]
impl AdminStore for MockStorage {
    async fn create_api_key(&self, key: NewApiKey) -> Result<ApiKey> {
        let mut tables = self.tables.write().await;
        if tables.api_keys.values().any(|k| k.key_hash == key.key_hash) {
            return Err(StorageError::Conflict("api key already exists".to_string()));
        }
        let id = tables.next_id();
        let record = ApiKey {
            id,
            name: key.name,
            key_prefix: key.key_prefix,
            key_hash: key.key_hash,
            permissions: key.permissions,
            active: true,
            last_used_at: None,
            created_at: now(),
        };
        tables.api_keys.insert(id, record.clone());
        Ok(record)
    }

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        let tables = self.tables.read().await;
        Ok(tables
            .api_keys
            .values()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.api_keys.values().cloned()))
    }

    async fn set_api_key_active(&self, id: i64, active: bool) -> Result<ApiKey> {
        let mut tables = self.tables.write().await;
        let key = tables.api_keys.get_mut(&id).ok_or(StorageError::NotFound)?;
        key.active = active;
        Ok(key.clone())
    }

    async fn touch_api_key(&self, id: i64, used_at: Timestamp) -> Result<()> {
        let mut tables = self.tables.write().await;
        let key = tables.api_keys.get_mut(&id).ok_or(StorageError::NotFound)?;
        key.last_used_at = Some(normalize(used_at));
        Ok(())
    }

    async fn delete_api_key(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .api_keys
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>> {
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn list_settings(&self) -> Result<Vec<SystemSetting>> {
        Ok(self.tables.read().await.settings.values().cloned().collect())
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<SystemSetting> {
        let mut tables = self.tables.write().await;
        let record = SystemSetting {
            key: key.to_string(),
            value,
            updated_at: now(),
        };
        tables.settings.insert(key.to_string(), record.clone());
        Ok(record)
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .settings
            .remove(key)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
