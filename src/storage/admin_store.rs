//! AdminStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{ApiKey, NewApiKey, SystemSetting, Timestamp};

/// Interface for API keys and system settings.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// New keys start active. `Conflict` on a duplicate hash.
    async fn create_api_key(&self, key: NewApiKey) -> Result<ApiKey>;

    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>>;

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>>;

    async fn set_api_key_active(&self, id: i64, active: bool) -> Result<ApiKey>;

    async fn touch_api_key(&self, id: i64, used_at: Timestamp) -> Result<()>;

    async fn delete_api_key(&self, id: i64) -> Result<()>;

    async fn get_setting(&self, key: &str) -> Result<Option<SystemSetting>>;

    /// All settings ordered by key.
    async fn list_settings(&self) -> Result<Vec<SystemSetting>>;

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<SystemSetting>;

    async fn delete_setting(&self, key: &str) -> Result<()>;
}
