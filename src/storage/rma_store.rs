//! RmaStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{
    NewRma, NewRmaItem, NewRmaRequestLog, Rma, RmaItem, RmaLogUpdate, RmaRequestLog, RmaUpdate,
};

/// Interface for RMAs, their items and the submission log.
///
/// Item inserts are individual statements; callers that need all-or-nothing
/// behaviour compensate with [`RmaStore::delete_rma_item`].
#[async_trait]
pub trait RmaStore: Send + Sync {
    async fn create_rma(&self, rma: NewRma) -> Result<Rma>;

    async fn get_rma(&self, id: i64) -> Result<Option<Rma>>;

    async fn find_rma_by_number(&self, rma_number: &str) -> Result<Option<Rma>>;

    /// All RMAs, newest first.
    async fn list_rmas(&self) -> Result<Vec<Rma>>;

    async fn list_rmas_for_user(&self, user_id: i64) -> Result<Vec<Rma>>;

    async fn update_rma(&self, id: i64, update: RmaUpdate) -> Result<Rma>;

    /// Removes the RMA together with its items and log rows.
    async fn delete_rma(&self, id: i64) -> Result<()>;

    async fn add_rma_item(&self, rma_id: i64, item: NewRmaItem) -> Result<RmaItem>;

    async fn delete_rma_item(&self, id: i64) -> Result<()>;

    async fn list_rma_items(&self, rma_id: i64) -> Result<Vec<RmaItem>>;

    async fn create_rma_log(&self, log: NewRmaRequestLog) -> Result<RmaRequestLog>;

    async fn update_rma_log(&self, id: i64, update: RmaLogUpdate) -> Result<RmaRequestLog>;

    async fn get_rma_log(&self, id: i64) -> Result<Option<RmaRequestLog>>;

    /// All submission logs, newest first.
    async fn list_rma_logs(&self) -> Result<Vec<RmaRequestLog>>;
}
