//! In-memory storage for tests and `memory` mode.
//!
//! Keeps every table in one `RwLock` so multi-table operations (cascading
//! deletes, uniqueness checks) see a consistent view. Mirrors the constraints
//! the SQL schemas enforce: unique keys raise `Conflict`, deletes cascade the
//! same way the foreign keys do.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::models::{
    Achievement, ApiKey, CaseStudy, DeliveryTimeline, EnvironmentalImpact, Milestone, Order,
    OrderItem, Rma, RmaItem, RmaRequestLog, SupportTicket, SystemSetting, User, UserProgress,
    WaterProject,
};

use super::{Result, StorageError};

mod admin_store;
mod content_store;
mod gamification_store;
mod impact_store;
mod order_store;
mod rma_store;
mod support_store;
mod user_store;


#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    timelines: BTreeMap<i64, DeliveryTimeline>,
    rmas: BTreeMap<i64, Rma>,
    rma_items: BTreeMap<i64, RmaItem>,
    rma_logs: BTreeMap<i64, RmaRequestLog>,
    tickets: BTreeMap<i64, SupportTicket>,
    case_studies: BTreeMap<i64, CaseStudy>,
    water_projects: BTreeMap<i64, WaterProject>,
    impacts: BTreeMap<i64, EnvironmentalImpact>,
    achievements: BTreeMap<i64, Achievement>,
    milestones: BTreeMap<i64, Milestone>,
    progress: BTreeMap<i64, UserProgress>,
    api_keys: BTreeMap<i64, ApiKey>,
    settings: BTreeMap<String, SystemSetting>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mock storage that keeps all records in memory.
#[derive(Default)]
pub struct MockStorage {
    tables: RwLock<Tables>,
    rma_item_budget: RwLock<Option<usize>>,
    order_item_budget: RwLock<Option<usize>>,
    fail_on_log_update: RwLock<bool>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `successes` more RMA item inserts, then fail every later one.
    pub async fn fail_rma_items_after(&self, successes: usize) {
        *self.rma_item_budget.write().await = Some(successes);
    }

    /// Allow `successes` more order item inserts, then fail every later one.
    pub async fn fail_order_items_after(&self, successes: usize) {
        *self.order_item_budget.write().await = Some(successes);
    }

    pub async fn set_fail_on_log_update(&self, fail: bool) {
        *self.fail_on_log_update.write().await = fail;
    }

    async fn take_rma_item_budget(&self) -> Result<()> {
        take_budget(&self.rma_item_budget, "rma item").await
    }

    async fn take_order_item_budget(&self) -> Result<()> {
        take_budget(&self.order_item_budget, "order item").await
    }
}

/// Consume one unit of an insert budget, erroring once it is spent.
async fn take_budget(budget: &RwLock<Option<usize>>, what: &str) -> Result<()> {
    let mut budget = budget.write().await;
    match budget.as_mut() {
        Some(0) => Err(StorageError::Database(format!("injected {what} failure"))),
        Some(remaining) => {
            *remaining -= 1;
            Ok(())
        }
        None => Ok(()),
    }
}

/// Newest-first listing by surrogate key.
fn newest_first<T>(rows: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    rows.rev().collect()
}

/// Same failure class a foreign key violation produces in the SQL backends.
fn missing_parent(table: &str, id: i64) -> StorageError {
    StorageError::Database(format!("foreign key violation: {table} {id} does not exist"))
}
