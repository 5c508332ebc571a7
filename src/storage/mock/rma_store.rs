use async_trait::async_trait;

use super::{missing_parent, newest_first, MockStorage};
use crate::models::{
    NewRma, NewRmaItem, NewRmaRequestLog, Rma, RmaItem, RmaLogUpdate, RmaRequestLog, RmaUpdate,
};
use crate::storage::helpers::now;
use crate::storage::{Result, RmaStore, StorageError};

#[async_trait]
impl RmaStore for MockStorage {
    async fn create_rma(&self, rma: NewRma) -> Result<Rma> {
        let mut tables = self.tables.write().await;
        if tables.rmas.values().any(|r| r.rma_number == rma.rma_number) {
            return Err(StorageError::Conflict(format!(
                "rma number {} already exists",
                rma.rma_number
            )));
        }
        if !tables.users.contains_key(&rma.user_id) {
            return Err(missing_parent("user", rma.user_id));
        }
        if let Some(order_id) = rma.order_id {
            if !tables.orders.contains_key(&order_id) {
                return Err(missing_parent("order", order_id));
            }
        }
        let id = tables.next_id();
        let ts = now();
        let record = Rma {
            id,
            rma_number: rma.rma_number,
            user_id: rma.user_id,
            order_id: rma.order_id,
            status: rma.status,
            contact_name: rma.contact_name,
            contact_email: rma.contact_email,
            contact_phone: rma.contact_phone,
            reason: rma.reason,
            notes: rma.notes,
            created_at: ts,
            updated_at: ts,
        };
        tables.rmas.insert(id, record.clone());
        Ok(record)
    }

    async fn get_rma(&self, id: i64) -> Result<Option<Rma>> {
        Ok(self.tables.read().await.rmas.get(&id).cloned())
    }

    async fn find_rma_by_number(&self, rma_number: &str) -> Result<Option<Rma>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rmas
            .values()
            .find(|r| r.rma_number == rma_number)
            .cloned())
    }

    async fn list_rmas(&self) -> Result<Vec<Rma>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.rmas.values().cloned()))
    }

    async fn list_rmas_for_user(&self, user_id: i64) -> Result<Vec<Rma>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.rmas.values().filter(|r| r.user_id == user_id).cloned(),
        ))
    }

    async fn update_rma(&self, id: i64, update: RmaUpdate) -> Result<Rma> {
        let mut tables = self.tables.write().await;
        let rma = tables.rmas.get_mut(&id).ok_or(StorageError::NotFound)?;
        if let Some(status) = update.status {
            rma.status = status;
        }
        if let Some(notes) = update.notes {
            rma.notes = Some(notes);
        }
        rma.updated_at = now();
        Ok(rma.clone())
    }

    async fn delete_rma(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.rmas.remove(&id).ok_or(StorageError::NotFound)?;
        tables.rma_items.retain(|_, i| i.rma_id != id);
        tables.rma_logs.retain(|_, l| l.rma_id != id);
        Ok(())
    }

    async fn add_rma_item(&self, rma_id: i64, item: NewRmaItem) -> Result<RmaItem> {
        self.take_rma_item_budget().await?;
        let mut tables = self.tables.write().await;
        if !tables.rmas.contains_key(&rma_id) {
            return Err(missing_parent("rma", rma_id));
        }
        let id = tables.next_id();
        let record = RmaItem {
            id,
            rma_id,
            product_name: item.product_name,
            serial_number: item.serial_number,
            fault_description: item.fault_description,
            quantity: item.quantity,
        };
        tables.rma_items.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_rma_item(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .rma_items
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list_rma_items(&self, rma_id: i64) -> Result<Vec<RmaItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rma_items
            .values()
            .filter(|i| i.rma_id == rma_id)
            .cloned()
            .collect())
    }

    async fn create_rma_log(&self, log: NewRmaRequestLog) -> Result<RmaRequestLog> {
        let mut tables = self.tables.write().await;
        if !tables.rmas.contains_key(&log.rma_id) {
            return Err(missing_parent("rma", log.rma_id));
        }
        let id = tables.next_id();
        let ts = now();
        let record = RmaRequestLog {
            id,
            rma_id: log.rma_id,
            user_id: log.user_id,
            payload: log.payload,
            status: log.status,
            webhook_status: None,
            email_notified: false,
            notification_error: None,
            created_at: ts,
            updated_at: ts,
        };
        tables.rma_logs.insert(id, record.clone());
        Ok(record)
    }

    async fn update_rma_log(&self, id: i64, update: RmaLogUpdate) -> Result<RmaRequestLog> {
        if *self.fail_on_log_update.read().await {
            return Err(StorageError::Database("injected log update failure".to_string()));
        }
        let mut tables = self.tables.write().await;
        let log = tables.rma_logs.get_mut(&id).ok_or(StorageError::NotFound)?;
        if let Some(status) = update.status {
            log.status = status;
        }
        if let Some(code) = update.webhook_status {
            log.webhook_status = Some(code);
        }
        if let Some(notified) = update.email_notified {
            log.email_notified = notified;
        }
        if let Some(error) = update.notification_error {
            log.notification_error = Some(error);
        }
        log.updated_at = now();
        Ok(log.clone())
    }

    async fn get_rma_log(&self, id: i64) -> Result<Option<RmaRequestLog>> {
        Ok(self.tables.read().await.rma_logs.get(&id).cloned())
    }

    async fn list_rma_logs(&self) -> Result<Vec<RmaRequestLog>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.rma_logs.values().cloned()))
    }
}
