use async_trait::async_trait;

use super::{missing_parent, MockStorage};
use crate::models::{EnvironmentalImpact, ImpactTotals, NewImpact};
use crate::storage::helpers::{normalize, now};
use crate::storage::{ImpactStore, Result, StorageError};

#[async_trait]
impl ImpactStore for MockStorage {
    async fn add_impact(&self, impact: NewImpact) -> Result<EnvironmentalImpact> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&impact.user_id) {
            return Err(missing_parent("user", impact.user_id));
        }
        if let Some(order_id) = impact.order_id {
            if !tables.orders.contains_key(&order_id) {
                return Err(missing_parent("order", order_id));
            }
        }
        let id = tables.next_id();
        let record = EnvironmentalImpact {
            id,
            user_id: impact.user_id,
            order_id: impact.order_id,
            carbon_kg: impact.carbon_kg,
            water_liters: impact.water_liters,
            minerals_kg: impact.minerals_kg,
            families_helped: impact.families_helped,
            recorded_at: normalize(impact.recorded_at),
            created_at: now(),
        };
        tables.impacts.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_impact(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.impacts.remove(&id).ok_or(StorageError::NotFound)?;
        Ok(())
    }

    async fn list_impact_for_user(&self, user_id: i64) -> Result<Vec<EnvironmentalImpact>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .impacts
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn sum_impact(&self, user_id: i64) -> Result<ImpactTotals> {
        let tables = self.tables.read().await;
        Ok(ImpactTotals::from_rows(
            tables.impacts.values().filter(|r| r.user_id == user_id),
        ))
    }
}
