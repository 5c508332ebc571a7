//! ImpactStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::models::{EnvironmentalImpact, ImpactTotals, NewImpact};

/// Interface for environmental impact rows.
#[async_trait]
pub trait ImpactStore: Send + Sync {
    async fn add_impact(&self, impact: NewImpact) -> Result<EnvironmentalImpact>;

    /// Remove one row. `NotFound` when it does not exist.
    async fn delete_impact(&self, id: i64) -> Result<()>;

    /// Rows for a user, most recently recorded first.
    async fn list_impact_for_user(&self, user_id: i64) -> Result<Vec<EnvironmentalImpact>>;

    /// Column sums over a user's rows; all zero when there are none.
    async fn sum_impact(&self, user_id: i64) -> Result<ImpactTotals>;
}
