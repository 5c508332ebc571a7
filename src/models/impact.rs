//! Environmental impact attributed to a customer's purchases.

use serde::{Deserialize, Serialize};

use super::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub id: i64,
    pub user_id: i64,
    pub order_id: Option<i64>,
    pub carbon_kg: f64,
    pub water_liters: f64,
    pub minerals_kg: f64,
    pub families_helped: i64,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewImpact {
    pub user_id: i64,
    pub order_id: Option<i64>,
    pub carbon_kg: f64,
    pub water_liters: f64,
    pub minerals_kg: f64,
    pub families_helped: i64,
    pub recorded_at: Timestamp,
}

/// Per-user sums over all impact rows. Zero when the user has none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactTotals {
    pub carbon_kg: f64,
    pub water_liters: f64,
    pub minerals_kg: f64,
    pub families_helped: i64,
}

impl ImpactTotals {
    /// Fold rows into totals. Used by the in-memory store and in tests.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a EnvironmentalImpact>,
    {
        rows.into_iter().fold(Self::default(), |mut acc, r| {
            acc.carbon_kg += r.carbon_kg;
            acc.water_liters += r.water_liters;
            acc.minerals_kg += r.minerals_kg;
            acc.families_helped += r.families_helped;
            acc
        })
    }
}
