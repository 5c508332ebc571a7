//! Domain records shared by storage, services and handlers.
//!
//! Records mirror the relational tables one-to-one. Status columns are typed
//! enums that round-trip through their `snake_case` string form, which is what
//! both the JSON API and the database columns carry.

/// UTC timestamp used by every record.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A stored string did not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a status-like enum with `snake_case` string conversions.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr` and serde impls that agree
/// with each other, so the column value and the JSON value never drift.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::models::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;

pub mod content;
pub mod gamification;
pub mod impact;
pub mod order;
pub mod rma;
pub mod settings;
pub mod support;
pub mod user;

pub use content::{CaseStudy, CaseStudyInput, WaterProject, WaterProjectInput, WaterProjectStatus};
pub use gamification::{
    Achievement, AchievementInput, AchievementMetric, Milestone, MilestoneInput, UserProgress,
};
pub use impact::{EnvironmentalImpact, ImpactTotals, NewImpact};
pub use order::{
    DeliveryTimeline, NewDeliveryEvent, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus,
    OrderUpdate,
};
pub use rma::{
    NewRma, NewRmaItem, NewRmaRequestLog, RequestLogStatus, Rma, RmaItem, RmaLogUpdate,
    RmaRequestLog, RmaStatus, RmaUpdate,
};
pub use settings::{ApiKey, NewApiKey, SystemSetting};
pub use support::{NewSupportTicket, SupportTicket, TicketPriority, TicketStatus, TicketUpdate};
pub use user::{NewUser, Role, User, UserStatus, UserUpdate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_round_trips_through_str() {
        for status in RmaStatus::ALL {
            let parsed: RmaStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn test_enum_serde_matches_as_str() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let back: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn test_unknown_variant_is_error() {
        let err = "teleported".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "order status");
        assert_eq!(err.value, "teleported");
    }
}
