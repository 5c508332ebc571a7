//! Shared storage contract tests.
//!
//! Tests every entity-group trait against all implementations. Each backend
//! test file builds a store and runs [`run_storage_contract_tests!`].
//!
//! Records use unique keys so the suite can run against a database that
//! already holds data from an earlier run.

pub mod account_tests;
pub mod engagement_tests;
pub mod order_tests;

use reman_portal::models::{NewOrder, NewUser, Order, OrderStatus, Role, User, UserStatus};
use reman_portal::storage::helpers::now;
use reman_portal::storage::Storage;

/// `prefix-<32 hex>`; unique per call.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

pub fn unique_email() -> String {
    format!("{}@example.com", unique("user"))
}

pub async fn make_user<S: Storage>(store: &S) -> User {
    store
        .create_user(NewUser {
            email: unique_email(),
            password_hash: "hash".to_string(),
            name: "Contract User".to_string(),
            company: None,
            phone: None,
            role: Role::Customer,
            status: UserStatus::Active,
        })
        .await
        .expect("create_user should succeed")
}

pub async fn make_order<S: Storage>(store: &S, user_id: i64) -> Order {
    store
        .create_order(NewOrder {
            order_number: unique("ORD"),
            user_id,
            status: OrderStatus::Pending,
            order_date: now(),
            total_cents: 1_000,
            currency: "USD".to_string(),
            shipping_address: None,
            tracking_number: None,
            notes: None,
        })
        .await
        .expect("create_order should succeed")
}

/// Run every storage contract test against a store implementation.
#[macro_export]
macro_rules! run_storage_contract_tests {
    ($store:expr) => {
        $crate::run_account_tests!($store);
        $crate::run_order_tests!($store);
        $crate::run_engagement_tests!($store);
    };
}
