//! UserStore and AdminStore contract tests.

use reman_portal::models::{NewApiKey, NewUser, Role, UserStatus, UserUpdate};
use reman_portal::storage::helpers::now;
use reman_portal::storage::{Storage, StorageError};
use serde_json::json;

use super::{make_user, unique, unique_email};

// =============================================================================
// UserStore
// =============================================================================

pub async fn test_create_user_normalizes_email<S: Storage>(store: &S) {
    let email = unique_email();
    let user = store
        .create_user(NewUser {
            email: format!("  {}  ", email.to_uppercase()),
            password_hash: "hash".to_string(),
            name: "Mixed Case".to_string(),
            company: Some("Acme".to_string()),
            phone: None,
            role: Role::Customer,
            status: UserStatus::PendingApproval,
        })
        .await
        .expect("create_user should succeed");

    assert_eq!(user.email, email);
    assert_eq!(user.status, UserStatus::PendingApproval);
    assert!(user.deleted_at.is_none());

    let found = store
        .find_user_by_email(&email.to_uppercase())
        .await
        .unwrap()
        .expect("lookup should ignore case");
    assert_eq!(found, user);
    assert_eq!(store.get_user(user.id).await.unwrap(), Some(user));
}

pub async fn test_duplicate_email_conflicts<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let result = store
        .create_user(NewUser {
            email: user.email.clone(),
            password_hash: "hash".to_string(),
            name: "Again".to_string(),
            company: None,
            phone: None,
            role: Role::Customer,
            status: UserStatus::Active,
        })
        .await;
    assert!(
        matches!(result, Err(StorageError::Conflict(_))),
        "duplicate email should conflict, got {result:?}"
    );
}

pub async fn test_update_user_partial<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let updated = store
        .update_user(
            user.id,
            UserUpdate {
                name: Some("Renamed".to_string()),
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .expect("update_user should succeed");

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.email, user.email, "untouched fields are kept");
    assert_eq!(updated.password_hash, user.password_hash);
    assert!(updated.updated_at >= user.updated_at);
}

pub async fn test_update_missing_user_not_found<S: Storage>(store: &S) {
    let result = store
        .update_user(i64::MAX, UserUpdate::default())
        .await;
    assert!(matches!(result, Err(StorageError::NotFound)));
}

pub async fn test_soft_delete_hides_user<S: Storage>(store: &S) {
    let user = make_user(store).await;
    store.soft_delete_user(user.id).await.expect("soft delete should succeed");

    assert!(store.get_user(user.id).await.unwrap().is_none());
    assert!(store.find_user_by_email(&user.email).await.unwrap().is_none());
    assert!(!store
        .list_users()
        .await
        .unwrap()
        .iter()
        .any(|u| u.id == user.id));
    assert!(matches!(
        store.soft_delete_user(user.id).await,
        Err(StorageError::NotFound)
    ));
}

pub async fn test_list_users_newest_first<S: Storage>(store: &S) {
    let first = make_user(store).await;
    let second = make_user(store).await;
    let ids: Vec<i64> = store
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .filter(|id| *id == first.id || *id == second.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

// =============================================================================
// AdminStore: API keys
// =============================================================================

pub async fn test_api_key_lifecycle<S: Storage>(store: &S) {
    let hash = unique("hash");
    let key = store
        .create_api_key(NewApiKey {
            name: "erp".to_string(),
            key_prefix: "rk_12345".to_string(),
            key_hash: hash.clone(),
            permissions: vec!["orders:write".to_string(), "impact:write".to_string()],
        })
        .await
        .expect("create_api_key should succeed");
    assert!(key.active);
    assert!(key.last_used_at.is_none());
    assert_eq!(key.permissions.len(), 2);

    let found = store.find_api_key_by_hash(&hash).await.unwrap().unwrap();
    assert_eq!(found.id, key.id);
    assert_eq!(found.permissions, key.permissions);

    store.touch_api_key(key.id, now()).await.unwrap();
    let revoked = store.set_api_key_active(key.id, false).await.unwrap();
    assert!(!revoked.active);
    assert!(revoked.last_used_at.is_some());

    store.delete_api_key(key.id).await.unwrap();
    assert!(store.find_api_key_by_hash(&hash).await.unwrap().is_none());
    assert!(matches!(
        store.delete_api_key(key.id).await,
        Err(StorageError::NotFound)
    ));
}

pub async fn test_api_key_hash_unique<S: Storage>(store: &S) {
    let hash = unique("hash");
    let new_key = || NewApiKey {
        name: "dup".to_string(),
        key_prefix: "rk_dup00".to_string(),
        key_hash: hash.clone(),
        permissions: vec!["*".to_string()],
    };
    store.create_api_key(new_key()).await.unwrap();
    assert!(matches!(
        store.create_api_key(new_key()).await,
        Err(StorageError::Conflict(_))
    ));
}

// =============================================================================
// AdminStore: settings
// =============================================================================

pub async fn test_settings_upsert<S: Storage>(store: &S) {
    let key = unique("setting");
    assert!(store.get_setting(&key).await.unwrap().is_none());

    store.put_setting(&key, json!({"a": 1})).await.unwrap();
    let saved = store.put_setting(&key, json!(["x", "y"])).await.unwrap();
    assert_eq!(saved.value, json!(["x", "y"]));

    let got = store.get_setting(&key).await.unwrap().unwrap();
    assert_eq!(got.value, json!(["x", "y"]));
    assert_eq!(
        store
            .list_settings()
            .await
            .unwrap()
            .iter()
            .filter(|s| s.key == key)
            .count(),
        1
    );

    store.delete_setting(&key).await.unwrap();
    assert!(store.get_setting(&key).await.unwrap().is_none());
    assert!(matches!(
        store.delete_setting(&key).await,
        Err(StorageError::NotFound)
    ));
}

/// Run all account and admin contract tests.
#[macro_export]
macro_rules! run_account_tests {
    ($store:expr) => {
        use $crate::storage::account_tests::*;

        test_create_user_normalizes_email($store).await;
        println!("  test_create_user_normalizes_email: PASSED");

        test_duplicate_email_conflicts($store).await;
        println!("  test_duplicate_email_conflicts: PASSED");

        test_update_user_partial($store).await;
        println!("  test_update_user_partial: PASSED");

        test_update_missing_user_not_found($store).await;
        println!("  test_update_missing_user_not_found: PASSED");

        test_soft_delete_hides_user($store).await;
        println!("  test_soft_delete_hides_user: PASSED");

        test_list_users_newest_first($store).await;
        println!("  test_list_users_newest_first: PASSED");

        test_api_key_lifecycle($store).await;
        println!("  test_api_key_lifecycle: PASSED");

        test_api_key_hash_unique($store).await;
        println!("  test_api_key_hash_unique: PASSED");

        test_settings_upsert($store).await;
        println!("  test_settings_upsert: PASSED");
    };
}
