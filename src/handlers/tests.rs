use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;
use crate::config::Config;
use crate::models::{NewUser, Role, User, UserStatus};
use crate::services::RecordingMailer;
use crate::storage::{AdminStore, ImpactStore, MockStorage, OrderStore, UserStore};

struct TestApp {
    state: AppState,
    storage: Arc<MockStorage>,
    mailer: Arc<RecordingMailer>,
}

impl TestApp {
    fn new() -> Self {
        let mut config = Config::for_test();
        config.notifications.admin_emails = vec!["ops@example.com".into()];
        let storage = Arc::new(MockStorage::new());
        let mailer = Arc::new(RecordingMailer::new());
        let state = AppState::new(
            &config,
            storage.clone() as Arc<dyn Storage>,
            mailer.clone() as Arc<dyn Mailer>,
        )
        .unwrap();
        Self {
            state,
            storage,
            mailer,
        }
    }

    fn app(&self) -> Router {
        router(self.state.clone())
    }

    async fn user(&self, email: &str, role: Role, status: UserStatus) -> User {
        self.storage
            .create_user(NewUser {
                email: email.into(),
                password_hash: crate::auth::hash_password("password123", 4).unwrap(),
                name: "Test User".into(),
                company: None,
                phone: None,
                role,
                status,
            })
            .await
            .unwrap()
    }

    async fn customer(&self, email: &str) -> (User, String) {
        let user = self.user(email, Role::Customer, UserStatus::Active).await;
        let cookie = self.cookie_for(&user);
        (user, cookie)
    }

    async fn admin(&self) -> (User, String) {
        let user = self
            .user("admin@example.com", Role::Admin, UserStatus::Active)
            .await;
        let cookie = self.cookie_for(&user);
        (user, cookie)
    }

    fn cookie_for(&self, user: &User) -> String {
        format!("{}={}", crate::auth::SESSION_COOKIE, self.state.sessions.issue(user.id))
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = self.app().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, cookie, None).await
    }

    async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, cookie, Some(body)).await
    }

    /// Plaintext of a fresh API key holding every permission.
    async fn full_access_key(&self) -> String {
        let (_, admin) = self.admin().await;
        let (_, created_key) = self
            .post(
                "/api/admin/api-keys",
                Some(&admin),
                json!({"name": "upstream", "permissions": ["*"]}),
            )
            .await;
        created_key["key"].as_str().unwrap().to_string()
    }

    async fn push(&self, key: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", key)
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = self.app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn cookie_from(resp: &axum::response::Response) -> String {
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let t = TestApp::new();
    let (status, body) = t.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let t = TestApp::new();
    let (status, body) = t.get("/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn test_register_sets_session_cookie() {
    let t = TestApp::new();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": "New@Example.com", "password": "long-enough", "name": "New"})
                .to_string(),
        ))
        .unwrap();
    let resp = t.app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cookie = cookie_from(&resp);

    let (status, me) = t.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "new@example.com");
    assert_eq!(me["role"], "customer");
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let t = TestApp::new();
    t.customer("dup@example.com").await;
    let (status, _) = t
        .post(
            "/api/auth/register",
            None,
            json!({"email": "DUP@example.com", "password": "long-enough", "name": "Dup"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation_details() {
    let t = TestApp::new();
    let (status, body) = t
        .post(
            "/api/auth/register",
            None,
            json!({"email": "nope", "password": "short", "name": ""}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation failed");
    let fields: Vec<_> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["email", "password", "name"]);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let t = TestApp::new();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = t.app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_logout() {
    let t = TestApp::new();
    t.customer("login@example.com").await;

    let (status, _) = t
        .post(
            "/api/auth/login",
            None,
            json!({"email": "login@example.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": "LOGIN@example.com", "password": "password123"}).to_string(),
        ))
        .unwrap();
    let resp = t.app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = cookie_from(&resp);
    assert_eq!(t.get("/api/auth/me", Some(&cookie)).await.0, StatusCode::OK);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();
    let resp = t.app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(cookie_from(&resp).ends_with("reman_session="));
}

#[tokio::test]
async fn test_pending_user_cannot_sign_in() {
    let t = TestApp::new();
    let pending = t
        .user("pending@example.com", Role::Customer, UserStatus::PendingApproval)
        .await;
    let (status, _) = t
        .post(
            "/api/auth/login",
            None,
            json!({"email": "pending@example.com", "password": "password123"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = t.cookie_for(&pending);
    assert_eq!(
        t.get("/api/auth/me", Some(&cookie)).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_tampered_cookie_rejected() {
    let t = TestApp::new();
    let (_, cookie) = t.customer("c@example.com").await;
    let tampered = format!("{cookie}x");
    assert_eq!(
        t.get("/api/auth/me", Some(&tampered)).await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(t.get("/api/orders", None).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile() {
    let t = TestApp::new();
    let (_, cookie) = t.customer("p@example.com").await;
    let (status, body) = t
        .call(
            Method::PUT,
            "/api/auth/me",
            Some(&cookie),
            Some(json!({"name": "Renamed", "company": "Acme"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["company"], "Acme");
    assert_eq!(body["role"], "customer");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let t = TestApp::new();
    let (_, customer) = t.customer("c@example.com").await;
    let (_, admin) = t.admin().await;

    assert_eq!(t.get("/api/admin/users", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        t.get("/api/admin/users", Some(&customer)).await.0,
        StatusCode::FORBIDDEN
    );
    let (status, users) = t.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_customer_only_sees_own_orders() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (alice, alice_cookie) = t.customer("alice@example.com").await;
    let (_, bob_cookie) = t.customer("bob@example.com").await;

    let (status, order) = t
        .post(
            "/api/admin/orders",
            Some(&admin),
            json!({
                "order_number": "ORD-100",
                "user_id": alice.id,
                "items": [
                    {"product_name": "Laptop", "serial_number": "SN-100", "quantity": 2, "unit_price_cents": 50000}
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total_cents"], 100000);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    let id = order["id"].as_i64().unwrap();

    let (status, _) = t
        .post(
            &format!("/api/admin/orders/{id}/timeline"),
            Some(&admin),
            json!({"stage": "shipped", "description": "left the warehouse"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = t.get("/api/orders", Some(&alice_cookie)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (status, detail) = t.get(&format!("/api/orders/{id}"), Some(&alice_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order_number"], "ORD-100");
    assert_eq!(detail["timeline"][0]["stage"], "shipped");

    let (_, list) = t.get("/api/orders", Some(&bob_cookie)).await;
    assert!(list.as_array().unwrap().is_empty());
    assert_eq!(
        t.get(&format!("/api/orders/{id}"), Some(&bob_cookie)).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_rma_submission_without_webhook() {
    let t = TestApp::new();
    let (user, cookie) = t.customer("rma@example.com").await;
    let (status, body) = t
        .post(
            "/api/rmas",
            Some(&cookie),
            json!({
                "contact_name": "Rma Person",
                "contact_email": "rma@example.com",
                "reason": "Battery swelling",
                "items": [{"product_name": "Phone", "fault_description": "swollen battery"}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rma"]["status"], "submitted");
    assert_eq!(body["rma"]["user_id"], user.id);
    assert_eq!(body["log"]["status"], "submitted");
    assert_eq!(body["log"]["email_notified"], true);
    assert_eq!(t.mailer.sent().len(), 1);

    let rma_id = body["rma"]["id"].as_i64().unwrap();
    let (status, detail) = t.get(&format!("/api/rmas/{rma_id}"), Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["items"][0]["product_name"], "Phone");
}

#[tokio::test]
async fn test_rma_submission_validation() {
    let t = TestApp::new();
    let (_, cookie) = t.customer("rma@example.com").await;
    let (status, body) = t
        .post(
            "/api/rmas",
            Some(&cookie),
            json!({
                "contact_name": "R",
                "contact_email": "rma@example.com",
                "reason": "x",
                "items": []
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "items");
}

#[tokio::test]
async fn test_rma_unknown_order_is_404() {
    let t = TestApp::new();
    let (_, cookie) = t.customer("rma@example.com").await;
    let (status, body) = t
        .post(
            "/api/rmas",
            Some(&cookie),
            json!({
                "order_number": "ORD-MISSING",
                "contact_name": "R",
                "contact_email": "rma@example.com",
                "reason": "x",
                "items": [{"product_name": "Phone", "fault_description": "dead"}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "order not found");
}

#[tokio::test]
async fn test_data_push_requires_key_and_permission() {
    let t = TestApp::new();
    t.customer("buyer@example.com").await;
    let (_, admin) = t.admin().await;

    let (status, created_key) = t
        .post(
            "/api/admin/api-keys",
            Some(&admin),
            json!({"name": "erp", "permissions": ["orders:write"]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let key = created_key["key"].as_str().unwrap().to_string();
    assert!(key.starts_with("rk_"));
    assert!(created_key.get("key_hash").is_none());

    let push = |key: Option<&str>, uri: &str, body: Value| {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            req = req.header("x-api-key", key);
        }
        t.app().oneshot(req.body(Body::from(body.to_string())).unwrap())
    };
    let order = json!({
        "customer_email": "buyer@example.com",
        "order_number": "ERP-1",
        "items": [{"product_name": "Tablet", "quantity": 1, "unit_price_cents": 20000}]
    });

    let resp = push(None, "/api/data/orders", order.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = push(Some("rk_wrong"), "/api/data/orders", order.clone()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = push(Some(&key), "/api/data/orders", order).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let impact = json!({"records": [{"customer_email": "buyer@example.com", "carbon_kg": 5.0}]});
    let resp = push(Some(&key), "/api/data/environmental-impact", impact).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let keys = t.storage.list_api_keys().await.unwrap();
    assert!(keys[0].last_used_at.is_some());
    assert!(t.storage.find_order_by_number("ERP-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_push_order_total_overflow_rejected() {
    let t = TestApp::new();
    t.customer("buyer@example.com").await;
    let key = t.full_access_key().await;

    let (status, body) = t
        .push(
            &key,
            "/api/data/orders",
            json!({
                "customer_email": "buyer@example.com",
                "order_number": "ERP-HUGE",
                "items": [{
                    "product_name": "Rack",
                    "quantity": 2,
                    "unit_price_cents": 9_000_000_000_000_000_000i64
                }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "items");
    assert!(t.storage.find_order_by_number("ERP-HUGE").await.unwrap().is_none());
}

#[tokio::test]
async fn test_push_order_item_failure_removes_order() {
    let t = TestApp::new();
    t.customer("buyer@example.com").await;
    let key = t.full_access_key().await;
    t.storage.fail_order_items_after(1).await;

    let (status, _) = t
        .push(
            &key,
            "/api/data/orders",
            json!({
                "customer_email": "buyer@example.com",
                "order_number": "ERP-PARTIAL",
                "items": [
                    {"product_name": "Tablet", "quantity": 1, "unit_price_cents": 20000},
                    {"product_name": "Stylus", "quantity": 1, "unit_price_cents": 1500}
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(t
        .storage
        .find_order_by_number("ERP-PARTIAL")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_push_impact_bad_record_writes_nothing() {
    let t = TestApp::new();
    let (buyer, _) = t.customer("buyer@example.com").await;
    let key = t.full_access_key().await;

    let (status, body) = t
        .push(
            &key,
            "/api/data/environmental-impact",
            json!({"records": [
                {"customer_email": "buyer@example.com", "carbon_kg": 5.0},
                {"customer_email": "stranger@example.com", "carbon_kg": 7.0}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "customer not found");
    assert!(t.storage.list_impact_for_user(buyer.id).await.unwrap().is_empty());

    let (status, rows) = t
        .push(
            &key,
            "/api/data/environmental-impact",
            json!({"records": [
                {"customer_email": "buyer@example.com", "carbon_kg": 5.0},
                {"customer_email": "buyer@example.com", "carbon_kg": 7.0}
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(t.storage.sum_impact(buyer.id).await.unwrap().carbon_kg, 12.0);
}

#[tokio::test]
async fn test_revoked_key_rejected() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (_, created_key) = t
        .post(
            "/api/admin/api-keys",
            Some(&admin),
            json!({"name": "ops", "permissions": ["*"]}),
        )
        .await;
    let id = created_key["id"].as_i64().unwrap();
    let key = created_key["key"].as_str().unwrap().to_string();

    let (status, revoked) = t
        .call(
            Method::PUT,
            &format!("/api/admin/api-keys/{id}"),
            Some(&admin),
            Some(json!({"active": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revoked["active"], false);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/data/delivery-timelines")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .body(Body::from(json!({"order_number": "X", "stage": "picked"}).to_string()))
        .unwrap();
    let resp = t.app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_impact_and_esg_score() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (user, cookie) = t.customer("green@example.com").await;

    let (status, _) = t
        .post(
            "/api/admin/environmental-impact",
            Some(&admin),
            json!({"user_id": user.id, "carbon_kg": 100.0, "water_liters": 2000.0, "minerals_kg": 5.0, "families_helped": 3}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, summary) = t.get("/api/impact/summary", Some(&cookie)).await;
    assert_eq!(summary["carbon_kg"], 100.0);
    assert_eq!(summary["families_helped"], 3);

    let (status, score) = t.get("/api/esg/score", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score["total_score"], 60);
    assert_eq!(score["tier"], "Explorer");
    assert_eq!(score["points_to_next_tier"], 40);

    let (_, admin_view) = t
        .get(&format!("/api/admin/users/{}/esg", user.id), Some(&admin))
        .await;
    assert_eq!(admin_view["total_score"], 60);
}

#[tokio::test]
async fn test_gamification_progress() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (_, cookie) = t.customer("gamer@example.com").await;

    let (status, _) = t
        .post(
            "/api/admin/achievements",
            Some(&admin),
            json!({"code": "first-kg", "name": "First kg", "metric": "carbon", "threshold": 1.0, "points": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    t.post(
        "/api/admin/milestones",
        Some(&admin),
        json!({"name": "Start", "target_score": 0}),
    )
    .await;

    let (status, report) = t.get("/api/gamification/progress", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["achievements"][0]["progress"]["completed"], false);
    assert_eq!(report["milestones"][0]["reached"], true);
}

#[tokio::test]
async fn test_warranty_lookup_is_public() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (alice, _) = t.customer("alice@example.com").await;
    t.post(
        "/api/admin/orders",
        Some(&admin),
        json!({
            "order_number": "ORD-W",
            "user_id": alice.id,
            "items": [{"product_name": "Monitor", "serial_number": "MON-42", "quantity": 1, "unit_price_cents": 1, "warranty_months": 24}]
        }),
    )
    .await;

    let (status, body) = t.get("/api/warranty/MON-42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_name"], "Monitor");
    assert_eq!(body["in_warranty"], true);
    assert!(body.get("user_id").is_none());

    assert_eq!(
        t.get("/api/warranty/NOPE", None).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_case_study_drafts_hidden() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    for (slug, published) in [("live-story", true), ("draft-story", false)] {
        let (status, _) = t
            .post(
                "/api/admin/case-studies",
                Some(&admin),
                json!({"title": slug, "slug": slug, "summary": "s", "body": "b", "published": published}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, public) = t.get("/api/case-studies", None).await;
    assert_eq!(public.as_array().unwrap().len(), 1);
    assert_eq!(t.get("/api/case-studies/live-story", None).await.0, StatusCode::OK);
    assert_eq!(
        t.get("/api/case-studies/draft-story", None).await.0,
        StatusCode::NOT_FOUND
    );

    let (_, all) = t.get("/api/admin/case-studies", Some(&admin)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_settings_round_trip_and_validation() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;

    let (status, _) = t
        .call(
            Method::PUT,
            "/api/admin/settings/rma_webhook_url",
            Some(&admin),
            Some(json!({"value": "not a url"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .call(
            Method::PUT,
            "/api/admin/settings/rma_webhook_url",
            Some(&admin),
            Some(json!({"value": "http://hooks.example.com/rma"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "value");

    let (status, saved) = t
        .call(
            Method::PUT,
            "/api/admin/settings/rma_webhook_url",
            Some(&admin),
            Some(json!({"value": "https://hooks.example.com/rma"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["value"], "https://hooks.example.com/rma");

    let (status, saved) = t
        .call(
            Method::PUT,
            "/api/admin/settings/theme",
            Some(&admin),
            Some(json!({"value": {"primary": "#0a7d4f"}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["value"]["primary"], "#0a7d4f");

    let (_, got) = t.get("/api/admin/settings/theme", Some(&admin)).await;
    assert_eq!(got["value"]["primary"], "#0a7d4f");

    let (status, _) = t
        .call(Method::DELETE, "/api/admin/settings/theme", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        t.get("/api/admin/settings/theme", Some(&admin)).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_admin_soft_deletes_user() {
    let t = TestApp::new();
    let (admin_user, admin) = t.admin().await;
    let (user, cookie) = t.customer("leaving@example.com").await;

    let (status, _) = t
        .call(
            Method::DELETE,
            &format!("/api/admin/users/{}", user.id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(t.get("/api/auth/me", Some(&cookie)).await.0, StatusCode::UNAUTHORIZED);
    assert!(t.storage.get_user(user.id).await.unwrap().is_none());

    let (status, _) = t
        .call(
            Method::DELETE,
            &format!("/api/admin/users/{}", admin_user.id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_support_ticket_flow() {
    let t = TestApp::new();
    let (_, admin) = t.admin().await;
    let (_, cookie) = t.customer("help@example.com").await;

    let (status, ticket) = t
        .post(
            "/api/support-tickets",
            Some(&cookie),
            json!({"subject": "Where is my order?", "message": "It has been a week."}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["priority"], "normal");
    let id = ticket["id"].as_i64().unwrap();

    let (status, updated) = t
        .call(
            Method::PUT,
            &format!("/api/admin/support-tickets/{id}"),
            Some(&admin),
            Some(json!({"status": "resolved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "resolved");

    let (_, mine) = t.get("/api/support-tickets", Some(&cookie)).await;
    assert_eq!(mine[0]["status"], "resolved");
}
