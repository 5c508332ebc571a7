//! REST API.
//!
//! Route groups:
//! - public: health, content, warranty lookup, register/login
//! - customer (session cookie): own orders, RMAs, tickets, impact, ESG, progress
//! - data push (API key): orders, impact and delivery events from upstream systems
//! - admin (session of an admin): CRUD over everything

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::SessionSigner;
use crate::config::{Config, ScoringConfig};
use crate::services::{Mailer, NotifyError, RmaNotifier, RmaService};
use crate::storage::Storage;

pub mod admin;
pub mod auth;
pub mod customer;
pub mod data_push;
pub mod error;
pub mod extract;
pub mod public;

pub use error::{ApiError, ApiResult};

#[cfg(test)]
mod tests;

/// Per-request context, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub sessions: SessionSigner,
    pub rma: Arc<RmaService>,
    pub scoring: Arc<ScoringConfig>,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, NotifyError> {
        let notifier = RmaNotifier::new(config.notifications.clone(), mailer)?;
        Ok(Self {
            rma: Arc::new(RmaService::new(storage.clone(), Arc::new(notifier))),
            storage,
            sessions: SessionSigner::new(
                &config.server.session_secret,
                config.server.session_ttl_secs,
            ),
            scoring: Arc::new(config.scoring.clone()),
            cookie_secure: config.server.cookie_secure,
            bcrypt_cost: config.server.bcrypt_cost,
        })
    }
}

/// Start the HTTP server on `bind_address`.
///
/// A port of 0 lets the OS pick one; the bound port is logged.
pub async fn serve(
    state: AppState,
    bind_address: &str,
    cors_origins: &[String],
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = with_cors(router(state), cors_origins);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    let local = listener.local_addr()?;
    info!(address = %local, port = local.port(), "portal API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(public::health))
        // auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me).put(auth::update_me))
        // public content
        .route("/api/case-studies", get(public::list_case_studies))
        .route("/api/case-studies/:slug", get(public::get_case_study))
        .route("/api/water-projects", get(public::list_water_projects))
        .route("/api/warranty/:serial", get(public::warranty))
        // customer
        .route("/api/orders", get(customer::list_orders))
        .route("/api/orders/:id", get(customer::get_order))
        .route("/api/rmas", get(customer::list_rmas).post(customer::submit_rma))
        .route("/api/rmas/:id", get(customer::get_rma))
        .route(
            "/api/support-tickets",
            get(customer::list_tickets).post(customer::create_ticket),
        )
        .route("/api/impact", get(customer::list_impact))
        .route("/api/impact/summary", get(customer::impact_summary))
        .route("/api/esg/score", get(customer::esg_score))
        .route("/api/gamification/progress", get(customer::progress))
        // data push
        .route("/api/data/orders", post(data_push::push_order))
        .route("/api/data/environmental-impact", post(data_push::push_impact))
        .route("/api/data/delivery-timelines", post(data_push::push_timeline))
        // admin
        .route(
            "/api/admin/users",
            get(admin::users::list).post(admin::users::create),
        )
        .route(
            "/api/admin/users/:id",
            get(admin::users::get)
                .put(admin::users::update)
                .delete(admin::users::delete),
        )
        .route("/api/admin/users/:id/esg", get(admin::users::esg))
        .route(
            "/api/admin/orders",
            get(admin::orders::list).post(admin::orders::create),
        )
        .route(
            "/api/admin/orders/:id",
            get(admin::orders::get)
                .put(admin::orders::update)
                .delete(admin::orders::delete),
        )
        .route("/api/admin/orders/:id/timeline", post(admin::orders::add_timeline))
        .route("/api/admin/rmas", get(admin::rmas::list))
        .route(
            "/api/admin/rmas/:id",
            get(admin::rmas::get)
                .put(admin::rmas::update)
                .delete(admin::rmas::delete),
        )
        .route("/api/admin/rma-logs", get(admin::rmas::list_logs))
        .route("/api/admin/support-tickets", get(admin::support::list))
        .route(
            "/api/admin/support-tickets/:id",
            put(admin::support::update).delete(admin::support::delete),
        )
        .route(
            "/api/admin/case-studies",
            get(admin::content::list_case_studies).post(admin::content::create_case_study),
        )
        .route(
            "/api/admin/case-studies/:id",
            put(admin::content::update_case_study).delete(admin::content::delete_case_study),
        )
        .route(
            "/api/admin/water-projects",
            get(admin::content::list_water_projects).post(admin::content::create_water_project),
        )
        .route(
            "/api/admin/water-projects/:id",
            put(admin::content::update_water_project)
                .delete(admin::content::delete_water_project),
        )
        .route(
            "/api/admin/environmental-impact",
            post(admin::gamification::create_impact),
        )
        .route(
            "/api/admin/achievements",
            get(admin::gamification::list_achievements)
                .post(admin::gamification::create_achievement),
        )
        .route(
            "/api/admin/achievements/:id",
            put(admin::gamification::update_achievement)
                .delete(admin::gamification::delete_achievement),
        )
        .route(
            "/api/admin/milestones",
            get(admin::gamification::list_milestones).post(admin::gamification::create_milestone),
        )
        .route(
            "/api/admin/milestones/:id",
            put(admin::gamification::update_milestone)
                .delete(admin::gamification::delete_milestone),
        )
        .route(
            "/api/admin/api-keys",
            get(admin::settings::list_keys).post(admin::settings::create_key),
        )
        .route(
            "/api/admin/api-keys/:id",
            put(admin::settings::set_key_active).delete(admin::settings::delete_key),
        )
        .route("/api/admin/settings", get(admin::settings::list_settings))
        .route(
            "/api/admin/settings/:key",
            get(admin::settings::get_setting)
                .put(admin::settings::put_setting)
                .delete(admin::settings::delete_setting),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Credentialed CORS for the configured web client origins.
pub fn with_cors(app: Router, origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return app;
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(extract::API_KEY_HEADER),
        ]);
    app.layer(cors)
}

/// `201 Created` with a JSON body.
pub(crate) fn created<T: serde::Serialize>(value: T) -> (StatusCode, axum::Json<T>) {
    (StatusCode::CREATED, axum::Json(value))
}
