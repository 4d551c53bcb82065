use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::mail::MailTransport;
use crate::state::SharedState;

pub mod auth;
mod authors;
mod books;
pub mod error;
pub mod extract;
pub mod observability;
mod system;
pub mod types;
mod users;
pub mod validation;

pub use error::{ApiError, ProblemDetail};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn create_app_state_with_transport(
    config: Config,
    transport: Arc<dyn MailTransport>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_transport(config, transport).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();
    let request_timeout = Duration::from_secs(state.config().server.request_timeout_seconds);

    let api_router = Router::new()
        .merge(create_auth_router())
        .merge(create_protected_router(state.clone()));

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/health", get(system::health))
        .route("/health/ready", get(system::ready))
        .route("/metrics", get(observability::get_metrics))
        .nest("/api/v1", api_router)
        .fallback(error::route_not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            error::request_timeout_middleware,
        ))
        .layer(middleware::from_fn(error::problem_instance_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/activation/activate", post(auth::activate))
        .route("/auth/activation/resend", post(auth::resend))
        .route("/auth/password/reset", post(auth::reset))
        .route("/auth/password/replace", post(auth::replace))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", get(users::get_user))
        .route("/user/info", put(users::update_info))
        .route(
            "/author",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/author/{id}",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/book", get(books::list_books).post(books::create_book))
        .route(
            "/book/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
