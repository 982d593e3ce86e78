use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::search::SearchEngine;
use domain::services::notification::RequestNotifier;
use persistence::MemoryStore;

use crate::config::Config;
use crate::middleware::{auth::TokenVerifier, require_auth};
use crate::routes::{accounts, floors, health, requests, roles, search, settings};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<MemoryStore>,
    pub search: SearchEngine,
    pub verifier: Arc<dyn TokenVerifier>,
    pub notifier: Arc<dyn RequestNotifier>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn create_app(
    config: Config,
    store: MemoryStore,
    verifier: Arc<dyn TokenVerifier>,
    notifier: Arc<dyn RequestNotifier>,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let config = Arc::new(config);
    let store = Arc::new(store);
    let search = SearchEngine::new(store.clone());

    let state = AppState {
        config: config.clone(),
        store,
        search,
        verifier,
        notifier,
        metrics,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Staff routes (require a validated identity-provider token)
    let protected_routes = Router::new()
        // Accounts (registry-wide)
        .route("/api/v1/accounts", get(accounts::list_accounts))
        .route("/api/v1/accounts", put(accounts::upsert_account))
        .route("/api/v1/accounts/heartbeat", put(accounts::heartbeat))
        .route("/api/v1/accounts/:id", delete(accounts::delete_account))
        // Roles
        .route("/api/v1/roles", get(roles::list_roles))
        .route("/api/v1/roles", put(roles::put_role))
        .route("/api/v1/roles/service-level", put(roles::set_service_level))
        // Floor plan
        .route("/api/v1/floors", get(floors::list_floors))
        .route("/api/v1/floors", put(floors::put_floor))
        .route("/api/v1/floors/:id", get(floors::get_floor))
        .route("/api/v1/floors/:id", delete(floors::delete_floor))
        .route("/api/v1/sections/:id/beds", get(floors::section_beds))
        .route("/api/v1/sections/:id/beds", put(floors::put_section_beds))
        // Bearer workflow
        .route("/api/v1/bearer/requests", put(requests::create_bearer))
        .route("/api/v1/bearer/requests", get(requests::list_bearer))
        .route(
            "/api/v1/bearer/requests/accept",
            put(requests::accept_bearer),
        )
        .route(
            "/api/v1/bearer/requests/completed",
            put(requests::complete_bearer),
        )
        .route(
            "/api/v1/bearer/requests/out-of-service",
            get(requests::bearer_out_of_service),
        )
        // Cleaner workflow
        .route("/api/v1/cleaner/requests", put(requests::create_cleaner))
        .route("/api/v1/cleaner/requests", get(requests::list_cleaner))
        .route(
            "/api/v1/cleaner/requests/accept",
            put(requests::accept_cleaner),
        )
        .route(
            "/api/v1/cleaner/requests/completed",
            put(requests::complete_cleaner),
        )
        .route(
            "/api/v1/cleaner/requests/out-of-service",
            get(requests::cleaner_out_of_service),
        )
        // Visitor listings are staff-facing; check-in itself is a kiosk route
        .route("/api/v1/visitor/requests", get(requests::list_visitor))
        // Module settings
        .route("/api/v1/settings/:module", get(settings::get_settings))
        .route("/api/v1/settings/:module", put(settings::put_settings))
        .route(
            "/api/v1/visitor/settings/kiosk-key",
            post(settings::rotate_kiosk_key),
        )
        // Cross-collection search
        .route("/api/v1/requests/search", post(search::search))
        .route(
            "/api/v1/requests/search/sites",
            post(search::search_across_sites),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Kiosk routes authenticate with the per-site visitor API key
    let kiosk_routes = Router::new()
        .route("/api/v1/visitor/check-in", put(requests::visitor_check_in))
        .route(
            "/api/v1/visitor/settings",
            get(settings::visitor_kiosk_settings),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(health::metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(kiosk_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
