// Application assembly
//
// Wires the storage backend into the engine and services, and builds the full
// router (health, OpenAPI JSON, prefixed API routes, CORS, tracing).

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use skillswap_core::{Clock, EngineConfig, EventPublisher, SessionEngine, SystemClock};
use skillswap_storage::StorageBackend;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api::{feedback, friends, sessions, users, ws};
use crate::openapi::ApiDoc;
use crate::relay::ConnectionRegistry;
use crate::services::{FeedbackService, FriendService, UserService};

/// Everything the routes need, built once per process
#[derive(Clone)]
pub struct AppServices {
    pub engine: Arc<SessionEngine>,
    pub users: Arc<UserService>,
    pub friends: Arc<FriendService>,
    pub feedback: Arc<FeedbackService>,
    pub registry: Arc<ConnectionRegistry>,
    pub storage: &'static str,
}

impl AppServices {
    pub fn new(backend: &StorageBackend, config: EngineConfig) -> Self {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    /// Same as `new` with an injected clock
    pub fn with_clock(backend: &StorageBackend, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let publisher: Arc<dyn EventPublisher> = registry.clone();
        let users = backend.user_directory();
        let friendships = backend.friendship_store();

        let engine = SessionEngine::new(
            backend.session_store(),
            friendships.clone(),
            users.clone(),
            publisher.clone(),
            clock.clone(),
            config,
        );

        Self {
            engine: Arc::new(engine),
            users: Arc::new(UserService::new(users.clone())),
            friends: Arc::new(FriendService::new(
                friendships,
                users.clone(),
                publisher,
                clock.clone(),
            )),
            feedback: Arc::new(FeedbackService::new(backend.feedback_store(), users, clock)),
            registry,
            storage: if backend.is_dev_mode() {
                "in-memory"
            } else {
                "postgres"
            },
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
    connections: usize,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
    registry: Arc<ConnectionRegistry>,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        connections: state.registry.connection_count(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// API routes without prefix or layers
pub fn api_routes(services: &AppServices) -> Router {
    Router::new()
        .merge(sessions::routes(sessions::AppState::new(
            services.engine.clone(),
            services.feedback.clone(),
        )))
        .merge(users::routes(users::AppState::new(services.users.clone())))
        .merge(friends::routes(friends::AppState::new(
            services.friends.clone(),
        )))
        .merge(feedback::routes(feedback::AppState::new(
            services.feedback.clone(),
        )))
        .merge(ws::routes(ws::AppState::new(services.registry.clone())))
}

/// Build the full application router
pub fn build_app(
    services: &AppServices,
    api_prefix: &str,
    cors_origins: Vec<HeaderValue>,
) -> Router {
    let health_state = HealthState {
        storage: services.storage,
        registry: services.registry.clone(),
    };

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(build_router_with_prefix(api_routes(services), api_prefix));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::HeaderName::from_static(crate::identity::USER_ID_HEADER),
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}

/// Build router with optional API prefix (extracted for testing)
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
