pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use service_core::middleware::{
    expose_error_details, request_id_middleware, security_headers_middleware,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SupplierConfig;
use crate::middleware::{auth_middleware, metrics_middleware, require_admin};
use crate::services::{
    AuthService, CredentialProvider, JwtService, ScreeningClient, SupplierService, SupplierStore,
    UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: SupplierConfig,
    pub jwt: JwtService,
    pub suppliers: Arc<dyn SupplierStore>,
    pub auth_service: AuthService,
    pub supplier_service: SupplierService,
}

impl AppState {
    /// Wire services over the given storage and screening backends.
    pub fn new(
        config: SupplierConfig,
        suppliers: Arc<dyn SupplierStore>,
        users: Arc<dyn UserStore>,
        screening: Arc<dyn ScreeningClient>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt);
        let auth_service = AuthService::new(users.clone(), jwt.clone());
        let supplier_service = SupplierService::new(
            suppliers.clone(),
            users,
            screening,
            CredentialProvider::new(config.scraping_api.clone()),
        );

        Self {
            config,
            jwt,
            suppliers,
            auth_service,
            supplier_service,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    if allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}

pub fn build_router(state: AppState) -> Router {
    // Deleting requires an Admin token
    let admin_routes = Router::new()
        .route(
            "/api/proveedores/:id",
            delete(handlers::supplier::delete_supplier),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    // Screening requires a token; the admin check happens against stored roles
    let authenticated_routes = Router::new()
        .route(
            "/api/proveedores/:id/screening",
            post(handlers::supplier::screen_supplier),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics_endpoint))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/register-admin", post(handlers::auth::register_admin))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/verify-token", post(handlers::auth::verify_token))
        .route(
            "/api/proveedores",
            get(handlers::supplier::list_suppliers).post(handlers::supplier::create_supplier),
        )
        .route(
            "/api/proveedores/name",
            get(handlers::supplier::get_supplier_by_legal_name),
        )
        .route(
            "/api/proveedores/:id",
            get(handlers::supplier::get_supplier).put(handlers::supplier::update_supplier),
        );

    let environment = state.config.environment;
    let cors = cors_layer(&state.config.security.allowed_origins);

    public_routes
        .merge(admin_routes)
        .merge(authenticated_routes)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn_with_state(environment, expose_error_details))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}
