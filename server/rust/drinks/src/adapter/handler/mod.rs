pub mod drink_handler;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use coffeeshop_auth::{require_auth, AuthGate};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::CorsConfig;
use crate::usecase::{
    CreateDrinkUseCase, DeleteDrinkUseCase, ListDrinksUseCase, UpdateDrinkUseCase,
};
use error::ApiError;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub list_drinks_uc: Arc<ListDrinksUseCase>,
    pub create_drink_uc: Arc<CreateDrinkUseCase>,
    pub update_drink_uc: Arc<UpdateDrinkUseCase>,
    pub delete_drink_uc: Arc<DeleteDrinkUseCase>,
    pub auth: AuthGate,
}

/// Build the REST API router.
///
/// 書き込み系と詳細一覧は個別のパーミッションで保護する。
pub fn router(state: AppState, cors: &CorsConfig) -> Router {
    let gate = state.auth.clone();

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/drinks", get(drink_handler::list_drinks))
        .route(
            "/drinks",
            post(drink_handler::create_drink)
                .route_layer(from_fn(require_auth(gate.clone(), "post:drinks"))),
        )
        .route(
            "/drinks-detail",
            get(drink_handler::list_drinks_detail)
                .route_layer(from_fn(require_auth(gate.clone(), "get:drinks-detail"))),
        )
        .route(
            "/drinks/{id}",
            patch(drink_handler::update_drink)
                .route_layer(from_fn(require_auth(gate.clone(), "patch:drinks"))),
        )
        .route(
            "/drinks/{id}",
            delete(drink_handler::delete_drink)
                .route_layer(from_fn(require_auth(gate.clone(), "delete:drinks"))),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// CORS 設定から CorsLayer を組み立てる。許可オリジン未指定または `*` の場合は全オリジンを許可する。
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origins = if cfg.allowed_origins.is_empty() || cfg.allowed_origins.iter().any(|o| o == "*")
    {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(cfg.allowed_origins.iter().filter_map(|o| {
            match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            }
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
