pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod slug;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::AppConfig;

/// Process-wide resources: the connection pool and the immutable config.
/// Built once in `main`, cloned into every handler by the router.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api1", api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use handlers::{cities, sights, users};

    Router::new()
        // Cities
        .route("/cities/", get(cities::list).post(cities::create))
        .route("/cities/top/", get(cities::top))
        .route(
            "/cities/:slug",
            get(cities::get).put(cities::update).delete(cities::delete),
        )
        // Sights, nested in their parent city's document
        .route(
            "/cities/:slug/sight/",
            get(sights::list).post(sights::create),
        )
        .route(
            "/cities/:slug/sight/:sight",
            get(sights::get).put(sights::update).delete(sights::delete),
        )
        // Users
        .route("/users/token", post(users::token))
        .route("/users/register", post(users::register))
        .route(
            "/users/users/:username",
            get(users::profile).put(users::update_profile),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Wayfarer API",
        "version": version,
        "description": "Travel catalog backend: cities, their sights, user accounts",
        "endpoints": {
            "cities": "/api1/cities/ [GET, POST], /api1/cities/:slug [GET, PUT, DELETE], /api1/cities/top/ [GET]",
            "sights": "/api1/cities/:slug/sight/ [GET, POST], /api1/cities/:slug/sight/:sight [GET, PUT, DELETE]",
            "users": "/api1/users/token [POST], /api1/users/register [POST], /api1/users/users/:username [GET, PUT]",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match database::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
