//! postsmith-api: HTTP surface over the postsmith store and generator.

pub mod conversations;
pub mod error;
pub mod generations;
pub mod identity;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::{Json, Router, middleware};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use postsmith_core::{Config, Database, GeneratorClient};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Database>,
    pub generator: Arc<GeneratorClient>,
}

/// Build the full application router. Everything under `/api` requires a
/// verified caller identity.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/conversations", get(conversations::list))
        .route(
            "/conversations/{id}",
            get(conversations::show)
                .patch(conversations::update)
                .delete(conversations::remove),
        )
        .route("/conversations/{id}/archive", post(conversations::archive))
        .route("/conversations/{id}/messages", get(conversations::messages))
        .route(
            "/conversations/{id}/participants",
            get(conversations::participants).post(conversations::add_participant),
        )
        .route(
            "/conversations/{id}/participants/{user_id}",
            delete(conversations::remove_participant),
        )
        .route(
            "/messages/{id}",
            patch(conversations::update_message).delete(conversations::remove_message),
        )
        .route("/generate", post(generations::generate))
        .route("/generations", post(generations::save))
        .route("/history", get(generations::history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity::require_identity,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
