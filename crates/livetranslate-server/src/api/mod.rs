use crate::state::AppState;
use crate::ws;
use axum::{Json, Router, routing::get};
use livetranslate_protocol::{Language, LanguageInfo};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/languages", get(languages))
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "LiveTranslate API",
        "version": "2.0",
        "status": "running"
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn languages() -> Json<Vec<LanguageInfo>> {
    Json(Language::ALL.iter().map(Language::info).collect())
}
