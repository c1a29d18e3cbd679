use axum::{extract::Path, extract::State, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// GET / — root greeting.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello World" }))
}

/// GET /hello/{name} — parameterized greeting.
async fn say_hello(Path(name): Path<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": format!("Hello {name}") }))
}

/// GET /metrics — current number of members in the broadcast group.
/// Informational only: the value may be stale by the time it is read.
async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "active_connections": state.registry.count().await,
    }))
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Wide-open CORS so browser clients can connect from any origin.
    // Restrict in production deployments.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let http_routes = Router::new()
        .route("/", get(root))
        .route("/hello/{name}", get(say_hello))
        .route("/metrics", get(metrics));

    let ws_routes = Router::new()
        .route("/ws/hello", get(ws_handler::ws_hello))
        .route("/ws/broadcast/{name}", get(ws_handler::ws_broadcast));

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(http_routes)
        .merge(ws_routes)
        .merge(health)
        .layer(cors)
        .with_state(state)
}
