//! WebSocket upgrade handlers.
//!
//! A failed upgrade (bad handshake) is answered by axum before any
//! session exists; the registry is never touched for rejected
//! connections.

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
};

use crate::state::AppState;
use crate::ws::session;

/// GET /ws/hello — one-shot echo endpoint, no shared state.
pub async fn ws_hello(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(session::run_echo_session)
}

/// GET /ws/broadcast/{name} — join the shared broadcast group under the
/// given display name.
pub async fn ws_broadcast(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| session::run_broadcast_session(socket, state, name))
}
