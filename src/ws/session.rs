//! Per-connection session loops.
//!
//! One tokio task per accepted socket, spawned from the upgrade
//! handlers. Every fault stays inside its own session: a broken peer is
//! logged, unregistered, and closed without touching any other session
//! or the process.

use crate::state::AppState;
use axum::extract::ws::WebSocket;

use super::connection::{Connection, RecvOutcome};

/// `/ws/hello` session: greet, then echo every inbound message back to
/// the same client. No shared state is involved.
pub async fn run_echo_session(socket: WebSocket) {
    let mut conn = Connection::new(socket);
    tracing::info!(connection = %conn.id(), "echo session started");

    if conn.send("Hello").is_err() {
        tracing::warn!(connection = %conn.id(), "peer gone before greeting");
        return;
    }

    loop {
        match conn.receive().await {
            RecvOutcome::Message(text) => {
                if conn.send(format!("vous avez dit: {text}")).is_err() {
                    break;
                }
            }
            RecvOutcome::Disconnected => {
                tracing::info!(connection = %conn.id(), "client closed echo session");
                break;
            }
            RecvOutcome::Failed(e) => {
                tracing::warn!(connection = %conn.id(), error = %e, "echo session transport fault");
                break;
            }
        }
    }

    conn.close();
}

/// `/ws/broadcast/{name}` session: join the shared group, welcome the
/// client with the post-join member count, then relay every inbound
/// message to all other members as `{name}: {message}`. Leaves the
/// registry exactly once on the way out, whatever ended the loop.
pub async fn run_broadcast_session(socket: WebSocket, state: AppState, name: String) {
    let mut conn = Connection::new(socket);
    let id = conn.id();

    state.registry.join(conn.handle()).await;
    tracing::info!(connection = %id, name = %name, "broadcast session joined");

    let joined = state.registry.count().await;
    if conn
        .send(format!("Bienvenue {name}, il y a {joined} connecte(s)."))
        .is_err()
    {
        tracing::warn!(connection = %id, name = %name, "peer gone before welcome");
    }

    loop {
        match conn.receive().await {
            RecvOutcome::Message(text) => {
                state
                    .registry
                    .broadcast(&format!("{name}: {text}"), Some(id))
                    .await;
            }
            RecvOutcome::Disconnected => {
                tracing::info!(connection = %id, name = %name, "client left broadcast group");
                break;
            }
            RecvOutcome::Failed(e) => {
                tracing::warn!(
                    connection = %id,
                    name = %name,
                    error = %e,
                    "broadcast session transport fault"
                );
                break;
            }
        }
    }

    state.registry.leave(id).await;
    conn.close();
    tracing::info!(connection = %id, name = %name, "broadcast session ended");
}
