pub mod connection;
pub mod handler;
pub mod registry;
pub mod session;

pub use connection::{Connection, ConnectionHandle, ConnectionId, RecvOutcome, SendError};
pub use registry::BroadcastRegistry;
