//! HTTP server
//!
//! `UserServer` accepts TCP connections and hands each one to a
//! `Connection` task; every request is dispatched by the shared `Router`
//! against the shared `UserRegistry`.

pub mod config;
pub mod connection;
pub mod listener;
pub mod router;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::UserServer;
pub use router::{DispatchError, Router};
