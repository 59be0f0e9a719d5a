//! In-memory user registry served over HTTP/1.1
//!
//! Clients create, fetch and delete users identified by a sequential integer:
//!
//! | Method   | Path         | Request body      | Success               |
//! |----------|--------------|-------------------|-----------------------|
//! | `GET`    | `/`          |                   | 200 `Hello Client!`   |
//! | `POST`   | `/user`      | `{"name": "..."}` | 202                   |
//! | `GET`    | `/user/{id}` |                   | 200 `{"name": "..."}` |
//! | `DELETE` | `/user/{id}` |                   | 204                   |
//!
//! Any other method or path is answered with the `GET /` greeting, and `HEAD`
//! is served wherever `GET` is.
//!
//! # Example
//!
//! ```no_run
//! use user_registry::{ServerConfig, UserServer};
//!
//! # async fn example() -> user_registry::error::Result<()> {
//! let server = UserServer::new(ServerConfig::default());
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The `loadgen` module drives concurrent GETs against running servers.

pub mod error;
pub mod loadgen;
pub mod registry;
pub mod server;
pub mod stats;

pub use registry::{IdPolicy, RegistryConfig, RegistryError, User, UserId, UserRegistry};
pub use server::{ServerConfig, UserServer};
