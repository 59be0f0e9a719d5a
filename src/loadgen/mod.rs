//! Load generator
//!
//! Fires a batch of concurrent `GET` requests at a server, counts the `200`
//! responses and measures wall-clock time for the whole batch. Used for
//! manual throughput comparison between server instances.
//!
//! # Example
//! ```no_run
//! use user_registry::loadgen::{self, LoadConfig, Target};
//!
//! # async fn example() -> user_registry::error::Result<()> {
//! let target: Target = "local=http://localhost:8080/user/1".parse().unwrap();
//! let report = loadgen::run(&target, &LoadConfig::default()).await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod runner;

pub use config::{LoadConfig, Target, DEFAULT_REQUESTS};
pub use runner::{run, run_with_client, LoadReport};
