//! User registry HTTP server
//!
//! Run with: cargo run --bin user-registry -- [--bind ADDR] [--id-policy POLICY]
//!
//! Try it:
//!   curl -i -X POST localhost:8080/user -d '{"name":"Alice"}'
//!   curl -i localhost:8080/user/1
//!   curl -i -X DELETE localhost:8080/user/1

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use user_registry::registry::{IdPolicy, RegistryConfig, UserRegistry};
use user_registry::server::config::DEFAULT_PORT;
use user_registry::{ServerConfig, UserServer};

/// In-memory user registry served over HTTP.
#[derive(Parser, Debug)]
#[command(name = "user-registry", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "USER_REGISTRY_BIND", default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    max_connections: usize,

    /// Seconds a keep-alive connection may stay idle.
    #[arg(long, default_value_t = 60)]
    idle_timeout: u64,

    /// How new user IDs are assigned: `monotonic` or `current-size`.
    #[arg(long, default_value_t = IdPolicy::Monotonic)]
    id_policy: IdPolicy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("user_registry=info".parse()?),
        )
        .init();

    let config = ServerConfig::default()
        .bind(cli.bind)
        .max_connections(cli.max_connections)
        .idle_timeout(Duration::from_secs(cli.idle_timeout));

    let registry = UserRegistry::with_config(RegistryConfig::default().id_policy(cli.id_policy));

    tracing::info!(id_policy = %cli.id_policy, "Starting user registry");
    println!("Server listening on http://{}", config.bind_addr);

    let server = UserServer::with_registry(config, Arc::new(registry));
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
