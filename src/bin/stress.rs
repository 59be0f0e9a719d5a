//! Load generator for user registry servers
//!
//! Run with: cargo run --bin user-stress -- [--requests N] [--target NAME=URL]...
//!
//! Each target receives N concurrent GET requests; targets are hit one after
//! another so their timings do not interfere.

use clap::Parser;

use user_registry::loadgen::{self, LoadConfig, Target, DEFAULT_REQUESTS};

/// Fire concurrent GET requests and report successes and elapsed time.
#[derive(Parser, Debug)]
#[command(name = "user-stress", version, about)]
struct Cli {
    /// Concurrent requests per target.
    #[arg(short = 'n', long, default_value_t = DEFAULT_REQUESTS)]
    requests: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Target as `name=url` or a bare URL. Repeat for several servers.
    #[arg(short, long = "target", default_value = "Standard Server=http://localhost:8080")]
    targets: Vec<Target>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("user_registry=warn".parse()?),
        )
        .init();

    let config = LoadConfig::default()
        .requests(cli.requests)
        .timeout(std::time::Duration::from_secs(cli.timeout));

    println!(
        "Starting stress tests with {} requests each...",
        config.requests
    );

    for target in &cli.targets {
        let report = loadgen::run(target, &config).await?;
        println!("{}", report);
    }

    Ok(())
}
