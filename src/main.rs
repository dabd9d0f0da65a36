//! tagallery - REST backend for browsing and tagging photographs.

use tagallery::{cli, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn debug_from_env() -> bool {
    std::env::var("DEBUG")
        .map(|v| config::parse_flag(&v))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() || debug_from_env() {
        "tagallery=debug,tower_http=debug"
    } else {
        "tagallery=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
