use anyhow::Context;
use relaygate::config::ConfigLoader;
use relaygate::{server, Relay};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ConfigLoader::new()
        .and_then(ConfigLoader::with_env)
        .context("failed to load configuration")?;

    let relay = Relay::from_config(&config).context("failed to build relay")?;

    server::serve(Arc::new(relay), &config.server)
        .await
        .context("relay server failure")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
