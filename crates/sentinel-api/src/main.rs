//! Binary entrypoint for the Sentinel API server.
use sentinel_api::run;
use sentinel_core::{SentinelConfig, SentinelError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), SentinelError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // SENTINEL_ADDR, SENTINEL_STORE_URL, SENTINEL_ANON_KEY and friends
    let config = SentinelConfig::from_env()?;
    run(config).await
}
