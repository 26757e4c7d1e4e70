mod config;
mod platform;
mod router;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging; RUST_LOG takes precedence over LOG_LEVEL
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config_path.exists() {
        info!("Configuration loaded from: {}", config_path.display());
    } else {
        info!("No config file at {}, using environment", config_path.display());
    }
    info!("  Log level: {}", config.log_directive());
    info!("  Allowed users: {:?}", config.telegram.allowed_user_ids);

    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(e);
    }

    info!("Bot is starting...");
    platform::telegram::run(&config.telegram).await?;

    Ok(())
}
