pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, LocationConfig, SearchConfig, ValidationResult};
pub use error::{AppError, GeolocationError, NetworkError, ReqwestErrorExt, SearchError};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Logs go to stderr so an interactive front-end can own stdout.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Mana core initialized");
    Ok(())
}
