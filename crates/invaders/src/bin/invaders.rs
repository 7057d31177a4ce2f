//! Runs the Invaders game server.
//!
//! Environment:
//! - `INVADERS_BIND`: listen address, e.g. `127.0.0.1:4000`.
//! - `PORT`: used with `0.0.0.0` when `INVADERS_BIND` is unset (default 3000).
//! - `INVADERS_CONFIG`: optional path to a JSON `EngineConfig`.
//! - `RUST_LOG`: log filter (default `info`).

use invaders::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), InvadersError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = bind_addr();
    let engine = engine_config()?;

    let server = InvadersServer::builder()
        .bind(&addr)
        .engine_config(engine)
        .build()
        .await?;
    server.run().await
}

fn bind_addr() -> String {
    if let Ok(addr) = std::env::var("INVADERS_BIND") {
        return addr;
    }
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    format!("0.0.0.0:{port}")
}

fn engine_config() -> Result<EngineConfig, InvadersError> {
    let Ok(path) = std::env::var("INVADERS_CONFIG") else {
        return Ok(EngineConfig::default());
    };
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| InvadersError::Config(format!("{path}: {e}")))?;
    let config: EngineConfig = serde_json::from_str(&raw)
        .map_err(|e| InvadersError::Config(format!("{path}: {e}")))?;
    tracing::info!(%path, "loaded engine config");
    Ok(config)
}
