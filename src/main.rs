//! imgpress: a bandwidth-saving image proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────┐
//!                    │                 IMGPRESS                   │
//!                    │                                            │
//!   Client Request   │  ┌────────┐   ┌────────┐   ┌───────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ params │──▶│  fetch    │──┼──▶ Origin
//!                    │  │ server │   │ + gate │   │ (reqwest) │  │
//!                    │  └────────┘   └────────┘   └─────┬─────┘  │
//!                    │                                  ▼        │
//!                    │                            ┌───────────┐  │
//!                    │                            │  decode   │  │
//!                    │                            │ (enc-tok) │  │
//!                    │                            └─────┬─────┘  │
//!   Client Response  │  ┌──────────┐  ┌──────────┐     ▼        │
//!   ◀────────────────┼──│ bypass / │◀─│ decision │◀─ headers    │
//!                    │  │transcode │  └──────────┘   projector   │
//!                    │  └──────────┘                             │
//!                    │        any failure → 302 to origin URL    │
//!                    └────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgpress::config;
use imgpress::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgpress=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("imgpress v0.1.0 starting");

    let config = config::load_from_env()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_domains = ?config.origin.allowed_domains,
        origin_timeout_secs = config.origin.timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
