//! market-api — product catalog and order management service
//!
//! HTTP backend over PostgreSQL:
//! - Product catalog CRUD
//! - Order placement (header + line items as one transactional unit)
//! - Order aggregation (joined rows folded into nested orders)
//! - Order status updates

mod api;
mod config;
mod db;
mod error;
mod state;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_api=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting market-api (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("market-api HTTP listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
