use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use farefinder_api::app_config::Config;
use farefinder_api::provider::{AmadeusClient, ClientCredentialsGrant, TokenProvider};
use farefinder_api::{app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farefinder_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting FareFinder proxy on port {}", config.server.port);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.amadeus.request_timeout_seconds))
        .build()
        .context("Failed to build HTTP client")?;

    // Token lifecycle is owned by this provider, shared by every request
    let grant = ClientCredentialsGrant::new(
        http.clone(),
        &config.amadeus.base_url,
        config.amadeus.client_id.clone(),
        config.amadeus.client_secret.clone(),
    );
    let tokens = Arc::new(TokenProvider::new(
        Arc::new(grant),
        Duration::from_secs(config.amadeus.token_refresh_margin_seconds),
    ));

    let client = AmadeusClient::new(http, &config.amadeus.base_url, tokens, config.search.clone());
    let app = app(AppState::new(Arc::new(client)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
