//! `chainfolio-gateway` — serves the request gateway over HTTP.

use chainfolio_sdk::chain::ChainRegistry;
use chainfolio_sdk::config::ServerConfig;
use chainfolio_sdk::http::{ProviderHttp, ReqwestTransport};
use chainfolio_sdk::server::app_router;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_tracing();

    let provider = &config.provider;
    if provider.api_key.is_none() {
        tracing::warn!("CHAINFOLIO_API_KEY is not set; every upstream call will fail with CONFIG_ERROR");
    }
    let gateway = ProviderHttp::new(
        &provider.base_url,
        Arc::new(ReqwestTransport::new()?),
        Arc::new(ChainRegistry::default()),
        provider.api_key.clone(),
    )
    .with_timeouts(provider.quote_timeout, provider.portfolio_timeout);

    let router = app_router(gateway, &config);
    tracing::info!(upstream = %provider.base_url, "Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
