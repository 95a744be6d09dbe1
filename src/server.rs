//! Proxy server runtime: bind, serve, shut down gracefully.

use std::time::Duration;

use tracing::info;

use crate::config::AppConfig;
use crate::proxy::{create_proxy_router, ProxyState};

/// Run the proxy server until ctrl-c.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = ProxyState::with_timeout(
        config.upstream.base_url.clone(),
        Duration::from_secs(config.upstream.timeout_secs),
    )?;
    let router = create_proxy_router(state);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Proxy listening on http://{}", addr);
    info!("Forwarding to {}", config.upstream.base_url);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Proxy stopped");
    Ok(())
}
