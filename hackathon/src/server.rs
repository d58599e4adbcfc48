use std::net::SocketAddr;
use std::sync::Arc;

use crate::ClaudeProxy;

/// Serve the proxy on `addr` until a shutdown signal arrives.
pub async fn run_server(proxy: Arc<ClaudeProxy>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = proxy.router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving claude proxy");
    axum::serve(listener, app)
        .with_graceful_shutdown(oracle_common::shutdown_signal())
        .await?;
    tracing::info!("claude proxy stopped");
    Ok(())
}
