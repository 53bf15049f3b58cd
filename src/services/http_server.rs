//! HTTP server for the reviewer assignment API.
//!
//! Binds the configured address and serves the API routes until the
//! cancellation token fires, then drains in-flight requests.

use crate::config::ServerConfig;
use crate::services::http_api;
use crate::services::review_service::ReviewService;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Run the HTTP server until `cancel_token` is cancelled.
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    config: &ServerConfig,
    service: ReviewService,
    cancel_token: CancellationToken,
) -> std::io::Result<()> {
    let app = http_api::router(service).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        log::error!("[server] Failed to bind to {}: {}", addr, e);
        e
    })?;

    log::info!("[server] Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await?;

    log::info!("[server] Server stopped");
    Ok(())
}
