//! HTTP surface: the root path redirects to the public site.

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::consts::REDIRECT_URL;

/// `302 Found` to the public site.
async fn redirect_root() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, REDIRECT_URL)])
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(redirect_root))
        .fallback(handler_404)
}

/// Bind the listener. Port 0 picks a free port; the bound address is returned.
pub async fn bind(addr: SocketAddr) -> Result<(SocketAddr, TcpListener)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().context("listener has no local address")?;
    Ok((local, listener))
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(local) = listener.local_addr() {
        info!(%local, "redirect server listening");
    }
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("redirect server failed")
}

/// Serve until `shutdown` while driving `background` on the same task.
///
/// Returns as soon as the server stops, whether from shutdown or failure,
/// dropping `background`. If `background` finishes first the server keeps
/// running until shutdown.
pub async fn serve_alongside<F, B>(listener: TcpListener, shutdown: F, background: B) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
    B: Future,
{
    let mut server = tokio::spawn(serve(listener, shutdown));
    tokio::select! {
        joined = &mut server => joined.context("redirect server task failed")?,
        _ = background => server.await.context("redirect server task failed")?,
    }
}
